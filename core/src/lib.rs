/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fluxwire, a time-series database client library.
 *
 * Fluxwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fluxwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fluxwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Fluxwire core: a small time-series database client.
//!
//! - `protocol::http`: blocking HTTP/1.1 engine (request framing, response parsing, chunked
//!   decoding) over plain TCP, with no external HTTP library.
//! - `transport`: HTTP, UDP and Unix-domain delivery of line-protocol payloads.
//! - `uri`: endpoint URL parsing; `net`: TCP connect and scoped connections;
//!   `config`: engine settings.

pub mod config;
pub mod net;
pub mod protocol;
pub mod transport;
pub mod uri;

pub use config::{ClientConfig, ConfigError};
pub use protocol::http::{ErrorKind, HttpClient, HttpError, Method, Response, UnknownMethod};
pub use transport::{from_url, Transport, TransportError};
pub use uri::Endpoint;
