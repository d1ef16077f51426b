/*
 * mod.rs
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

//! HTTP client: dependency-light HTTP/1.1 over plain TCP, one connection per request.
//!
//! - Request: whole request written at once (`Content-Length` body, `Connection: close`).
//! - Response: `ReceiveBuffer` (bytes `BytesMut` with a monotonic cursor) grown by the
//!   receiver until the head parser and framing mode say the response is complete.
//! - Framing: `Content-Length`, chunked (incremental `ChunkDecoder`), or read until close.
//! - No keep-alive, pipelining, redirects, TLS or HTTP/2.

pub mod buffer;
pub mod error;
pub mod h1;
pub mod receiver;

mod client;
mod request;
mod response;

pub use client::HttpClient;
pub use error::{ErrorKind, HttpError};
pub use h1::{Framing, ResponseHead, StatusLine};
pub use request::{Method, OutgoingRequest, UnknownMethod};
pub use response::Response;
