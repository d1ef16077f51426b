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

//! Transports: ways of delivering a line-protocol payload to the database.
//!
//! UDP and Unix-domain datagrams are fire-and-forget; HTTP waits for the server's status.
//! Pick one from a URL with [`from_url`]: `http://host:8086?db=name`, `udp://host:8089`,
//! `unix:///var/run/influxdb.sock`.

use std::io;

use crate::config::ClientConfig;
use crate::protocol::http::HttpError;

pub mod http;
pub mod udp;
#[cfg(unix)]
pub mod unix;

pub use self::http::HttpTransport;
pub use self::udp::UdpTransport;
#[cfg(unix)]
pub use self::unix::UnixTransport;

/// Errors from transport construction or delivery.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Socket-level failure; `op` names the transport operation, e.g. `UDP::send`.
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a non-2xx status.
    #[error("server returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("invalid transport url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub(crate) fn io(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| TransportError::Io { op, source }
    }
}

/// Deliver one payload. Datagram transports return as soon as the datagram is handed to the
/// kernel; the HTTP transport returns after the server acknowledged the write.
pub trait Transport: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Build a transport from its URL, using `config` for HTTP transports.
pub fn from_url(url: &str, config: &ClientConfig) -> Result<Box<dyn Transport>, TransportError> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| TransportError::InvalidUrl(format!("missing scheme in {:?}", url)))?;
    match scheme.to_ascii_lowercase().as_str() {
        "http" => Ok(Box::new(HttpTransport::from_url(url, config.clone())?)),
        "udp" => {
            let (host, port) = rest
                .trim_end_matches('/')
                .rsplit_once(':')
                .ok_or_else(|| TransportError::InvalidUrl(format!("udp url needs host:port: {:?}", url)))?;
            let port = port
                .parse::<u16>()
                .map_err(|_| TransportError::InvalidUrl(format!("invalid port {:?}", port)))?;
            let host = host.trim_start_matches('[').trim_end_matches(']');
            Ok(Box::new(UdpTransport::new(host, port)?))
        }
        #[cfg(unix)]
        "unix" => {
            if rest.is_empty() {
                return Err(TransportError::InvalidUrl("unix url needs a socket path".to_string()));
            }
            Ok(Box::new(UnixTransport::new(rest)?))
        }
        other => Err(TransportError::InvalidUrl(format!("unsupported scheme {:?}", other))),
    }
}
