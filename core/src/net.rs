/*
 * net.rs
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

//! TCP connection helpers: resolve an endpoint, connect with an optional timeout, and wrap the
//! stream in a [`Connection`] that enforces an overall read deadline.
//!
//! A `Connection` is owned by exactly one exchange. Dropping it shuts the socket down and closes
//! it, so every exit path of a request releases the socket.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::protocol::http::HttpError;
use crate::uri::Endpoint;

/// One plain TCP connection for one request/response exchange.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_deadline: Option<Instant>,
}

impl Connection {
    /// Resolve `endpoint` and connect to the first address that accepts.
    pub fn open(endpoint: &Endpoint, connect_timeout: Option<Duration>) -> Result<Self, HttpError> {
        let target = endpoint.authority();
        let addrs: Vec<SocketAddr> = (endpoint.host(), endpoint.port())
            .to_socket_addrs()
            .map_err(|source| HttpError::Connection {
                target: target.clone(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(HttpError::Connection {
                target,
                source: io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses"),
            });
        }

        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no address accepted the connection");
        for addr in addrs {
            trace!(%addr, "connecting");
            let attempt = match connect_timeout {
                Some(t) => TcpStream::connect_timeout(&addr, t),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(Self::from_stream(stream, addr)),
                Err(e) => {
                    trace!(%addr, error = %e, "connect attempt failed");
                    last_err = e;
                }
            }
        }
        if crate::protocol::http::error::is_timeout(&last_err) {
            return Err(HttpError::Timeout("connecting"));
        }
        Err(HttpError::Connection {
            target,
            source: last_err,
        })
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        // Requests go out in one write; Nagle would only delay the last segment.
        let _ = stream.set_nodelay(true);
        Self {
            stream,
            peer,
            read_deadline: None,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(timeout)
    }

    /// Bound every following read by one deadline `timeout` from now. `None` blocks indefinitely.
    pub fn set_read_deadline(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.read_deadline = timeout.map(|t| Instant::now() + t);
        if self.read_deadline.is_none() {
            self.stream.set_read_timeout(None)?;
        }
        Ok(())
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(deadline) = self.read_deadline {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .filter(|d| !d.is_zero())
                .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "response deadline elapsed"))?;
            self.stream.set_read_timeout(Some(remaining))?;
        }
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        trace!(peer = %self.peer, "closing connection");
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
