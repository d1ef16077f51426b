/*
 * unix.rs
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

//! Unix-domain datagram transport, addressed by socket path.

use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::transport::{Transport, TransportError};

#[derive(Debug)]
pub struct UnixTransport {
    socket: UnixDatagram,
    path: PathBuf,
}

impl UnixTransport {
    /// Open an unbound datagram socket; `path` is only used as the destination of each send.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let socket = UnixDatagram::unbound().map_err(TransportError::io("UnixSocket::open"))?;
        Ok(Self {
            socket,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for UnixTransport {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let n = self
            .socket
            .send_to(payload, &self.path)
            .map_err(TransportError::io("UnixSocket::send"))?;
        trace!(path = %self.path.display(), bytes = n, "unix datagram sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn socket_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fluxwire-{}-{}.sock", name, std::process::id()))
    }

    #[test]
    fn datagram_arrives_verbatim() {
        let path = socket_path("unix-send");
        let _ = std::fs::remove_file(&path);
        let server = UnixDatagram::bind(&path).unwrap();
        server.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        UnixTransport::new(&path).unwrap().send(b"mem used=42i").unwrap();

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"mem used=42i");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_io_error() {
        let t = UnixTransport::new(socket_path("nobody-listens")).unwrap();
        let err = t.send(b"x").unwrap_err();
        assert!(matches!(err, TransportError::Io { op: "UnixSocket::send", .. }));
    }
}
