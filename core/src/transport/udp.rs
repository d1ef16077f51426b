/*
 * udp.rs
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

//! UDP transport: one datagram per payload to a target resolved once at construction.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::trace;

use crate::transport::{Transport, TransportError};

/// Fire-and-forget UDP sender bound to an ephemeral IPv4 port.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16) -> Result<Self, TransportError> {
        let target = (host, port)
            .to_socket_addrs()
            .map_err(TransportError::io("UDP::resolve"))?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| TransportError::InvalidUrl(format!("{} has no IPv4 address", host)))?;
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(TransportError::io("UDP::bind"))?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let n = self
            .socket
            .send_to(payload, self.target)
            .map_err(TransportError::io("UDP::send"))?;
        trace!(target = %self.target, bytes = n, "udp datagram sent");
        Ok(())
    }
}
