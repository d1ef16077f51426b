/*
 * request.rs
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

//! HTTP request: method, target, host and optional body, serialized whole.
//!
//! Every request carries `Connection: close`; bodies are sent verbatim with a
//! `Content-Length`, never chunked.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::uri::Endpoint;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method name other than GET, PUT or POST.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method {0:?}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "PUT" => Ok(Method::Put),
            "POST" => Ok(Method::Post),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// One outgoing request. Lives only long enough to be encoded.
#[derive(Debug, Clone)]
pub struct OutgoingRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub host: String,
    pub body: Option<&'a [u8]>,
}

impl<'a> OutgoingRequest<'a> {
    pub fn new(method: Method, endpoint: &'a Endpoint, body: Option<&'a [u8]>) -> Self {
        Self {
            method,
            path: endpoint.path(),
            host: endpoint.host_header(),
            body,
        }
    }

    /// Request line, `Host`, `Content-Length` (non-empty body only), `Connection: close`,
    /// blank line, then the body bytes.
    pub fn encode(&self) -> Bytes {
        let body = self.body.unwrap_or_default();
        let mut out = BytesMut::with_capacity(96 + self.path.len() + self.host.len() + body.len());
        out.put_slice(self.method.as_str().as_bytes());
        out.put_u8(b' ');
        out.put_slice(self.path.as_bytes());
        out.put_slice(b" HTTP/1.1\r\nHost: ");
        out.put_slice(self.host.as_bytes());
        out.put_slice(b"\r\n");
        if !body.is_empty() {
            out.put_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        }
        out.put_slice(b"Connection: close\r\n\r\n");
        out.put_slice(body);
        out.freeze()
    }
}
