/*
 * uri.rs
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

//! Endpoint URLs: `http://host[:port][/path][?query]` parsed into an [`Endpoint`], plus
//! query-component encoding for write and query URLs. Only the `http` scheme is accepted here;
//! datagram transport URLs (`udp:`, `unix:`) are split in `transport::from_url`.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::protocol::http::HttpError;

pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Query component safe set: encode everything that would split or terminate a
/// `name=value` pair, plus space and `+` so servers never read them as each other.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Bytes that may not appear raw in a request target: controls (CR and LF included) and space.
/// Existing `%XX` escapes pass through.
const TARGET_UNSAFE: &AsciiSet = &CONTROLS.add(b' ');

/// Where one request goes: host, port and request target (path plus query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    /// Parse an `http://` URL. Port defaults to 80 and path to `/`; any fragment is dropped.
    pub fn parse(url: &str) -> Result<Self, HttpError> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| HttpError::invalid_url(format!("missing scheme in {:?}", url)))?;
        if !scheme.eq_ignore_ascii_case("http") {
            return Err(HttpError::invalid_url(format!("unsupported scheme {:?}", scheme)));
        }
        let rest = rest.split('#').next().unwrap_or("");
        if let Some(bad) = rest.chars().find(|c| c.is_control() || c.is_whitespace()) {
            return Err(HttpError::invalid_url(format!("{:?} not allowed in url", bad)));
        }
        let split_at = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, target) = rest.split_at(split_at);
        let path = if target.is_empty() {
            "/".to_string()
        } else if target.starts_with('?') {
            format!("/{}", target)
        } else {
            target.to_string()
        };
        let (host, port) = split_authority(authority)?;
        Ok(Self::new(host, port, path))
    }

    /// Build from parts. Bytes that cannot go on a request line are percent-encoded in both
    /// host and path, so neither can split the request head.
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.is_empty() { "/".to_string() } else { path };
        Self {
            host: escape_target(host.into()),
            port,
            path: escape_target(path),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request target: path and query as sent on the request line.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value for the `Host` header: the port is included only when it is not 80.
    pub fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == DEFAULT_HTTP_PORT {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// Same host and port, different request target.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self::new(self.host.clone(), self.port, path)
    }

    /// Percent-decoded value of the first query parameter called `name`.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let (_, query) = self.path.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (k == name).then(|| decode_query_component(v))
            })
            .next()
    }

    /// Path without the query string.
    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or("/")
    }

    /// `host:port` with IPv6 hosts bracketed, for log lines and error targets.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}{}", self.authority(), self.path)
    }
}

/// Split `host[:port]` or `[v6]:port`. Userinfo is not supported.
fn split_authority(authority: &str) -> Result<(String, u16), HttpError> {
    if authority.contains('@') {
        return Err(HttpError::invalid_url("userinfo in url is not supported"));
    }
    let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| HttpError::invalid_url("unterminated IPv6 literal"))?;
        let port = match after {
            "" => None,
            p => Some(
                p.strip_prefix(':')
                    .ok_or_else(|| HttpError::invalid_url(format!("junk after IPv6 literal: {:?}", p)))?,
            ),
        };
        (host, port)
    } else {
        match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (authority, None),
        }
    };
    if host.is_empty() {
        return Err(HttpError::invalid_url("empty host"));
    }
    let port = match port {
        None | Some("") => DEFAULT_HTTP_PORT,
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| HttpError::invalid_url(format!("invalid port {:?}", p)))?,
    };
    Ok((host.to_string(), port))
}

fn escape_target(s: String) -> String {
    if s.bytes().all(|b| b.is_ascii_graphic()) {
        return s;
    }
    utf8_percent_encode(&s, TARGET_UNSAFE).to_string()
}

/// Percent-encode a value for use inside a query component (`q=...`, `db=...`).
pub fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// Decode a percent-encoded query component. `+` is left as is.
pub fn decode_query_component(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}
