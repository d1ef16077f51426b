/*
 * response.rs
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

//! HTTP response: status, headers (raw block and parsed pairs), trailers, decoded content.

use bytes::Bytes;

use crate::protocol::http::h1::{Framing, ResponseHead};

/// A complete, validated response.
#[derive(Debug, Clone)]
pub struct Response {
    code: u16,
    reason: String,
    framing: Framing,
    header_block: String,
    headers: Vec<(String, String)>,
    trailers: Vec<(String, String)>,
    content: Bytes,
}

impl Response {
    pub(crate) fn new(
        head: ResponseHead,
        header_block: String,
        content: Bytes,
        trailers: Vec<(String, String)>,
    ) -> Self {
        Self {
            code: head.status.code,
            reason: head.status.reason,
            framing: head.framing,
            header_block,
            headers: head.headers,
            trailers,
            content,
        }
    }

    /// HTTP status code (e.g. 204, 404).
    pub fn status(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Framing the body arrived with.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Status line and header lines as received, CRLF-separated, without the blank line.
    pub fn header_block(&self) -> &str {
        &self.header_block
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn trailers(&self) -> &[(String, String)] {
        &self.trailers
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }

    /// Content as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
