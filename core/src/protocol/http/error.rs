/*
 * error.rs
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

//! HTTP engine errors. Every failed exchange surfaces exactly one of these.

use std::io;

/// Errors produced by one HTTP request/response exchange.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// URL could not be parsed, has no host, or uses a scheme other than `http`.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Name resolution or TCP connect failed.
    #[error("connection to {target} failed: {source}")]
    Connection {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Writing the request failed (peer closed, reset).
    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    /// Reading the response failed (socket error, reset).
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// Status line or headers could not be parsed, or the body was cut short.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid chunk-size token or truncated chunked framing.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),

    /// The response would not fit in the receive buffer.
    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge { limit: usize },

    /// A connect, write, or response deadline elapsed.
    #[error("timed out while {0}")]
    Timeout(&'static str),
}

/// Discriminant of [`HttpError`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    Connection,
    Send,
    Receive,
    MalformedResponse,
    MalformedChunk,
    ResponseTooLarge,
    Timeout,
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            HttpError::Connection { .. } => ErrorKind::Connection,
            HttpError::Send(_) => ErrorKind::Send,
            HttpError::Receive(_) => ErrorKind::Receive,
            HttpError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            HttpError::MalformedChunk(_) => ErrorKind::MalformedChunk,
            HttpError::ResponseTooLarge { .. } => ErrorKind::ResponseTooLarge,
            HttpError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    pub(crate) fn invalid_url(msg: impl Into<String>) -> Self {
        HttpError::InvalidUrl(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        HttpError::MalformedResponse(msg.into())
    }
}

/// True for the error kinds a socket reports when its read or write timeout fires.
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(HttpError::invalid_url("x").kind(), ErrorKind::InvalidUrl);
        assert_eq!(
            HttpError::ResponseTooLarge { limit: 4 }.kind(),
            ErrorKind::ResponseTooLarge
        );
        assert_eq!(HttpError::Timeout("connecting").kind(), ErrorKind::Timeout);
    }

    #[test]
    fn display_carries_detail() {
        let e = HttpError::Connection {
            target: "db:8086".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(e.to_string(), "connection to db:8086 failed: refused");
        assert_eq!(
            HttpError::malformed("bad status line").to_string(),
            "malformed response: bad status line"
        );
    }
}
