/*
 * parser.rs
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

//! HTTP/1.1 response head parser: status line, headers, and body framing.

use tracing::warn;

use crate::protocol::http::HttpError;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// How the end of the body is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    FixedLength(u64),
    Chunked,
    ReadUntilClose,
}

/// Parsed first line of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: String,
    pub code: u16,
    pub reason: String,
}

/// Status line, headers and the offset where the body begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusLine,
    pub headers: Vec<(String, String)>,
    /// Length of the header block, which starts at offset 0 and excludes the blank line.
    pub header_len: usize,
    pub body_offset: usize,
    pub framing: Framing,
}

impl ResponseHead {
    pub fn status_code(&self) -> u16 {
        self.status.code
    }
}

/// Find the start of the first `\r\n\r\n` at or after `from`.
pub fn find_header_end(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|p| p + from)
}

/// Parse a response head from the start of `buf`. `Ok(None)` means the header terminator has
/// not arrived yet.
pub fn parse_head(buf: &[u8]) -> Result<Option<ResponseHead>, HttpError> {
    match find_header_end(buf, 0) {
        Some(end) => parse_head_at(buf, end).map(Some),
        None => Ok(None),
    }
}

/// Parse the head whose terminator starts at `header_end` (as returned by [`find_header_end`]).
pub fn parse_head_at(buf: &[u8], header_end: usize) -> Result<ResponseHead, HttpError> {
    let mut lines = split_crlf(&buf[..header_end]);
    let status = parse_status_line(&String::from_utf8_lossy(lines.next().unwrap_or(b"")))?;

    let mut headers = Vec::new();
    for line in lines {
        headers.push(parse_header_bytes(line)?);
    }
    let framing = framing_for(&headers);

    Ok(ResponseHead {
        status,
        headers,
        header_len: header_end,
        body_offset: header_end + HEADER_TERMINATOR.len(),
        framing,
    })
}

/// `HTTP/1.1 200 OK`: version, three-digit code, optional reason phrase. A trailing CRLF is
/// tolerated.
pub fn parse_status_line(line: &str) -> Result<StatusLine, HttpError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(HttpError::malformed(format!("bad status line {:?}", truncate(line))));
    }
    let code_str = parts.next().unwrap_or("");
    if code_str.len() != 3 || !code_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HttpError::malformed(format!("bad status code {:?}", truncate(code_str))));
    }
    let code = code_str
        .parse::<u16>()
        .map_err(|_| HttpError::malformed("bad status code"))?;
    Ok(StatusLine {
        version: version.to_string(),
        code,
        reason: parts.next().unwrap_or("").trim().to_string(),
    })
}

/// `Name: value`. Name must be non-empty and free of whitespace; the value is trimmed.
pub fn parse_header_line(line: &str) -> Result<(String, String), HttpError> {
    parse_header_bytes(line.as_bytes())
}

/// Byte form of [`parse_header_line`]. The name must be printable ASCII; the value may carry
/// obs-text (0x80-0xFF), which is decoded lossily.
pub fn parse_header_bytes(line: &[u8]) -> Result<(String, String), HttpError> {
    let lossy = || String::from_utf8_lossy(line);
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| HttpError::malformed(format!("header line without colon: {:?}", truncate(&lossy()))))?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);
    if name.is_empty() || !name.iter().all(|b| b.is_ascii_graphic()) {
        return Err(HttpError::malformed(format!(
            "bad header name {:?}",
            truncate(&String::from_utf8_lossy(name))
        )));
    }
    let name = String::from_utf8_lossy(name).into_owned();
    Ok((name, String::from_utf8_lossy(value).trim().to_string()))
}

fn split_crlf(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(block);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(2).position(|w| w == b"\r\n") {
            Some(i) => {
                rest = Some(&current[i + 2..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Chunked wins over Content-Length; a Content-Length that is not a non-negative integer
/// leaves the body delimited by connection close.
fn framing_for(headers: &[(String, String)]) -> Framing {
    let chunked = headers.iter().any(|(k, v)| {
        k.eq_ignore_ascii_case("transfer-encoding") && v.to_ascii_lowercase().contains("chunked")
    });
    if chunked {
        return Framing::Chunked;
    }
    match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("content-length")) {
        Some((_, v)) => match v.parse::<u64>() {
            Ok(n) => Framing::FixedLength(n),
            Err(_) => {
                warn!(content_length = %v, "ignoring unparseable Content-Length");
                Framing::ReadUntilClose
            }
        },
        None => Framing::ReadUntilClose,
    }
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(64) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::http::ErrorKind;

    #[test]
    fn status_line_no_content() {
        let s = parse_status_line("HTTP/1.1 204 No Content\r\n").unwrap();
        assert_eq!(s.code, 204);
        assert_eq!(s.reason, "No Content");
        assert_eq!(s.version, "HTTP/1.1");
    }

    #[test]
    fn status_line_without_reason() {
        assert_eq!(parse_status_line("HTTP/1.0 200").unwrap().code, 200);
    }

    #[test]
    fn garbage_status_line() {
        for line in ["GARBAGE\r\n", "HTTP/1.1 20 OK", "HTTP/1.1 2000 OK", "HTTP/1.1 abc OK", ""] {
            let err = parse_status_line(line).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedResponse, "{:?}", line);
        }
    }

    #[test]
    fn incomplete_head_needs_more() {
        assert!(parse_head(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n").unwrap().is_none());
    }

    #[test]
    fn fixed_length_head() {
        let buf = b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\nX-Influxdb-Version: 1.8\r\n\r\nhello";
        let head = parse_head(buf).unwrap().unwrap();
        assert_eq!(head.status_code(), 200);
        assert_eq!(head.framing, Framing::FixedLength(5));
        assert_eq!(head.headers.len(), 2);
        assert_eq!(head.headers[1], ("X-Influxdb-Version".to_string(), "1.8".to_string()));
        assert_eq!(&buf[head.body_offset..], b"hello");
        assert_eq!(head.body_offset, head.header_len + 4);
    }

    #[test]
    fn chunked_overrides_content_length() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Length: 99\r\nTransfer-Encoding: gzip, Chunked\r\n\r\n";
        assert_eq!(parse_head(buf).unwrap().unwrap().framing, Framing::Chunked);
    }

    #[test]
    fn no_length_reads_until_close() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n";
        assert_eq!(parse_head(buf).unwrap().unwrap().framing, Framing::ReadUntilClose);
        let bad = b"HTTP/1.1 200 OK\r\nContent-Length: -4\r\n\r\n";
        assert_eq!(parse_head(bad).unwrap().unwrap().framing, Framing::ReadUntilClose);
    }

    #[test]
    fn header_without_colon_is_malformed() {
        let buf = b"HTTP/1.1 200 OK\r\nnot a header\r\n\r\n";
        assert_eq!(parse_head(buf).unwrap_err().kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn obs_text_in_values_is_accepted() {
        let buf = b"HTTP/1.1 200 Tr\xe8s bien\r\nX-Name: caf\xe9\r\nContent-Length: 2\r\n\r\nok";
        let head = parse_head(buf).unwrap().unwrap();
        assert_eq!(head.status_code(), 200);
        assert_eq!(head.status.reason, "Tr\u{fffd}s bien");
        assert_eq!(head.headers[0], ("X-Name".to_string(), "caf\u{fffd}".to_string()));
        assert_eq!(head.framing, Framing::FixedLength(2));
    }

    #[test]
    fn non_ascii_header_name_is_malformed() {
        let buf = b"HTTP/1.1 200 OK\r\nX-\xe9: v\r\n\r\n";
        assert_eq!(parse_head(buf).unwrap_err().kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn find_header_end_from_offset() {
        let buf = b"ab\r\n\r\ncd";
        assert_eq!(find_header_end(buf, 0), Some(2));
        assert_eq!(find_header_end(buf, 3), None);
        assert_eq!(find_header_end(buf, 50), None);
    }
}
