/*
 * chunked.rs
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

//! Incremental chunked transfer-encoding decoder.
//!
//! The decoder reads from a [`ReceiveBuffer`] starting at its cursor and advances the cursor
//! past every token it completes. When the buffer runs out mid-token it returns
//! [`ChunkStatus::NeedMoreBytes`] without moving the cursor past the partial token, so the
//! receiver can read from the socket and call [`ChunkDecoder::decode`] again.

use bytes::{Bytes, BytesMut};

use crate::protocol::http::buffer::ReceiveBuffer;
use crate::protocol::http::h1::parser::parse_header_bytes;

/// Outcome of one decode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    /// Terminal chunk and trailers consumed; the payloads concatenated in order.
    Complete(Bytes),
    NeedMoreBytes,
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Size,
    Data { remaining: u64 },
    DataEnd,
    Trailer,
    Done,
}

/// Chunked body decoder. Feed it the same growing buffer until it stops asking for bytes.
#[derive(Debug)]
pub struct ChunkDecoder {
    state: State,
    content: BytesMut,
    trailers: Vec<(String, String)>,
    chunks: usize,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Size,
            content: BytesMut::new(),
            trailers: Vec::new(),
            chunks: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Trailer headers that followed the terminal chunk.
    pub fn trailers(&self) -> &[(String, String)] {
        &self.trailers
    }

    pub fn take_trailers(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.trailers)
    }

    /// Number of non-empty chunks decoded so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Decode as far as the buffered bytes allow. After `Complete` the state is final and
    /// further calls return the same content without touching the buffer.
    pub fn decode(&mut self, buf: &mut ReceiveBuffer) -> ChunkStatus {
        loop {
            match self.state {
                State::Size => {
                    let Some(line) = take_line(buf) else {
                        return ChunkStatus::NeedMoreBytes;
                    };
                    match parse_chunk_size(&line) {
                        Ok(0) => self.state = State::Trailer,
                        Ok(size) => {
                            self.chunks += 1;
                            self.state = State::Data { remaining: size };
                        }
                        Err(reason) => return ChunkStatus::Malformed(reason),
                    }
                }
                State::Data { remaining } => {
                    let available = buf.unparsed();
                    if available.is_empty() {
                        return ChunkStatus::NeedMoreBytes;
                    }
                    let n = usize::try_from(remaining)
                        .unwrap_or(usize::MAX)
                        .min(available.len());
                    self.content.extend_from_slice(&available[..n]);
                    buf.advance(n);
                    let remaining = remaining - n as u64;
                    self.state = if remaining == 0 {
                        State::DataEnd
                    } else {
                        State::Data { remaining }
                    };
                }
                State::DataEnd => {
                    let available = buf.unparsed();
                    if available.len() < 2 {
                        if available.first().is_some_and(|&b| b != b'\r') {
                            return ChunkStatus::Malformed("chunk data not followed by CRLF".to_string());
                        }
                        return ChunkStatus::NeedMoreBytes;
                    }
                    if &available[..2] != b"\r\n" {
                        return ChunkStatus::Malformed("chunk data not followed by CRLF".to_string());
                    }
                    buf.advance(2);
                    self.state = State::Size;
                }
                State::Trailer => {
                    let Some(line) = take_line(buf) else {
                        return ChunkStatus::NeedMoreBytes;
                    };
                    if line.is_empty() {
                        self.state = State::Done;
                        continue;
                    }
                    match parse_header_bytes(&line) {
                        Ok(trailer) => self.trailers.push(trailer),
                        Err(_) => return ChunkStatus::Malformed("bad trailer line".to_string()),
                    }
                }
                State::Done => return ChunkStatus::Complete(Bytes::copy_from_slice(&self.content)),
            }
        }
    }
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Take one CRLF-terminated line from the cursor, without the CRLF. `None` if the line is not
/// complete yet; the cursor is untouched in that case.
fn take_line(buf: &mut ReceiveBuffer) -> Option<Vec<u8>> {
    let available = buf.unparsed();
    let end = available.windows(2).position(|w| w == b"\r\n")?;
    let line = available[..end].to_vec();
    buf.advance(end + 2);
    Some(line)
}

/// Hex size before an optional `;extension`.
fn parse_chunk_size(line: &[u8]) -> Result<u64, String> {
    let text = std::str::from_utf8(line).map_err(|_| "chunk size line is not ASCII".to_string())?;
    let token = text.split(';').next().unwrap_or("").trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid chunk size {:?}", token));
    }
    u64::from_str_radix(token, 16).map_err(|_| format!("chunk size {:?} overflows", token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(bytes: &[u8]) -> ReceiveBuffer {
        let mut b = ReceiveBuffer::with_limit(1 << 20);
        b.extend_from_slice(bytes).unwrap();
        b
    }

    #[test]
    fn five_three_zero() {
        let wire = b"5\r\nhello\r\n3\r\nabc\r\n0\r\n\r\nHTTP/1.1 200 OK\r\n";
        let mut buf = buffer(wire);
        let mut d = ChunkDecoder::new();
        let out = d.decode(&mut buf);
        assert_eq!(out, ChunkStatus::Complete(Bytes::from_static(b"helloabc")));
        let terminal_end = wire.len() - b"HTTP/1.1 200 OK\r\n".len();
        assert_eq!(buf.cursor(), terminal_end);
        assert_eq!(d.chunk_count(), 2);
    }

    #[test]
    fn invalid_size_token() {
        let mut buf = buffer(b"zz\r\n");
        assert!(matches!(ChunkDecoder::new().decode(&mut buf), ChunkStatus::Malformed(_)));
        let mut buf = buffer(b";ext\r\n");
        assert!(matches!(ChunkDecoder::new().decode(&mut buf), ChunkStatus::Malformed(_)));
        let mut buf = buffer(b"1ffffffffffffffff\r\n");
        assert!(matches!(ChunkDecoder::new().decode(&mut buf), ChunkStatus::Malformed(_)));
    }

    #[test]
    fn extension_and_uppercase_hex() {
        let mut buf = buffer(b"A;name=value\r\n0123456789\r\n0\r\n\r\n");
        let out = ChunkDecoder::new().decode(&mut buf);
        assert_eq!(out, ChunkStatus::Complete(Bytes::from_static(b"0123456789")));
    }

    #[test]
    fn missing_crlf_after_data() {
        let mut buf = buffer(b"3\r\nabcX\r\n");
        assert!(matches!(ChunkDecoder::new().decode(&mut buf), ChunkStatus::Malformed(_)));
    }

    #[test]
    fn trailers_are_collected() {
        let mut buf = buffer(b"2\r\nok\r\n0\r\nX-Checksum: abc\r\n\r\n");
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(&mut buf), ChunkStatus::Complete(Bytes::from_static(b"ok")));
        assert_eq!(d.trailers(), &[("X-Checksum".to_string(), "abc".to_string())]);
    }

    #[test]
    fn resumes_across_every_split_point() {
        let wire: &[u8] = b"5\r\nhello\r\n3;x\r\nabc\r\n0\r\nT: v\r\n\r\n";
        for cut in 0..wire.len() {
            let mut buf = buffer(&wire[..cut]);
            let mut d = ChunkDecoder::new();
            assert_eq!(d.decode(&mut buf), ChunkStatus::NeedMoreBytes, "cut at {}", cut);
            buf.extend_from_slice(&wire[cut..]).unwrap();
            assert_eq!(
                d.decode(&mut buf),
                ChunkStatus::Complete(Bytes::from_static(b"helloabc")),
                "cut at {}",
                cut
            );
            assert_eq!(buf.cursor(), wire.len());
        }
    }

    #[test]
    fn byte_at_a_time() {
        let wire: &[u8] = b"4\r\nwiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let mut buf = ReceiveBuffer::with_limit(1024);
        let mut d = ChunkDecoder::new();
        for (i, byte) in wire.iter().enumerate() {
            buf.extend_from_slice(&[*byte]).unwrap();
            let status = d.decode(&mut buf);
            if i + 1 < wire.len() {
                assert_eq!(status, ChunkStatus::NeedMoreBytes);
            } else {
                assert_eq!(status, ChunkStatus::Complete(Bytes::from_static(b"wikipedia")));
            }
        }
    }

    #[test]
    fn complete_is_sticky() {
        let mut buf = buffer(b"0\r\n\r\nextra");
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(&mut buf), ChunkStatus::Complete(Bytes::new()));
        let cursor = buf.cursor();
        assert_eq!(d.decode(&mut buf), ChunkStatus::Complete(Bytes::new()));
        assert_eq!(buf.cursor(), cursor);
        assert!(d.is_done());
    }
}
