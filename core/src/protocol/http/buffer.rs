/*
 * buffer.rs
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

//! Receive buffer: append-only bytes with a monotonic parse cursor and an upper bound.

use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::protocol::http::HttpError;

const READ_CHUNK: usize = 8192;

/// Growable response buffer. Bytes are only ever appended; `cursor` only moves forward and
/// never passes `len()`.
#[derive(Debug)]
pub struct ReceiveBuffer {
    data: BytesMut,
    cursor: usize,
    limit: usize,
}

impl ReceiveBuffer {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(READ_CHUNK.min(limit)),
            cursor: 0,
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes from the cursor to the end.
    pub fn unparsed(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /// Move the cursor forward by `n`, stopping at the end of the data.
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.data.len());
    }

    /// Move the cursor to `pos` if that is forward of where it is now.
    pub fn advance_to(&mut self, pos: usize) {
        self.cursor = self.cursor.max(pos.min(self.data.len()));
    }

    /// Append bytes, failing instead of growing past the limit.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        if self.data.len() + bytes.len() > self.limit {
            return Err(HttpError::ResponseTooLarge { limit: self.limit });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// One read from `reader` appended to the buffer. `ReadOutcome::Eof` once the peer is done
    /// sending; `Overflow` if the buffer is full and the peer still has bytes.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> io::Result<ReadOutcome> {
        let room = self.limit - self.data.len();
        if room == 0 {
            // A full buffer still has to notice a peer that is done sending.
            let mut probe = [0u8; 1];
            return match reader.read(&mut probe)? {
                0 => Ok(ReadOutcome::Eof),
                _ => Ok(ReadOutcome::Overflow),
            };
        }
        let mut tmp = [0u8; READ_CHUNK];
        let want = room.min(READ_CHUNK);
        let n = reader.read(&mut tmp[..want])?;
        if n == 0 {
            return Ok(ReadOutcome::Eof);
        }
        self.data.extend_from_slice(&tmp[..n]);
        Ok(ReadOutcome::Read(n))
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

/// Result of one [`ReceiveBuffer::read_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Read(usize),
    Eof,
    /// The peer sent more bytes than the buffer limit allows.
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::http::ErrorKind;

    #[test]
    fn cursor_is_monotonic_and_bounded() {
        let mut b = ReceiveBuffer::with_limit(64);
        b.extend_from_slice(b"hello").unwrap();
        b.advance(3);
        assert_eq!(b.unparsed(), b"lo");
        b.advance_to(1);
        assert_eq!(b.cursor(), 3);
        b.advance(100);
        assert_eq!(b.cursor(), 5);
        assert!(b.unparsed().is_empty());
    }

    #[test]
    fn extend_past_limit_fails() {
        let mut b = ReceiveBuffer::with_limit(4);
        b.extend_from_slice(b"abcd").unwrap();
        let err = b.extend_from_slice(b"e").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseTooLarge);
        assert_eq!(b.as_bytes(), b"abcd");
    }

    #[test]
    fn read_from_reports_overflow_and_eof() {
        let mut b = ReceiveBuffer::with_limit(3);
        let mut src: &[u8] = b"abcdef";
        assert_eq!(b.read_from(&mut src).unwrap(), ReadOutcome::Read(3));
        assert_eq!(b.read_from(&mut src).unwrap(), ReadOutcome::Overflow);

        let mut b = ReceiveBuffer::with_limit(3);
        let mut src: &[u8] = b"abc";
        assert_eq!(b.read_from(&mut src).unwrap(), ReadOutcome::Read(3));
        assert_eq!(b.read_from(&mut src).unwrap(), ReadOutcome::Eof);
    }
}
