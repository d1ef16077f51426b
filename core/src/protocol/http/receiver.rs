/*
 * receiver.rs
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

//! Blocking response read loop: grow the buffer from any `Read` until the head is parsed and
//! the body is complete for its framing mode, or the peer closes.

use std::io::{self, Read};

use tracing::trace;

use crate::protocol::http::buffer::{ReadOutcome, ReceiveBuffer};
use crate::protocol::http::error::is_timeout;
use crate::protocol::http::h1::{find_header_end, parse_head_at, ChunkDecoder, ChunkStatus, Framing, ResponseHead};
use crate::protocol::http::response::Response;
use crate::protocol::http::HttpError;

/// Body phase, selected once the head is parsed.
enum Body {
    Fixed { end: usize },
    Chunked(ChunkDecoder),
    UntilClose,
}

/// Read one complete response from `reader`, buffering at most `limit` bytes.
pub fn receive<R: Read>(reader: &mut R, limit: usize) -> Result<Response, HttpError> {
    let mut buf = ReceiveBuffer::with_limit(limit);

    let head = read_head(reader, &mut buf)?;
    trace!(status = head.status_code(), framing = ?head.framing, "received response head");

    let mut body = match head.framing {
        Framing::FixedLength(n) => {
            let end = usize::try_from(n)
                .ok()
                .and_then(|n| head.body_offset.checked_add(n))
                .filter(|&end| end <= limit)
                .ok_or(HttpError::ResponseTooLarge { limit })?;
            Body::Fixed { end }
        }
        Framing::Chunked => Body::Chunked(ChunkDecoder::new()),
        Framing::ReadUntilClose => Body::UntilClose,
    };

    loop {
        match &mut body {
            Body::Fixed { end } if buf.len() >= *end => {
                let end = *end;
                return Ok(finish(head, buf, |bytes, start| bytes.slice(start..end), Vec::new()));
            }
            Body::Chunked(decoder) => match decoder.decode(&mut buf) {
                ChunkStatus::Complete(content) => {
                    let trailers = decoder.take_trailers();
                    return Ok(finish(head, buf, move |_, _| content, trailers));
                }
                ChunkStatus::Malformed(reason) => return Err(HttpError::MalformedChunk(reason)),
                ChunkStatus::NeedMoreBytes => {}
            },
            _ => {}
        }

        match read_more(reader, &mut buf)? {
            ReadOutcome::Read(_) => {}
            ReadOutcome::Overflow => return Err(HttpError::ResponseTooLarge { limit }),
            ReadOutcome::Eof => {
                return match body {
                    Body::UntilClose => Ok(finish(head, buf, |bytes, start| bytes.slice(start..), Vec::new())),
                    Body::Fixed { end } => Err(HttpError::malformed(format!(
                        "connection closed after {} of {} body bytes",
                        buf.len() - head.body_offset,
                        end - head.body_offset
                    ))),
                    Body::Chunked(_) => Err(HttpError::MalformedChunk(
                        "connection closed inside chunked body".to_string(),
                    )),
                };
            }
        }
    }
}

/// Read until the header terminator is buffered, then parse the head. The search resumes from
/// the buffer cursor so earlier bytes are not rescanned; on return the cursor is at the body.
fn read_head<R: Read>(reader: &mut R, buf: &mut ReceiveBuffer) -> Result<ResponseHead, HttpError> {
    loop {
        if let Some(end) = find_header_end(buf.as_bytes(), buf.cursor()) {
            let head = parse_head_at(buf.as_bytes(), end)?;
            buf.advance_to(head.body_offset);
            return Ok(head);
        }
        // The terminator may straddle this read and the next one.
        buf.advance_to(buf.len().saturating_sub(3));

        match read_more(reader, buf)? {
            ReadOutcome::Read(_) => {}
            ReadOutcome::Overflow => return Err(HttpError::ResponseTooLarge { limit: buf.limit() }),
            ReadOutcome::Eof if buf.is_empty() => {
                return Err(HttpError::malformed("connection closed without a response"));
            }
            ReadOutcome::Eof => {
                return Err(HttpError::malformed("connection closed before end of response headers"));
            }
        }
    }
}

/// One socket read, retrying on `Interrupted` and mapping failures to engine errors.
fn read_more<R: Read>(reader: &mut R, buf: &mut ReceiveBuffer) -> Result<ReadOutcome, HttpError> {
    loop {
        match buf.read_from(reader) {
            Ok(outcome) => {
                trace!(?outcome, buffered = buf.len(), "read");
                return Ok(outcome);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => return Err(HttpError::Timeout("receiving response")),
            Err(e) => return Err(HttpError::Receive(e)),
        }
    }
}

fn finish<F>(head: ResponseHead, buf: ReceiveBuffer, content: F, trailers: Vec<(String, String)>) -> Response
where
    F: FnOnce(&bytes::Bytes, usize) -> bytes::Bytes,
{
    let bytes = buf.freeze();
    let content = content(&bytes, head.body_offset);
    let header_block = String::from_utf8_lossy(&bytes[..head.header_len]).into_owned();
    Response::new(head, header_block, content, trailers)
}
