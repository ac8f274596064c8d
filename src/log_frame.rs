// Docker multiplexed log stream: [stream: u8][0; 3][len: u32 BE][payload; len]

use bytes::{BufMut, BytesMut};

pub const HEADER_LEN: usize = 8;

/// Stream selector carried in byte 0 of a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamKind {
    Stdin = 0,
    Stdout = 1,
    Stderr = 2,
}

/// Split a raw log buffer into trimmed, non-empty lines.
///
/// Frames are peeled off the front one at a time. As soon as the remainder cannot
/// be a frame (short header, zero length, or a length running past the end of the
/// buffer) the whole remainder is read as plain text instead. Never fails.
pub fn decode(raw: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = raw;
    while !rest.is_empty() {
        if rest.len() < HEADER_LEN {
            push_lines(&mut lines, rest);
            break;
        }
        let size = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        if size == 0 || size > rest.len() - HEADER_LEN {
            push_lines(&mut lines, rest);
            break;
        }
        push_lines(&mut lines, &rest[HEADER_LEN..HEADER_LEN + size]);
        rest = &rest[HEADER_LEN + size..];
    }
    lines
}

/// Append one frame (header + payload) to `out`.
pub fn encode_frame(out: &mut BytesMut, stream: StreamKind, payload: &[u8]) {
    out.reserve(HEADER_LEN + payload.len());
    out.put_u8(stream as u8);
    out.put_bytes(0, 3);
    out.put_u32(payload.len() as u32);
    out.put_slice(payload);
}

fn push_lines(dst: &mut Vec<String>, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    dst.extend(
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    );
}
