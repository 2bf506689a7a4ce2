//! Length-prefixed framing with a null marker
//!
//! ```text
//! null:   [0x00]
//! value:  [0x01][payload length: u32 LE][payload]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use codec::{CodecError, CodecResult};

pub const NULL_MARKER: u8 = 0x00;
pub const VALUE_MARKER: u8 = 0x01;

/// marker (1) + length (4)
pub const FRAME_HEADER_SIZE: usize = 5;

pub fn write_null(buf: &mut BytesMut) {
    buf.put_u8(NULL_MARKER);
}

pub fn write_frame(buf: &mut BytesMut, payload: &[u8], max_frame_bytes: usize) -> CodecResult<()> {
    if payload.len() > max_frame_bytes {
        return Err(CodecError::length_exceeded(
            payload.len(),
            max_frame_bytes,
            "frame payload",
        ));
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| CodecError::length_exceeded(payload.len(), u32::MAX as usize, "frame payload"))?;
    buf.reserve(FRAME_HEADER_SIZE + payload.len());
    buf.put_u8(VALUE_MARKER);
    buf.put_u32_le(len);
    buf.put_slice(payload);
    Ok(())
}

/// Read one frame; `None` for the null marker
///
/// Offsets in errors are relative to the start of the frame. On error the
/// buffer may have been partially consumed.
pub fn read_frame<B: Buf>(buf: &mut B, max_frame_bytes: usize) -> CodecResult<Option<Bytes>> {
    let available = buf.remaining();
    if available < 1 {
        return Err(CodecError::truncated(0, 1, available, "frame marker"));
    }
    match buf.get_u8() {
        NULL_MARKER => return Ok(None),
        VALUE_MARKER => {}
        marker => {
            return Err(CodecError::decode(
                0,
                format!("unknown frame marker {marker:#04x}"),
                available,
            ))
        }
    }

    if buf.remaining() < 4 {
        return Err(CodecError::truncated(1, 4, available, "frame length"));
    }
    let len = buf.get_u32_le() as usize;
    if len > max_frame_bytes {
        return Err(CodecError::decode(
            1,
            format!("declared frame length {len} exceeds limit {max_frame_bytes}"),
            available,
        ));
    }
    if buf.remaining() < len {
        return Err(CodecError::truncated(FRAME_HEADER_SIZE, len, available, "frame payload"));
    }
    Ok(Some(buf.copy_to_bytes(len)))
}
