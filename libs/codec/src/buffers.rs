//! # Payload Buffers
//!
//! Bounds-checked little-endian writer and reader for the inner payload.
//! The reader tracks its offset so every decode error names the byte at which
//! the input went wrong.

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;

/// Append-only payload writer
#[derive(Debug)]
pub struct PayloadWriter {
    buf: Vec<u8>,
    max_length: usize,
}

impl PayloadWriter {
    pub fn new(limits: &CodecLimits) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            max_length: limits.max_length,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a u32 length checked against the length limit
    pub fn put_len(&mut self, len: usize, context: &str) -> CodecResult<()> {
        if len > self.max_length {
            return Err(CodecError::length_exceeded(len, self.max_length, context));
        }
        let len = u32::try_from(len)
            .map_err(|_| CodecError::length_exceeded(len, u32::MAX as usize, context))?;
        self.put_u32(len);
        Ok(())
    }

    /// Write a u16 count for record fields
    pub fn put_count(&mut self, count: usize, context: &str) -> CodecResult<()> {
        let count = u16::try_from(count)
            .map_err(|_| CodecError::length_exceeded(count, u16::MAX as usize, context))?;
        self.put_u16(count);
        Ok(())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.put_len(bytes.len(), "byte array")?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn put_str(&mut self, value: &str) -> CodecResult<()> {
        self.put_len(value.len(), "string")?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Reserve a u32 slot to be patched once the following data is written
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.buf.len();
        self.buf.extend_from_slice(&[0; 4]);
        at
    }

    /// Fill a reserved slot with the number of bytes written after it
    pub fn patch_len(&mut self, slot: usize, context: &str) -> CodecResult<()> {
        let written = self.buf.len() - slot - 4;
        let len = u32::try_from(written)
            .map_err(|_| CodecError::length_exceeded(written, u32::MAX as usize, context))?;
        self.buf[slot..slot + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an encoded payload
#[derive(Debug)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
    max_length: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8], limits: &CodecLimits) -> Self {
        Self {
            data,
            pos: 0,
            max_length: limits.max_length,
        }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn buffer_size(&self) -> usize {
        self.data.len()
    }

    /// Decode error at the current offset
    pub fn error(&self, description: impl Into<String>) -> CodecError {
        CodecError::decode(self.pos, description, self.data.len())
    }

    pub fn take(&mut self, n: usize, context: &str) -> CodecResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::truncated(self.pos, n, self.data.len(), context));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, context: &str) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, context)?);
        Ok(out)
    }

    pub fn read_u8(&mut self, context: &str) -> CodecResult<u8> {
        Ok(self.take_array::<1>(context)?[0])
    }

    pub fn read_u16(&mut self, context: &str) -> CodecResult<u16> {
        Ok(u16::from_le_bytes(self.take_array(context)?))
    }

    pub fn read_u32(&mut self, context: &str) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.take_array(context)?))
    }

    pub fn read_u64(&mut self, context: &str) -> CodecResult<u64> {
        Ok(u64::from_le_bytes(self.take_array(context)?))
    }

    pub fn read_i64(&mut self, context: &str) -> CodecResult<i64> {
        Ok(i64::from_le_bytes(self.take_array(context)?))
    }

    pub fn read_f64(&mut self, context: &str) -> CodecResult<f64> {
        Ok(f64::from_le_bytes(self.take_array(context)?))
    }

    /// Read a declared length, rejecting values over the length limit
    pub fn read_len(&mut self, context: &str) -> CodecResult<usize> {
        let at = self.pos;
        let len = self.read_u32(context)? as usize;
        if len > self.max_length {
            return Err(CodecError::decode(
                at,
                format!(
                    "declared {context} length {len} exceeds limit {}",
                    self.max_length
                ),
                self.data.len(),
            ));
        }
        Ok(len)
    }

    pub fn read_bytes(&mut self, context: &str) -> CodecResult<&'a [u8]> {
        let len = self.read_len(context)?;
        self.take(len, context)
    }

    pub fn read_str(&mut self, context: &str) -> CodecResult<&'a str> {
        let len = self.read_len(context)?;
        let at = self.pos;
        let bytes = self.take(len, context)?;
        std::str::from_utf8(bytes).map_err(|e| {
            CodecError::decode(at, format!("invalid UTF-8 in {context}: {e}"), self.data.len())
        })
    }
}
