//! Bounds-checked sequential reader for big-endian Photoshop structures.
//!
//! Every read either succeeds entirely or fails with
//! [`IoError::RangeOutOfBounds`] without moving the cursor, so callers can
//! treat a failed read as "insufficient data" and stop cleanly.

use crate::error::IoError;

use super::range_reader::{read_u16_be, read_u32_be};

/// A forward-only cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset. Positions past the end are allowed;
    /// subsequent reads will simply fail.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], IoError> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Borrow `len` bytes without advancing.
    pub fn peek(&self, len: usize) -> Result<&'a [u8], IoError> {
        if self.pos > self.data.len() || len > self.remaining() {
            return Err(IoError::RangeOutOfBounds {
                offset: self.pos as u64,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(&self.data[self.pos..self.pos + len])
    }

    /// Advance by `len` bytes, failing if that would pass the end.
    pub fn skip(&mut self, len: usize) -> Result<(), IoError> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, IoError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, IoError> {
        Ok(read_u16_be(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16, IoError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, IoError> {
        Ok(read_u32_be(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, IoError> {
        Ok(self.read_u32()? as i32)
    }

    /// Read a 4-byte signature or key such as `8BIM` or `luni`.
    pub fn read_tag(&mut self) -> Result<[u8; 4], IoError> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

// =============================================================================
// Tests
// =============================================================================
