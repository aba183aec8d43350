//! The [`ByteCursor`] type

use byteorder::ByteOrder;
use std::{
    borrow::Cow,
    io::{self, Read, Seek, SeekFrom},
    ops::Range,
};

use crate::error::{Error, Result};

/// Sequential and random access reader over a borrowed byte buffer.
///
/// Failed reads do not move the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
        let mut cursor = Self::new(data);
        cursor.set_position(pos)?;
        Ok(cursor)
    }

    /// The whole underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the read position. Positions past the end of the buffer are rejected, the end itself
    /// is allowed.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.out_of_bounds(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the read position by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_fixed(n).map(|_| ())
    }

    /// Borrow the bytes in `range` without moving the cursor.
    pub fn slice(&self, range: Range<usize>) -> Result<&'a [u8]> {
        let wanted = range.end.saturating_sub(range.start);
        if range.start > range.end {
            return Err(self.out_of_bounds(range.start, wanted));
        }
        self.data
            .get(range.clone())
            .ok_or_else(|| self.out_of_bounds(range.start, wanted))
    }

    /// A new cursor over the bytes in `range`, positioned at its start.
    pub fn sub(&self, range: Range<usize>) -> Result<ByteCursor<'a>> {
        self.slice(range).map(ByteCursor::new)
    }

    /// Read exactly `n` bytes.
    pub fn read_fixed(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| self.out_of_bounds(self.pos, n))?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or_else(|| self.out_of_bounds(self.pos, n))?;
        self.pos = end;
        Ok(bytes)
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed(N)?);
        Ok(out)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.out_of_bounds(self.pos, 1))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_fixed(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        Ok(E::read_u16(self.read_fixed(2)?))
    }

    pub fn read_i16<E: ByteOrder>(&mut self) -> Result<i16> {
        Ok(E::read_i16(self.read_fixed(2)?))
    }

    pub fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        Ok(E::read_u32(self.read_fixed(4)?))
    }

    pub fn read_i32<E: ByteOrder>(&mut self) -> Result<i32> {
        Ok(E::read_i32(self.read_fixed(4)?))
    }

    pub fn read_u64<E: ByteOrder>(&mut self) -> Result<u64> {
        Ok(E::read_u64(self.read_fixed(8)?))
    }

    pub fn read_i64<E: ByteOrder>(&mut self) -> Result<i64> {
        Ok(E::read_i64(self.read_fixed(8)?))
    }

    pub fn read_f32<E: ByteOrder>(&mut self) -> Result<f32> {
        Ok(E::read_f32(self.read_fixed(4)?))
    }

    pub fn read_f64<E: ByteOrder>(&mut self) -> Result<f64> {
        Ok(E::read_f64(self.read_fixed(8)?))
    }

    /// Position of the first `byte` at or after `start`, or the buffer length when there is none.
    pub fn find_terminator(&self, byte: u8, start: usize) -> usize {
        self.data
            .get(start..)
            .and_then(|rest| rest.iter().position(|b| *b == byte))
            .map_or(self.data.len(), |offset| start + offset)
    }

    /// Read a NUL terminated string starting at `start` without moving the cursor.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. A missing terminator ends the string at the
    /// end of the buffer.
    pub fn read_cstr_at(&self, start: usize) -> Result<Cow<'a, str>> {
        let end = self.find_terminator(0, start);
        self.slice(start..end.max(start))
            .map(String::from_utf8_lossy)
    }

    fn out_of_bounds(&self, offset: usize, wanted: usize) -> Error {
        Error::OutOfBounds {
            offset,
            wanted,
            size: self.data.len(),
        }
    }
}

impl Read for ByteCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        if n > 0 {
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
        }
        Ok(n)
    }
}

impl Seek for ByteCursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => (self.data.len() as u64).checked_add_signed(delta),
            SeekFrom::Current(delta) => (self.pos as u64).checked_add_signed(delta),
        };

        let target = target
            .and_then(|t| usize::try_from(t).ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "invalid seek to a negative or overflowing position",
                )
            })?;

        self.pos = target;
        Ok(target as u64)
    }
}
