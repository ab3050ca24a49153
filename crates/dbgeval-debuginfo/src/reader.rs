//! Cursor over container bytes.

use crate::error::FormatError;
use dbgeval_common::limits::{MAX_STRING_LENGTH, MAX_TABLE_ENTRIES};

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, offset: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(FormatError::UnexpectedEof {
                offset: self.offset,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, FormatError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, FormatError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// A table count, rejected when larger than any real table.
    pub(crate) fn count(&mut self, what: &'static str) -> Result<u32, FormatError> {
        let count = self.u32()?;
        if count > MAX_TABLE_ENTRIES {
            return Err(FormatError::TableTooLarge { what, count });
        }
        Ok(count)
    }

    pub(crate) fn string(&mut self) -> Result<String, FormatError> {
        let len = self.u32()?;
        if len > MAX_STRING_LENGTH {
            return Err(FormatError::StringTooLong(len));
        }
        let start = self.offset;
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8 { offset: start })
    }
}
