//! Bounds-checked fixed-width integer reads.

use crate::error::{ParseError, ParseResult};

/// Byte order declared by `EI_DATA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Reads integers from a byte slice in a fixed byte order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    endianness: Endianness,
    context: &'static str,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8], endianness: Endianness, context: &'static str) -> Self {
        Self {
            data,
            endianness,
            context,
        }
    }

    /// Fail early if the slice cannot hold a structure of `size` bytes.
    pub(crate) fn require(&self, size: usize) -> ParseResult<()> {
        if self.data.len() < size {
            return Err(ParseError::too_short(size as u64, self.data.len()));
        }
        Ok(())
    }

    fn array<const N: usize>(&self, offset: usize) -> ParseResult<[u8; N]> {
        self.data
            .get(offset..offset + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| {
                ParseError::invalid_structure(
                    self.context,
                    offset as u64,
                    format!("truncated {N}-byte field"),
                )
            })
    }

    pub(crate) fn u8(&self, offset: usize) -> ParseResult<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub(crate) fn u16(&self, offset: usize) -> ParseResult<u16> {
        let bytes = self.array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    pub(crate) fn u32(&self, offset: usize) -> ParseResult<u32> {
        let bytes = self.array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    pub(crate) fn u64(&self, offset: usize) -> ParseResult<u64> {
        let bytes = self.array(offset)?;
        Ok(match self.endianness {
            Endianness::Little => u64::from_le_bytes(bytes),
            Endianness::Big => u64::from_be_bytes(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_respect_byte_order() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let le = Reader::new(&data, Endianness::Little, "test");
        let be = Reader::new(&data, Endianness::Big, "test");
        assert_eq!(le.u16(0).unwrap(), 0x0201);
        assert_eq!(be.u16(0).unwrap(), 0x0102);
        assert_eq!(le.u32(4).unwrap(), 0x0807_0605);
        assert_eq!(be.u64(0).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn truncated_read_is_an_error() {
        let data = [0u8; 3];
        let r = Reader::new(&data, Endianness::Little, "test");
        assert!(matches!(r.u32(0), Err(ParseError::InvalidStructure { .. })));
        assert!(matches!(r.require(4), Err(ParseError::TooShort { expected: 4, actual: 3 })));
    }
}
