use crate::wire::{varint, FixedWidth, LengthPrefix, MAX_NESTING_DEPTH};
use crate::{DecodeError, WireFormat};

/// A cursor over a borrowed buffer. Reading past the end is an error, never a short read.
pub struct WireReader<'b> {
    buf: &'b [u8],
    pos: usize,
    fmt: WireFormat,
    depth: usize,
}

impl<'b> WireReader<'b> {
    pub fn new(buf: &'b [u8], offset: usize, fmt: WireFormat) -> Result<Self, DecodeError> {
        if offset > buf.len() {
            return Err(DecodeError::Truncated {
                offset,
                needed: 0,
                remaining: 0,
            });
        }
        Ok(Self {
            buf,
            pos: offset,
            fmt,
            depth: 0,
        })
    }

    /// The offset immediately past the last byte read.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn format(&self) -> WireFormat {
        self.fmt
    }

    /// Descends into a nested record. Fails past [`MAX_NESTING_DEPTH`].
    pub fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::DepthExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn take(&mut self, len: usize) -> Result<&'b [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_fixed<T: FixedWidth>(&mut self) -> Result<T, DecodeError> {
        let order = self.fmt.byte_order;
        let bytes = self.take(T::WIDTH)?;
        Ok(T::get(order, bytes))
    }

    /// Reads a LEB128 varint whose value must fit in `bits` bits.
    pub fn read_varint(&mut self, bits: u32) -> Result<u64, DecodeError> {
        let mut u: u64 = 0;
        for i in 0..varint::MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let low = (byte & 0x7f) as u64;
            let shift = 7 * i as u32;
            if shift == 63 && low > 1 {
                return Err(DecodeError::VarIntOverflow { bits });
            }
            u |= low << shift;
            if byte & 0x80 == 0 {
                if bits < 64 && u >> bits != 0 {
                    return Err(DecodeError::VarIntOverflow { bits });
                }
                return Ok(u);
            }
        }
        Err(DecodeError::VarIntOverflow { bits })
    }

    /// Reads a string length or list count, as the wire format prescribes.
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = LengthPrefix::deser(self)?;
        Ok(*len as usize)
    }
}
