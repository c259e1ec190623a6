use crate::wire::{varint, FixedWidth, LengthPrefix, MAX_NESTING_DEPTH};
use crate::{EncodeError, WireFormat};

/// A cursor over a caller-owned buffer. Never grows the buffer; running out of room is an error.
pub struct WireWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
    fmt: WireFormat,
    depth: usize,
}

impl<'b> WireWriter<'b> {
    pub fn new(buf: &'b mut [u8], offset: usize, fmt: WireFormat) -> Result<Self, EncodeError> {
        if offset > buf.len() {
            return Err(EncodeError::OffsetOutOfBounds {
                offset,
                len: buf.len(),
            });
        }
        Ok(Self {
            buf,
            pos: offset,
            fmt,
            depth: 0,
        })
    }

    /// The offset immediately past the last byte written.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn format(&self) -> WireFormat {
        self.fmt
    }

    /// Descends into a nested record. Fails past [`MAX_NESTING_DEPTH`].
    pub fn enter(&mut self) -> Result<(), EncodeError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(EncodeError::DepthExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn reserve(&mut self, len: usize) -> Result<&mut [u8], EncodeError> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(EncodeError::BufferOverflow {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buf[start..self.pos])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.reserve(1)?[0] = byte;
        Ok(())
    }

    /// Writes in the byte order of this writer's [`WireFormat`].
    pub fn write_fixed<T: FixedWidth>(&mut self, v: T) -> Result<(), EncodeError> {
        let order = self.fmt.byte_order;
        v.put(order, self.reserve(T::WIDTH)?);
        Ok(())
    }

    pub fn write_varint(&mut self, u: u64) -> Result<(), EncodeError> {
        let len = varint::varint_len(u);
        varint::put_varint(u, self.reserve(len)?);
        Ok(())
    }

    /// Writes a string length or list count, as the wire format prescribes.
    pub fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        LengthPrefix::from_len(len)?.ser(self)
    }
}
