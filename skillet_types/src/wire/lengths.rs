use crate::wire::{WireReader, WireWriter};
use crate::{DecodeError, EncodeError};
use derive_more::Deref;

/// Length of a string body or count of list members.
///
/// Written as a fixed `u32` or as a varint, depending on the wire format.
#[derive(Deref, Clone, Copy)]
pub struct LengthPrefix(u32);
impl LengthPrefix {
    pub fn from_len(len: usize) -> Result<Self, EncodeError> {
        let int = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { len })?;
        Ok(Self(int))
    }

    pub fn ser(self, w: &mut WireWriter) -> Result<(), EncodeError> {
        if w.format().varint_lengths {
            w.write_varint(self.0 as u64)
        } else {
            w.write_fixed(self.0)
        }
    }

    pub fn deser(r: &mut WireReader) -> Result<Self, DecodeError> {
        let int = if r.format().varint_lengths {
            r.read_varint(u32::BITS)? as u32
        } else {
            r.read_fixed::<u32>()?
        };
        Ok(Self(int))
    }
}
