use crate::UnknownVariant;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::any;

/// The wire-format mode of a compiled serializer.
///
/// It is fixed when the serializer is built and is never written to the wire.
/// Both sides of a conversation must agree on it out of band.
///
/// | level      | byte order | lengths and counts | `var_length` ints | nullable bool     |
/// |------------|------------|--------------------|-------------------|-------------------|
/// | `Level1`   | big        | fixed `u32`        | written fixed     | presence + byte   |
/// | `Level2`   | big        | varint             | varint            | presence + byte   |
/// | `Level3`   | big        | varint             | varint            | packed, 1 byte    |
/// | `Level3Le` | little     | varint             | varint            | packed, 1 byte    |
///
/// We manually map members to integers so that the mapping survives reordering of the enum,
/// and so that operators can select a level through configuration.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum CompatibilityLevel {
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Level3Le = 4,
}
impl Default for CompatibilityLevel {
    fn default() -> Self {
        Self::Level3
    }
}
impl TryFrom<u8> for CompatibilityLevel {
    type Error = UnknownVariant;
    fn try_from(int: u8) -> Result<Self, UnknownVariant> {
        Self::from_u8(int).ok_or(UnknownVariant {
            type_name: any::type_name::<Self>(),
            int,
        })
    }
}
impl CompatibilityLevel {
    pub fn wire_format(self) -> WireFormat {
        match self {
            Self::Level1 => WireFormat {
                byte_order: ByteOrder::Big,
                varint_lengths: false,
                var_length_ints: false,
                packed_nullable_bool: false,
            },
            Self::Level2 => WireFormat {
                byte_order: ByteOrder::Big,
                varint_lengths: true,
                var_length_ints: true,
                packed_nullable_bool: false,
            },
            Self::Level3 => WireFormat {
                byte_order: ByteOrder::Big,
                varint_lengths: true,
                var_length_ints: true,
                packed_nullable_bool: true,
            },
            Self::Level3Le => WireFormat {
                byte_order: ByteOrder::Little,
                varint_lengths: true,
                var_length_ints: true,
                packed_nullable_bool: true,
            },
        }
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ByteOrder {
    Big,
    Little,
}

/// The concrete encoding choices implied by a [`CompatibilityLevel`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct WireFormat {
    pub byte_order: ByteOrder,
    /// String lengths, list counts and version headers use LEB128 instead of a fixed `u32`.
    pub varint_lengths: bool,
    /// Integer fields flagged `var_length` are written as LEB128.
    pub var_length_ints: bool,
    /// A nullable boolean occupies one byte: 0 null, 1 false, 2 true.
    pub packed_nullable_bool: bool,
}

/// How a subtype discriminant is written. Chosen once per compiled serializer.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum DiscriminantEncoding {
    U8 = 0,
    U16 = 1,
    VarInt = 2,
}
impl Default for DiscriminantEncoding {
    fn default() -> Self {
        Self::U8
    }
}
impl TryFrom<u8> for DiscriminantEncoding {
    type Error = UnknownVariant;
    fn try_from(int: u8) -> Result<Self, UnknownVariant> {
        Self::from_u8(int).ok_or(UnknownVariant {
            type_name: any::type_name::<Self>(),
            int,
        })
    }
}
impl DiscriminantEncoding {
    /// The largest tag this encoding can carry.
    pub fn max_tag(self) -> u32 {
        match self {
            Self::U8 => u8::MAX as u32,
            Self::U16 => u16::MAX as u32,
            Self::VarInt => u32::MAX,
        }
    }
}
