use crate::{GroupName, TypeName, Version};
use thiserror::Error;

/// An integer that does not map to any member of a C-like enum.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("Unknown {type_name} {int}")]
pub struct UnknownVariant {
    pub type_name: &'static str,
    pub int: u8,
}

/// A value could not be written.
///
/// The bytes already written before the failure are not meaningful.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum EncodeError {
    #[error("buffer overflow: {needed} bytes needed at offset {offset}, {remaining} remaining")]
    BufferOverflow {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("offset {offset} is past the end of a {len} byte buffer")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("null value where a non-nullable {expected} is required")]
    NullValue { expected: String },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("record {record} has no value for field {field}")]
    MissingField { record: TypeName, field: String },

    #[error("type {runtime_type} is not registered in subtype group {group}")]
    UnregisteredSubtype {
        group: GroupName,
        runtime_type: String,
    },

    #[error("length {len} does not fit the length prefix")]
    LengthOverflow { len: usize },

    #[error("version {version} is not known to this serializer")]
    UnknownVersion { version: Version },

    #[error("record {record} declares no field {field}")]
    UnknownField { record: TypeName, field: String },

    #[error("records nested deeper than {limit}")]
    DepthExceeded { limit: usize },

    #[error("list of {count} zero-width members exceeds the limit of {limit}")]
    ListTooLong { count: usize, limit: usize },
}

/// Bytes could not be read back into a value. No partially decoded value is ever returned.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum DecodeError {
    #[error("truncated input: {needed} bytes needed at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("discriminant {tag} is not registered in subtype group {group}")]
    UnknownDiscriminant { group: GroupName, tag: u32 },

    #[error("invalid bool byte {0}")]
    InvalidBool(u8),

    #[error("invalid char code point {0:#x}")]
    InvalidChar(u32),

    #[error("invalid presence marker {0}")]
    InvalidPresence(u8),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("varint does not fit in {bits} bits")]
    VarIntOverflow { bits: u32 },

    #[error("value does not fit in {type_name}")]
    IntOverflow { type_name: &'static str },

    #[error("version {version} is newer than any version known to this serializer")]
    UnknownVersion { version: Version },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("record {record} has no value for field {field}")]
    MissingField { record: TypeName, field: String },

    #[error("records nested deeper than {limit}")]
    DepthExceeded { limit: usize },

    #[error("list count {count} exceeds the {limit} members the input can hold")]
    ListTooLong { count: usize, limit: usize },
}
