use skillet_types::{DecodeError, DiscriminantEncoding, EncodeError, GroupName, TypeName};
use thiserror::Error;

/// A serializer could not be constructed. Nothing is added to the cache when this happens.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum BuildError {
    #[error("no serialization strategy for {type_name} (referenced from {referenced_from})")]
    Unresolvable {
        type_name: String,
        referenced_from: String,
    },

    #[error("record {0} is already registered with a different descriptor")]
    DuplicateRecord(TypeName),

    #[error("subtype group {0} is already registered with different members")]
    DuplicateGroup(GroupName),

    #[error("type {type_name} is registered twice in subtype group {group}")]
    DuplicateSubtype {
        group: GroupName,
        type_name: TypeName,
    },

    #[error("discriminant {tag} is assigned twice in subtype group {group}")]
    DuplicateDiscriminant { group: GroupName, tag: u32 },

    #[error("discriminant {tag} in subtype group {group} does not fit {encoding:?}")]
    DiscriminantOverflow {
        group: GroupName,
        tag: u32,
        encoding: DiscriminantEncoding,
    },

    #[error("subtype group {0} has no members")]
    EmptyGroup(GroupName),

    #[error("inconsistent fields in record {record}: {reason}")]
    InconsistentFields { record: TypeName, reason: String },
}

/// Any failure of the serializer, for callers that do not care which phase failed.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum SerializerError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
