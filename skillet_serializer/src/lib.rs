//! Compositional binary serializers.
//!
//! A [`SerializerBuilder`] resolves a root [`TypeRef`] against registered record descriptors
//! and subtype groups into a [`SerializerDef`] tree, which is compiled once per
//! (tree, compatibility level, discriminant encoding) and cached.
//! The resulting [`BinarySerializer`] encodes [`skillet_types::Value`]s into caller-owned
//! buffers and decodes them back.

mod builder;
mod cache;
mod config;
pub mod def;
mod emit;
mod error;
mod registry;
mod serializer;
mod typed;

pub use builder::*;
pub use cache::*;
pub use config::*;
pub use def::{SerializerDef, TypeRef, Visitor};
pub use emit::{CompiledSerializer, Program};
pub use error::*;
pub use registry::*;
pub use serializer::*;
pub use typed::*;
