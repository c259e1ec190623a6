//! # Serializer definition nodes
//!
//! A [`SerializerDef`] tree describes how one type is laid out on the wire.
//! Trees are produced by the builder, are immutable afterwards, and are compiled once
//! by the emitter into encode and decode procedures.
//!
//! ```text
//! Structured(Envelope)
//! ├── cookie:  Primitive(i32)
//! └── payload: Subtypes(messages)
//!              ├── 0: Structured(Text)
//!              │      └── s: Str
//!              └── 1: Structured(Number)
//!                     └── i: Primitive(i32, var_length)
//! ```
//!
//! A record type appears as `Structured` at its first occurrence in pre-order,
//! and as `Ref` everywhere after, which is how self-referencing types are expressed.

pub(crate) mod containers;
mod primitive;
mod structured;
mod subtypes;

pub use primitive::*;
pub(crate) use primitive::ScalarRepr;
pub use structured::*;
pub use subtypes::*;

use skillet_types::{GroupName, ScalarKind, TypeName, Value, Version};
use std::collections::BTreeSet;
use std::sync::Arc;


/// The declared shape of a field or a root type, before resolution.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Wrapped(ScalarKind),
    Str,
    Record(TypeName),
    Subtypes(GroupName),
    Nullable(Box<TypeRef>),
    List(Box<TypeRef>),
}
impl TypeRef {
    pub fn record<N: Into<TypeName>>(name: N) -> Self {
        Self::Record(name.into())
    }

    pub fn subtypes<N: Into<GroupName>>(group: N) -> Self {
        Self::Subtypes(group.into())
    }

    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// The primitive kind at the leaf of nullable and list wrappers, if any.
    pub fn leaf_scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) | Self::Wrapped(kind) => Some(*kind),
            Self::Nullable(inner) | Self::List(inner) => inner.leaf_scalar(),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.to_string(),
            Self::Wrapped(kind) => format!("wrapped {kind}"),
            Self::Str => String::from("string"),
            Self::Record(name) => format!("record {name}"),
            Self::Subtypes(group) => format!("subtypes of {group}"),
            Self::Nullable(inner) => format!("nullable {}", inner.describe()),
            Self::List(inner) => format!("list of {}", inner.describe()),
        }
    }
}

/// A resolved node.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum SerializerDef {
    Primitive(PrimitiveDef),
    Str,
    Nullable(Box<SerializerDef>),
    List(Box<SerializerDef>),
    Structured(Arc<StructuredDef>),
    /// A record whose `Structured` node occurs earlier in the same tree.
    Ref(TypeName),
    Subtypes(SubtypesDef),
}

impl SerializerDef {
    pub fn encode_type(&self) -> TypeRef {
        match self {
            Self::Primitive(prim) => prim.encode_type(),
            Self::Str => TypeRef::Str,
            Self::Nullable(inner) => inner.encode_type().nullable(),
            Self::List(inner) => inner.encode_type().list(),
            Self::Structured(rec) => TypeRef::Record(rec.type_name().clone()),
            Self::Ref(name) => TypeRef::Record(name.clone()),
            Self::Subtypes(subs) => TypeRef::Subtypes(subs.group().clone()),
        }
    }

    /// Schema versions at which some field of this tree is introduced.
    /// Empty means the layout is the same at every version.
    pub fn versions(&self) -> BTreeSet<Version> {
        let mut collector = VersionCollector::default();
        self.walk(&mut collector);
        collector.versions
    }

    /// For primitives, the wrapped sibling. Every other node is returned as-is.
    pub fn ensure_wrapped(self) -> Self {
        match self {
            Self::Primitive(prim) => Self::Primitive(prim.ensure_wrapped()),
            etc => etc,
        }
    }

    /// The value a decoder substitutes for a field omitted at the active version.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(prim) => prim.default_value(),
            Self::Str => Value::Str(String::new()),
            Self::List(_) => Value::List(vec![]),
            Self::Nullable(inner) => inner.null_value(),
            Self::Structured(_) | Self::Ref(_) | Self::Subtypes(_) => Value::Null,
        }
    }

    /// How null looks in memory for this node when made nullable.
    pub(crate) fn null_value(&self) -> Value {
        match self {
            Self::Primitive(_) => Value::Wrapped(None),
            _ => Value::Null,
        }
    }

    fn children(&self) -> Vec<&SerializerDef> {
        match self {
            Self::Primitive(_) | Self::Str | Self::Ref(_) => vec![],
            Self::Nullable(inner) | Self::List(inner) => vec![&**inner],
            Self::Structured(rec) => rec.fields().iter().map(|f| f.def()).collect(),
            Self::Subtypes(subs) => subs.subtypes().iter().map(|s| s.def()).collect(),
        }
    }

    /// Visits every node nested in this one, in pre-order, each exactly once.
    ///
    /// The receiver itself is not visited, and `Ref` edges are not followed.
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        for child in self.children() {
            visitor.visit(child);
            child.accept(visitor);
        }
    }

    /// Like [`Self::accept`], but visits the receiver first.
    pub fn walk(&self, visitor: &mut dyn Visitor) {
        visitor.visit(self);
        self.accept(visitor);
    }
}

pub trait Visitor {
    fn visit(&mut self, def: &SerializerDef);
}

#[derive(Default)]
struct VersionCollector {
    versions: BTreeSet<Version>,
}
impl Visitor for VersionCollector {
    fn visit(&mut self, def: &SerializerDef) {
        if let SerializerDef::Structured(rec) = def {
            self.versions.extend(rec.fields().iter().map(|f| f.added()));
        }
    }
}
