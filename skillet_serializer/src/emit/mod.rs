//! # Emitter
//!
//! Compiles a finalized [`SerializerDef`] tree into boxed closures, once per schema version.
//! Every node becomes a closure specialized to its kind, its wire format and the active
//! version, so that encoding and decoding never inspect the tree again.
//!
//! Record types are compiled into an indexed table on the [`Program`]; `Structured`
//! and `Ref` nodes both become calls into that table, which lets record types refer
//! to themselves.

mod program;

pub use program::*;

use crate::def::{containers, SerializerDef, StructuredDef, Visitor};
use skillet_types::wire::{WireReader, WireWriter};
use skillet_types::{
    DecodeError, DiscriminantEncoding, EncodeError, TypeName, Value, Version, WireFormat,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub(crate) type EncodeFn = Box<
    dyn Fn(&Program, &mut WireWriter<'_>, &Value) -> Result<(), EncodeError> + Send + Sync,
>;
pub(crate) type DecodeFn =
    Box<dyn Fn(&Program, &mut WireReader<'_>) -> Result<Value, DecodeError> + Send + Sync>;

/// Pins a closure to the [`EncodeFn`] signature, so that its argument lifetimes are inferred
/// as higher-ranked.
pub(crate) fn encode_fn<F>(f: F) -> EncodeFn
where
    F: Fn(&Program, &mut WireWriter<'_>, &Value) -> Result<(), EncodeError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// See [`encode_fn`].
pub(crate) fn decode_fn<F>(f: F) -> DecodeFn
where
    F: Fn(&Program, &mut WireReader<'_>) -> Result<Value, DecodeError> + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) struct Codec {
    pub enc: EncodeFn,
    pub dec: DecodeFn,
}

/// The context that node compilation reads from.
pub(crate) struct Emitter<'t> {
    version: Version,
    fmt: WireFormat,
    discriminant: DiscriminantEncoding,
    records: &'t [Arc<StructuredDef>],
    record_idxs: &'t HashMap<TypeName, usize>,
}

#[derive(Default)]
struct MinLenState {
    open: HashSet<TypeName>,
    done: HashMap<TypeName, usize>,
}

impl<'t> Emitter<'t> {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn format(&self) -> WireFormat {
        self.fmt
    }

    pub fn discriminant(&self) -> DiscriminantEncoding {
        self.discriminant
    }

    pub fn compile(&self, def: &SerializerDef) -> Codec {
        match def {
            SerializerDef::Primitive(prim) => prim.compile(self.fmt),
            SerializerDef::Str => containers::compile_str(),
            SerializerDef::Nullable(inner) => containers::compile_nullable(self, inner),
            SerializerDef::List(inner) => containers::compile_list(self, inner),
            SerializerDef::Structured(rec) => self.record_call(rec.type_name()),
            SerializerDef::Ref(type_name) => self.record_call(type_name),
            SerializerDef::Subtypes(subs) => subs.compile(self),
        }
    }

    /// Every record name in a tree has a `Structured` occurrence, which the builder checks
    /// before anything reaches the emitter.
    fn record_call(&self, type_name: &TypeName) -> Codec {
        let idx = self.record_idxs[type_name];
        Codec {
            enc: encode_fn(move |p, w, v| {
                w.enter()?;
                (p.record(idx).enc)(p, w, v)?;
                w.leave();
                Ok(())
            }),
            dec: decode_fn(move |p, r| {
                r.enter()?;
                let value = (p.record(idx).dec)(p, r)?;
                r.leave();
                Ok(value)
            }),
        }
    }

    /// The fewest bytes that any value of `def` occupies at this version and format.
    pub fn min_wire_len(&self, def: &SerializerDef) -> usize {
        self.min_wire_len_within(def, &mut MinLenState::default())
    }

    fn min_wire_len_within(&self, def: &SerializerDef, state: &mut MinLenState) -> usize {
        let len_prefix = if self.fmt.varint_lengths { 1 } else { 4 };
        match def {
            SerializerDef::Primitive(prim) => prim.min_wire_len(self.fmt),
            SerializerDef::Str | SerializerDef::List(_) => len_prefix,
            SerializerDef::Nullable(_) => 1,
            SerializerDef::Subtypes(_) => match self.discriminant {
                DiscriminantEncoding::U16 => 2,
                DiscriminantEncoding::U8 | DiscriminantEncoding::VarInt => 1,
            },
            SerializerDef::Structured(rec) => self.record_min_len(rec.type_name(), state),
            SerializerDef::Ref(type_name) => self.record_min_len(type_name, state),
        }
    }

    fn record_min_len(&self, type_name: &TypeName, state: &mut MinLenState) -> usize {
        if let Some(&len) = state.done.get(type_name) {
            return len;
        }
        // A record containing itself with no indirection in between counts as empty.
        if !state.open.insert(type_name.clone()) {
            return 0;
        }
        let rec = &self.records[self.record_idxs[type_name]];
        let len: usize = rec
            .fields()
            .iter()
            .filter(|f| f.added() <= self.version)
            .map(|f| self.min_wire_len_within(f.def(), state))
            .sum();
        state.open.remove(type_name);
        state.done.insert(type_name.clone(), len);
        len
    }
}

/// Collects the `Structured` nodes of a tree in pre-order, one per record name.
#[derive(Default)]
pub(crate) struct RecordCollector {
    pub records: Vec<Arc<StructuredDef>>,
    pub idxs: HashMap<TypeName, usize>,
}
impl Visitor for RecordCollector {
    fn visit(&mut self, def: &SerializerDef) {
        if let SerializerDef::Structured(rec) = def {
            if !self.idxs.contains_key(rec.type_name()) {
                self.idxs.insert(rec.type_name().clone(), self.records.len());
                self.records.push(Arc::clone(rec));
            }
        }
    }
}

pub(crate) fn compile_program(
    root: &SerializerDef,
    version: Version,
    fmt: WireFormat,
    discriminant: DiscriminantEncoding,
) -> Program {
    let mut collector = RecordCollector::default();
    root.walk(&mut collector);

    let em = Emitter {
        version,
        fmt,
        discriminant,
        records: &collector.records,
        record_idxs: &collector.idxs,
    };
    let records = collector
        .records
        .iter()
        .map(|rec| rec.compile(&em))
        .collect::<Vec<_>>();
    let root = em.compile(root);

    Program::new(version, records, root)
}
