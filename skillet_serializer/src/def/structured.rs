use crate::def::SerializerDef;
use crate::emit::{decode_fn, encode_fn, Codec, Emitter};
use itertools::Itertools;
use skillet_types::{EncodeError, Record, TypeName, Value, Version};
use std::collections::{BTreeMap, HashSet};

/// A record type: an ordered sequence of fields, each present from some version on.
///
/// Field names never reach the wire. They key the in-memory [`Record`] and appear in diagnostics.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct StructuredDef {
    type_name: TypeName,
    fields: Vec<FieldDef>,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct FieldDef {
    name: String,
    added: Version,
    def: SerializerDef,
}

impl FieldDef {
    pub fn new<N: Into<String>>(name: N, added: Version, def: SerializerDef) -> Self {
        Self {
            name: name.into(),
            added,
            def,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first version at which this field is on the wire.
    pub fn added(&self) -> Version {
        self.added
    }

    pub fn def(&self) -> &SerializerDef {
        &self.def
    }
}

impl StructuredDef {
    /// `fields` are in wire order.
    pub fn new(type_name: TypeName, fields: Vec<FieldDef>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub(crate) fn compile(&self, em: &Emitter) -> Codec {
        let version = em.version();
        let (present, omitted): (Vec<&FieldDef>, Vec<&FieldDef>) =
            self.fields.iter().partition(|f| f.added <= version);

        let mut enc_fields = Vec::with_capacity(present.len());
        let mut dec_fields = Vec::with_capacity(present.len());
        for field in present {
            let Codec { enc, dec } = em.compile(&field.def);
            enc_fields.push((field.name.clone(), enc));
            dec_fields.push((field.name.clone(), dec));
        }
        let defaults = omitted
            .into_iter()
            .map(|f| (f.name.clone(), f.def.default_value()))
            .collect::<Vec<_>>();

        let declared = self
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect::<HashSet<_>>();
        let type_name = self.type_name.clone();
        let enc = encode_fn(move |p, w, value| {
            let rec = match value {
                Value::Record(rec) if rec.type_name() == &type_name => rec,
                Value::Null => {
                    return Err(EncodeError::NullValue {
                        expected: format!("record {type_name}"),
                    })
                }
                _ => {
                    return Err(EncodeError::TypeMismatch {
                        expected: format!("record {type_name}"),
                        actual: value.describe(),
                    })
                }
            };
            if let Some((field, _)) = rec.fields().find(|(name, _)| !declared.contains(*name)) {
                return Err(EncodeError::UnknownField {
                    record: type_name.clone(),
                    field: field.clone(),
                });
            }
            for (name, field_enc) in enc_fields.iter() {
                let field_val = rec.get(name).ok_or_else(|| EncodeError::MissingField {
                    record: type_name.clone(),
                    field: name.clone(),
                })?;
                field_enc(p, w, field_val)?;
            }
            Ok(())
        });

        let type_name = self.type_name.clone();
        let dec = decode_fn(move |p, r| {
            let mut fields = BTreeMap::new();
            for (name, field_dec) in dec_fields.iter() {
                fields.insert(name.clone(), field_dec(p, r)?);
            }
            fields.extend(defaults.iter().cloned());
            Ok(Value::Record(Record::from_fields(type_name.clone(), fields)))
        });

        Codec { enc, dec }
    }

    /// `name: type` pairs in wire order.
    pub fn describe_fields(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.def.encode_type().describe()))
            .join(", ")
    }
}
