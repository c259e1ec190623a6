use crate::def::SerializerDef;
use crate::emit::{decode_fn, encode_fn, Codec, DecodeFn, EncodeFn, Emitter};
use skillet_types::wire::{WireReader, WireWriter};
use skillet_types::{DecodeError, DiscriminantEncoding, EncodeError, GroupName, TypeName};
use std::collections::HashMap;

/// A closed set of record types, selected by runtime type when encoding and by
/// discriminant when decoding.
///
/// Wire layout: `[discriminant][payload]`.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct SubtypesDef {
    group: GroupName,
    subtypes: Vec<SubtypeDef>,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct SubtypeDef {
    tag: u32,
    type_name: TypeName,
    def: SerializerDef,
}

impl SubtypeDef {
    pub fn new(tag: u32, type_name: TypeName, def: SerializerDef) -> Self {
        Self {
            tag,
            type_name,
            def,
        }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn def(&self) -> &SerializerDef {
        &self.def
    }
}

impl SubtypesDef {
    /// `subtypes` are in registration order. Tags and type names are unique;
    /// the builder checks this.
    pub fn new(group: GroupName, subtypes: Vec<SubtypeDef>) -> Self {
        Self { group, subtypes }
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn subtypes(&self) -> &[SubtypeDef] {
        &self.subtypes
    }

    pub(crate) fn compile(&self, em: &Emitter) -> Codec {
        let encoding = em.discriminant();

        let mut by_type = HashMap::<TypeName, (u32, EncodeFn)>::new();
        let mut by_tag = HashMap::<u32, DecodeFn>::new();
        for sub in self.subtypes.iter() {
            let Codec { enc, dec } = em.compile(&sub.def);
            by_type.insert(sub.type_name.clone(), (sub.tag, enc));
            by_tag.insert(sub.tag, dec);
        }

        let group = self.group.clone();
        let enc = encode_fn(move |p, w, value| {
            let (tag, payload_enc) = value
                .runtime_type()
                .and_then(|type_name| by_type.get(type_name))
                .ok_or_else(|| EncodeError::UnregisteredSubtype {
                    group: group.clone(),
                    runtime_type: value
                        .runtime_type()
                        .map_or_else(|| value.describe(), |t| t.to_string()),
                })?;
            write_discriminant(w, encoding, *tag)?;
            payload_enc(p, w, value)
        });

        let group = self.group.clone();
        let dec = decode_fn(move |p, r| {
            let tag = read_discriminant(r, encoding)?;
            let payload_dec = by_tag
                .get(&tag)
                .ok_or_else(|| DecodeError::UnknownDiscriminant {
                    group: group.clone(),
                    tag,
                })?;
            payload_dec(p, r)
        });

        Codec { enc, dec }
    }
}

fn write_discriminant(
    w: &mut WireWriter,
    encoding: DiscriminantEncoding,
    tag: u32,
) -> Result<(), EncodeError> {
    // Tags were checked against the encoding at build time.
    match encoding {
        DiscriminantEncoding::U8 => w.write_u8(tag as u8),
        DiscriminantEncoding::U16 => w.write_fixed(tag as u16),
        DiscriminantEncoding::VarInt => w.write_varint(tag as u64),
    }
}

fn read_discriminant(
    r: &mut WireReader,
    encoding: DiscriminantEncoding,
) -> Result<u32, DecodeError> {
    match encoding {
        DiscriminantEncoding::U8 => Ok(r.read_u8()? as u32),
        DiscriminantEncoding::U16 => Ok(r.read_fixed::<u16>()? as u32),
        DiscriminantEncoding::VarInt => Ok(r.read_varint(u32::BITS)? as u32),
    }
}
