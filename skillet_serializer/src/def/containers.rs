//! Compilation of the container nodes: strings, nullables and lists.

use crate::def::SerializerDef;
use crate::emit::{decode_fn, encode_fn, Codec, Emitter};
use skillet_types::{DecodeError, EncodeError, Scalar, ScalarKind, Value};
use std::str;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

const PACKED_NULL: u8 = 0;
const PACKED_FALSE: u8 = 1;
const PACKED_TRUE: u8 = 2;

/// Members that occupy no bytes at all cannot be bounded by the input length.
pub(crate) const MAX_ZERO_WIDTH_MEMBERS: usize = 1 << 16;

pub(crate) fn compile_str() -> Codec {
    let enc = encode_fn(|_, w, value| match value {
        Value::Str(s) => {
            w.write_len(s.len())?;
            w.write_bytes(s.as_bytes())
        }
        Value::Null => Err(EncodeError::NullValue {
            expected: String::from("string"),
        }),
        _ => Err(EncodeError::TypeMismatch {
            expected: String::from("string"),
            actual: value.describe(),
        }),
    });
    let dec = decode_fn(|_, r| {
        let len = r.read_len()?;
        let bytes = r.take(len)?;
        let s = str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
        Ok(Value::Str(String::from(s)))
    });
    Codec { enc, dec }
}

pub(crate) fn compile_nullable(em: &Emitter, inner: &SerializerDef) -> Codec {
    if em.format().packed_nullable_bool {
        if let SerializerDef::Primitive(prim) = inner {
            if prim.kind() == ScalarKind::Bool {
                return compile_packed_bool(prim.is_wrapped());
            }
        }
    }

    let Codec {
        enc: inner_enc,
        dec: inner_dec,
    } = em.compile(inner);
    let null = inner.null_value();

    let enc = encode_fn(move |p, w, value| {
        if value.is_null() {
            w.write_u8(ABSENT)
        } else {
            w.write_u8(PRESENT)?;
            inner_enc(p, w, value)
        }
    });
    let dec = decode_fn(move |p, r| match r.read_u8()? {
        ABSENT => Ok(null.clone()),
        PRESENT => inner_dec(p, r),
        byte => Err(DecodeError::InvalidPresence(byte)),
    });
    Codec { enc, dec }
}

fn compile_packed_bool(wrapped: bool) -> Codec {
    let enc = encode_fn(move |_, w, value| {
        let byte = match value {
            Value::Null | Value::Wrapped(None) => PACKED_NULL,
            Value::Wrapped(Some(Scalar::Bool(b))) if wrapped => packed(*b),
            Value::Scalar(Scalar::Bool(b)) if !wrapped => packed(*b),
            _ => {
                return Err(EncodeError::TypeMismatch {
                    expected: String::from("nullable bool"),
                    actual: value.describe(),
                })
            }
        };
        w.write_u8(byte)
    });
    let dec = decode_fn(move |_, r| {
        let b = match r.read_u8()? {
            PACKED_NULL if wrapped => return Ok(Value::Wrapped(None)),
            PACKED_NULL => return Ok(Value::Null),
            PACKED_FALSE => false,
            PACKED_TRUE => true,
            byte => return Err(DecodeError::InvalidPresence(byte)),
        };
        if wrapped {
            Ok(Value::Wrapped(Some(Scalar::Bool(b))))
        } else {
            Ok(Value::Scalar(Scalar::Bool(b)))
        }
    });
    Codec { enc, dec }
}

fn packed(b: bool) -> u8 {
    if b {
        PACKED_TRUE
    } else {
        PACKED_FALSE
    }
}

pub(crate) fn compile_list(em: &Emitter, member: &SerializerDef) -> Codec {
    let Codec {
        enc: member_enc,
        dec: member_dec,
    } = em.compile(member);
    let min_len = em.min_wire_len(member);

    let enc = encode_fn(move |p, w, value| match value {
        Value::List(members) => {
            if min_len == 0 && members.len() > MAX_ZERO_WIDTH_MEMBERS {
                return Err(EncodeError::ListTooLong {
                    count: members.len(),
                    limit: MAX_ZERO_WIDTH_MEMBERS,
                });
            }
            w.write_len(members.len())?;
            members.iter().try_for_each(|m| member_enc(p, w, m))
        }
        Value::Null => Err(EncodeError::NullValue {
            expected: String::from("list"),
        }),
        _ => Err(EncodeError::TypeMismatch {
            expected: String::from("list"),
            actual: value.describe(),
        }),
    });
    let dec = decode_fn(move |p, r| {
        let count = r.read_len()?;
        let limit = match min_len {
            0 => MAX_ZERO_WIDTH_MEMBERS,
            len => r.remaining() / len,
        };
        if count > limit {
            return Err(DecodeError::ListTooLong { count, limit });
        }
        let mut members = Vec::with_capacity(count);
        for _ in 0..count {
            members.push(member_dec(p, r)?);
        }
        Ok(Value::List(members))
    });
    Codec { enc, dec }
}
