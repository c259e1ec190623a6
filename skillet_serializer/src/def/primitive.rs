use crate::def::TypeRef;
use crate::emit::{decode_fn, encode_fn, Codec, DecodeFn, EncodeFn};
use skillet_types::wire::{varint, WireReader, WireWriter};
use skillet_types::{DecodeError, EncodeError, Scalar, ScalarKind, Value, Version, WireFormat};
use std::collections::BTreeSet;


macro_rules! dispatch_kind {
    ($kind:expr, $f:ident ( $($arg:expr),* )) => {
        match $kind {
            ScalarKind::Bool => $f::<bool>($($arg),*),
            ScalarKind::Char => $f::<char>($($arg),*),
            ScalarKind::I8 => $f::<i8>($($arg),*),
            ScalarKind::I16 => $f::<i16>($($arg),*),
            ScalarKind::I32 => $f::<i32>($($arg),*),
            ScalarKind::I64 => $f::<i64>($($arg),*),
            ScalarKind::U8 => $f::<u8>($($arg),*),
            ScalarKind::U16 => $f::<u16>($($arg),*),
            ScalarKind::U32 => $f::<u32>($($arg),*),
            ScalarKind::U64 => $f::<u64>($($arg),*),
            ScalarKind::F32 => $f::<f32>($($arg),*),
            ScalarKind::F64 => $f::<f64>($($arg),*),
        }
    };
}

/// A leaf node for one fixed-width scalar kind.
///
/// Each kind has an unwrapped and a wrapped instance. They differ only in the in-memory
/// form they accept and produce ([`Value::Scalar`] vs [`Value::Wrapped`]);
/// the bytes on the wire are identical.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PrimitiveDef {
    kind: ScalarKind,
    wrapped: bool,
    var_length: bool,
}

impl PrimitiveDef {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            wrapped: false,
            var_length: false,
        }
    }

    /// Integer kinds are written as varints where the wire format allows it.
    /// Ignored for non-integer kinds.
    pub fn with_var_length(self, var_length: bool) -> Self {
        Self {
            var_length: var_length && self.kind.is_integer(),
            ..self
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn is_var_length(&self) -> bool {
        self.var_length
    }

    /// The wrapped sibling of this node. Idempotent.
    pub fn ensure_wrapped(&self) -> PrimitiveDef {
        Self {
            wrapped: true,
            ..*self
        }
    }

    /// The unwrapped sibling of this node. Idempotent.
    pub fn unwrapped(&self) -> PrimitiveDef {
        Self {
            wrapped: false,
            ..*self
        }
    }

    pub fn encode_type(&self) -> TypeRef {
        if self.wrapped {
            TypeRef::Wrapped(self.kind)
        } else {
            TypeRef::Scalar(self.kind)
        }
    }

    /// Primitives are present at every version.
    pub fn versions(&self) -> BTreeSet<Version> {
        BTreeSet::new()
    }

    pub fn default_value(&self) -> Value {
        if self.wrapped {
            Value::Wrapped(None)
        } else {
            Value::Scalar(self.kind.zero())
        }
    }

    fn writes_varint(&self, fmt: WireFormat) -> bool {
        self.var_length && fmt.var_length_ints
    }

    pub(crate) fn min_wire_len(&self, fmt: WireFormat) -> usize {
        if self.writes_varint(fmt) {
            1
        } else {
            self.kind.width()
        }
    }

    pub fn encode(&self, w: &mut WireWriter, value: &Value) -> Result<(), EncodeError> {
        let var = self.writes_varint(w.format());
        dispatch_kind!(self.kind, encode_as(self.wrapped, var, w, value))
    }

    pub fn decode(&self, r: &mut WireReader) -> Result<Value, DecodeError> {
        let var = self.writes_varint(r.format());
        dispatch_kind!(self.kind, decode_as(self.wrapped, var, r))
    }

    /// Procedures specialized to this node's kind, boxing and the given wire format.
    pub(crate) fn compile(&self, fmt: WireFormat) -> Codec {
        let var = self.writes_varint(fmt);
        let enc = dispatch_kind!(self.kind, encoder_of(self.wrapped, var));
        let dec = dispatch_kind!(self.kind, decoder_of(self.wrapped, var));
        Codec { enc, dec }
    }
}

fn encoder_of<T: ScalarRepr>(wrapped: bool, var: bool) -> EncodeFn {
    encode_fn(move |_, w, value| encode_as::<T>(wrapped, var, w, value))
}

fn decoder_of<T: ScalarRepr>(wrapped: bool, var: bool) -> DecodeFn {
    decode_fn(move |_, r| decode_as::<T>(wrapped, var, r))
}

fn encode_as<T: ScalarRepr>(
    wrapped: bool,
    var: bool,
    w: &mut WireWriter,
    value: &Value,
) -> Result<(), EncodeError> {
    unbox::<T>(wrapped, value)?.write(w, var)
}

fn decode_as<T: ScalarRepr>(
    wrapped: bool,
    var: bool,
    r: &mut WireReader,
) -> Result<Value, DecodeError> {
    let scalar = T::read(r, var)?.into_scalar();
    if wrapped {
        Ok(Value::Wrapped(Some(scalar)))
    } else {
        Ok(Value::Scalar(scalar))
    }
}

fn unbox<T: ScalarRepr>(wrapped: bool, value: &Value) -> Result<T, EncodeError> {
    let scalar = match (wrapped, value) {
        (false, Value::Scalar(s)) => Some(*s),
        (true, Value::Wrapped(Some(s))) => Some(*s),
        (true, Value::Wrapped(None)) => {
            return Err(EncodeError::NullValue {
                expected: format!("wrapped {}", T::KIND),
            })
        }
        _ => None,
    };
    scalar
        .and_then(T::from_scalar)
        .ok_or_else(|| EncodeError::TypeMismatch {
            expected: if wrapped {
                format!("wrapped {}", T::KIND)
            } else {
                T::KIND.to_string()
            },
            actual: value.describe(),
        })
}

/// A Rust scalar type that backs one [`ScalarKind`].
pub(crate) trait ScalarRepr: Copy + Send + Sync + 'static {
    const KIND: ScalarKind;

    fn from_scalar(s: Scalar) -> Option<Self>;
    fn into_scalar(self) -> Scalar;

    /// `var` selects LEB128. Only integer kinds honor it.
    fn write(self, w: &mut WireWriter, var: bool) -> Result<(), EncodeError>;
    fn read(r: &mut WireReader, var: bool) -> Result<Self, DecodeError>;
}

macro_rules! scalar_repr {
    ($ty:ty, $variant:ident) => {
        fn from_scalar(s: Scalar) -> Option<Self> {
            match s {
                Scalar::$variant(v) => Some(v),
                _ => None,
            }
        }
        fn into_scalar(self) -> Scalar {
            Scalar::$variant(self)
        }
    };
}

macro_rules! unsigned_repr {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarRepr for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;
                scalar_repr!($ty, $variant);

                fn write(self, w: &mut WireWriter, var: bool) -> Result<(), EncodeError> {
                    if var {
                        w.write_varint(self as u64)
                    } else {
                        w.write_fixed(self)
                    }
                }
                fn read(r: &mut WireReader, var: bool) -> Result<Self, DecodeError> {
                    if var {
                        Ok(r.read_varint(<$ty>::BITS)? as $ty)
                    } else {
                        r.read_fixed()
                    }
                }
            }
        )*
    };
}
unsigned_repr!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

macro_rules! signed_repr {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarRepr for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;
                scalar_repr!($ty, $variant);

                fn write(self, w: &mut WireWriter, var: bool) -> Result<(), EncodeError> {
                    if var {
                        w.write_varint(varint::zigzag_encode(self as i64))
                    } else {
                        w.write_fixed(self)
                    }
                }
                fn read(r: &mut WireReader, var: bool) -> Result<Self, DecodeError> {
                    if var {
                        let i = varint::zigzag_decode(r.read_varint(u64::BITS)?);
                        <$ty>::try_from(i).map_err(|_| DecodeError::IntOverflow {
                            type_name: stringify!($ty),
                        })
                    } else {
                        r.read_fixed()
                    }
                }
            }
        )*
    };
}
signed_repr!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);

macro_rules! float_repr {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarRepr for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;
                scalar_repr!($ty, $variant);

                fn write(self, w: &mut WireWriter, _var: bool) -> Result<(), EncodeError> {
                    w.write_fixed(self)
                }
                fn read(r: &mut WireReader, _var: bool) -> Result<Self, DecodeError> {
                    r.read_fixed()
                }
            }
        )*
    };
}
float_repr!(f32 => F32, f64 => F64);

impl ScalarRepr for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
    scalar_repr!(bool, Bool);

    fn write(self, w: &mut WireWriter, _var: bool) -> Result<(), EncodeError> {
        w.write_u8(self as u8)
    }
    fn read(r: &mut WireReader, _var: bool) -> Result<Self, DecodeError> {
        match r.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool(byte)),
        }
    }
}

impl ScalarRepr for char {
    const KIND: ScalarKind = ScalarKind::Char;
    scalar_repr!(char, Char);

    fn write(self, w: &mut WireWriter, _var: bool) -> Result<(), EncodeError> {
        w.write_fixed(self as u32)
    }
    fn read(r: &mut WireReader, _var: bool) -> Result<Self, DecodeError> {
        let u = r.read_fixed::<u32>()?;
        char::from_u32(u).ok_or(DecodeError::InvalidChar(u))
    }
}
