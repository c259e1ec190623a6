use crate::TypeName;
use std::collections::BTreeMap;
use std::fmt;


/// The fixed-width scalar kinds that primitive nodes encode.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}
impl ScalarKind {
    pub const ALL: [ScalarKind; 12] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Width on the wire when written fixed-width.
    pub fn width(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::Char | Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::Bool | Self::Char | Self::F32 | Self::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// The default a decoder substitutes for an omitted field of this kind.
    pub fn zero(self) -> Scalar {
        match self {
            Self::Bool => Scalar::Bool(false),
            Self::Char => Scalar::Char('\0'),
            Self::I8 => Scalar::I8(0),
            Self::I16 => Scalar::I16(0),
            Self::I32 => Scalar::I32(0),
            Self::I64 => Scalar::I64(0),
            Self::U8 => Scalar::U8(0),
            Self::U16 => Scalar::U16(0),
            Self::U32 => Scalar::U32(0),
            Self::U64 => Scalar::U64(0),
            Self::F32 => Scalar::F32(0.0),
            Self::F64 => Scalar::F64(0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}
impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single scalar value.
///
/// Floats compare by bit pattern, so that every value, NaNs included,
/// survives a round trip as an equal value.
#[derive(Clone, Copy, Debug)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}
impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Char(_) => ScalarKind::Char,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
        }
    }
}
impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Self::Bool(slf), Self::Bool(oth)) => slf == oth,
            (Self::Char(slf), Self::Char(oth)) => slf == oth,
            (Self::I8(slf), Self::I8(oth)) => slf == oth,
            (Self::I16(slf), Self::I16(oth)) => slf == oth,
            (Self::I32(slf), Self::I32(oth)) => slf == oth,
            (Self::I64(slf), Self::I64(oth)) => slf == oth,
            (Self::U8(slf), Self::U8(oth)) => slf == oth,
            (Self::U16(slf), Self::U16(oth)) => slf == oth,
            (Self::U32(slf), Self::U32(oth)) => slf == oth,
            (Self::U64(slf), Self::U64(oth)) => slf == oth,
            (Self::F32(slf), Self::F32(oth)) => slf.to_bits() == oth.to_bits(),
            (Self::F64(slf), Self::F64(oth)) => slf.to_bits() == oth.to_bits(),
            _ => false,
        }
    }
}
impl Eq for Scalar {}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}
scalar_from!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

/// The in-memory form that compiled serializers read from and produce.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value {
    /// Absence, for nullable nodes over non-scalar types.
    Null,
    /// An unboxed scalar.
    Scalar(Scalar),
    /// A boxed scalar. `None` is the null box.
    Wrapped(Option<Scalar>),
    Str(String),
    List(Vec<Value>),
    Record(Record),
}
impl Value {
    /// Boxes an unboxed scalar. Other values are returned as-is.
    pub fn boxed(self) -> Self {
        match self {
            Self::Scalar(s) => Self::Wrapped(Some(s)),
            etc => etc,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Wrapped(None))
    }

    /// The concrete type that subtype dispatch keys on.
    pub fn runtime_type(&self) -> Option<&TypeName> {
        match self {
            Self::Record(rec) => Some(rec.type_name()),
            _ => None,
        }
    }

    /// A short description of the value's shape, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Scalar(s) => s.kind().to_string(),
            Self::Wrapped(Some(s)) => format!("wrapped {}", s.kind()),
            Self::Wrapped(None) => String::from("null wrapped scalar"),
            Self::Str(_) => String::from("string"),
            Self::List(_) => String::from("list"),
            Self::Record(rec) => format!("record {}", rec.type_name()),
        }
    }
}
impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(String::from(s))
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
impl From<Record> for Value {
    fn from(rec: Record) -> Self {
        Value::Record(rec)
    }
}
impl From<Vec<Value>> for Value {
    fn from(members: Vec<Value>) -> Self {
        Value::List(members)
    }
}

/// An instance of a structured type. Fields are keyed by name; the wire order
/// comes from the type's descriptor, not from this map.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Record {
    type_name: TypeName,
    fields: BTreeMap<String, Value>,
}
impl Record {
    pub fn new<N: Into<TypeName>>(type_name: N) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert<V: Into<Value>>(&mut self, field: &str, value: V) -> Option<Value> {
        self.fields.insert(String::from(field), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn from_fields(type_name: TypeName, fields: BTreeMap<String, Value>) -> Self {
        Self { type_name, fields }
    }
}
