//! Rust types that describe their own layout.
//!
//! A [`Serializable`] type names its [`TypeRef`], registers the descriptors it depends on,
//! and converts to and from [`Value`]. [`TypedSerializer`] then encodes and decodes it directly.

use crate::builder::SerializerBuilder;
use crate::def::{ScalarRepr, TypeRef};
use crate::error::BuildError;
use crate::serializer::BinarySerializer;
use skillet_types::{DecodeError, EncodeError, Record, Scalar, Value};
use std::marker::PhantomData;

#[cfg(test)]
mod test;

pub trait Serializable: Sized {
    fn type_ref() -> TypeRef;

    /// Registers the record descriptors and subtype groups that [`Self::type_ref`] needs.
    ///
    /// Self-referencing types must check [`SerializerBuilder::is_registered`] first.
    fn register(_builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        Ok(())
    }

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

macro_rules! serializable_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serializable for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Scalar(<$ty as ScalarRepr>::KIND)
                }

                fn to_value(&self) -> Value {
                    Value::Scalar(Scalar::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::Scalar(s) | Value::Wrapped(Some(s)) => {
                            <$ty as ScalarRepr>::from_scalar(s).ok_or_else(|| {
                                mismatch(<$ty as ScalarRepr>::KIND.name(), &Value::Scalar(s))
                            })
                        }
                        etc => Err(mismatch(<$ty as ScalarRepr>::KIND.name(), &etc)),
                    }
                }
            }
        )*
    };
}
serializable_scalar!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Serializable for String {
    fn type_ref() -> TypeRef {
        TypeRef::Str
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Str(s) => Ok(s),
            etc => Err(mismatch("string", &etc)),
        }
    }
}

/// Scalars inside an `Option` are boxed, as the nullable node over them expects.
impl<T: Serializable> Serializable for Option<T> {
    fn type_ref() -> TypeRef {
        T::type_ref().nullable()
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        T::register(builder)
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value().boxed(),
            None if matches!(T::type_ref(), TypeRef::Scalar(_) | TypeRef::Wrapped(_)) => {
                Value::Wrapped(None)
            }
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn type_ref() -> TypeRef {
        T::type_ref().list()
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        T::register(builder)
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::List(members) => members.into_iter().map(T::from_value).collect(),
            etc => Err(mismatch("list", &etc)),
        }
    }
}

impl<T: Serializable> Serializable for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        T::register(builder)
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        T::from_value(value).map(Box::new)
    }
}

fn mismatch(expected: &str, actual: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: String::from(expected),
        actual: actual.describe(),
    }
}

/// For [`Serializable::from_value`] impls of record types.
pub fn expect_record(value: Value, type_name: &str) -> Result<Record, DecodeError> {
    match value {
        Value::Record(rec) if rec.type_name().as_str() == type_name => Ok(rec),
        etc => Err(mismatch(&format!("record {type_name}"), &etc)),
    }
}

/// Removes one field from a decoded record and converts it.
pub fn take_field<T: Serializable>(rec: &mut Record, field: &str) -> Result<T, DecodeError> {
    let value = rec
        .remove(field)
        .ok_or_else(|| DecodeError::MissingField {
            record: rec.type_name().clone(),
            field: String::from(field),
        })?;
    T::from_value(value)
}

/// A [`BinarySerializer`] that converts `T` on the way in and out.
pub struct TypedSerializer<T> {
    inner: BinarySerializer,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedSerializer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Serializable> TypedSerializer<T> {
    pub(crate) fn new(inner: BinarySerializer) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn encode(&self, buf: &mut [u8], offset: usize, obj: &T) -> Result<usize, EncodeError> {
        self.inner.encode(buf, offset, &obj.to_value())
    }

    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(T, usize), DecodeError> {
        let (value, offset) = self.inner.decode(buf, offset)?;
        Ok((T::from_value(value)?, offset))
    }

    pub fn encode_to_vec(&self, obj: &T) -> Result<Vec<u8>, EncodeError> {
        self.inner.encode_to_vec(&obj.to_value())
    }

    pub fn untyped(&self) -> &BinarySerializer {
        &self.inner
    }
}

impl<T> From<TypedSerializer<T>> for BinarySerializer {
    fn from(typed: TypedSerializer<T>) -> Self {
        typed.inner
    }
}

