use super::*;
use crate::cache::SerializerCache;
use crate::registry::{FieldDescriptor, RecordDescriptor};
use anyhow::Result;
use skillet_types::{ScalarKind, Version};
use std::sync::Arc;

#[derive(PartialEq, Debug)]
struct Node {
    label: String,
    weight: Option<u16>,
    next: Option<Box<Node>>,
}

impl Serializable for Node {
    fn type_ref() -> TypeRef {
        TypeRef::record("Node")
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        if builder.is_registered("Node") {
            return Ok(());
        }
        builder.register_record(
            RecordDescriptor::new("Node")
                .field(FieldDescriptor::new("label", String::type_ref()))
                .field(FieldDescriptor::new("weight", Option::<u16>::type_ref()).var_length())
                .field(
                    FieldDescriptor::new("next", Option::<Box<Node>>::type_ref())
                        .added(Version::new(1)),
                ),
        )?;
        Option::<Box<Node>>::register(builder)
    }

    fn to_value(&self) -> Value {
        Record::new("Node")
            .with("label", self.label.to_value())
            .with("weight", self.weight.to_value())
            .with("next", self.next.to_value())
            .into()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut rec = expect_record(value, "Node")?;
        Ok(Self {
            label: take_field(&mut rec, "label")?,
            weight: take_field(&mut rec, "weight")?,
            next: take_field(&mut rec, "next")?,
        })
    }
}

fn chain(len: usize) -> Option<Box<Node>> {
    (0..len).rev().fold(None, |next, i| {
        Some(Box::new(Node {
            label: format!("n{i}"),
            weight: if i % 2 == 0 { Some(i as u16) } else { None },
            next,
        }))
    })
}

fn builder() -> SerializerBuilder {
    SerializerBuilder::new().with_cache(Arc::new(SerializerCache::new()))
}

#[test]
fn recursive_type() -> Result<()> {
    let ser = builder().build_typed::<Node>()?;
    for len in 1..6 {
        let list = chain(len).map(|b| *b);
        let list = list.as_ref().unwrap();

        let bytes = ser.encode_to_vec(list)?;
        let (decoded, end) = ser.decode(&bytes, 0)?;
        assert_eq!(list, &decoded);
        assert_eq!(bytes.len(), end);
    }
    Ok(())
}

#[test]
fn registration_is_idempotent() -> Result<()> {
    let mut b = builder();
    b.register::<Node>()?;
    b.register::<Node>()?;
    b.register::<Vec<Option<Node>>>()?;
    assert!(b.is_registered("Node"));
    Ok(())
}

#[test]
fn option_boxes_scalars() {
    assert_eq!(
        TypeRef::Scalar(ScalarKind::I32).nullable(),
        Option::<i32>::type_ref()
    );
    assert_eq!(Value::Wrapped(None), None::<i32>.to_value());
    assert_eq!(Value::Wrapped(Some(Scalar::I32(3))), Some(3i32).to_value());
    assert_eq!(Value::Null, None::<String>.to_value());
    assert_eq!(Value::Null, None::<Vec<u8>>.to_value());

    assert_eq!(Ok(Some(3)), Option::<i32>::from_value(Value::Wrapped(Some(Scalar::I32(3)))));
    assert_eq!(Ok(None), Option::<i32>::from_value(Value::Wrapped(None)));
}

#[test]
fn containers_round_trip() -> Result<()> {
    let ser = builder().build_typed::<Vec<Option<String>>>()?;
    let obj = vec![Some(String::from("a")), None, Some(String::new())];
    let bytes = ser.encode_to_vec(&obj)?;
    assert_eq!(obj, ser.decode(&bytes, 0)?.0);

    let ser = builder().build_typed::<Vec<Option<f64>>>()?;
    let obj = vec![Some(1.5), None, Some(f64::MIN)];
    let mut buf = [0u8; 64];
    let end = ser.encode(&mut buf, 5, &obj)?;
    assert_eq!((obj, end), ser.decode(&buf, 5)?);
    Ok(())
}

#[test]
fn mismatched_values() {
    assert!(matches!(
        u8::from_value(Value::from("x")),
        Err(DecodeError::TypeMismatch { .. })
    ));
    assert!(matches!(
        i64::from_value(Value::Scalar(Scalar::I32(1))),
        Err(DecodeError::TypeMismatch { .. })
    ));
    assert!(matches!(
        Node::from_value(Record::new("Node").with("label", "x").into()),
        Err(DecodeError::MissingField { .. })
    ));
    assert!(matches!(
        Node::from_value(Record::new("Other").into()),
        Err(DecodeError::TypeMismatch { .. })
    ));
}
