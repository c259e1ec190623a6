use anyhow::Result;
use skillet_serializer::{
    BinarySerializer, FieldDescriptor, RecordDescriptor, SerializerBuilder, SerializerCache,
    TypeRef,
};
use skillet_types::{DecodeError, Record, Scalar, ScalarKind, Value, Version};
use std::sync::Arc;

pub fn test_schema_evolution(cache: &Arc<SerializerCache>) -> Result<()> {
    field_added_later(cache)?;
    headers_across_versions(cache)?;
    linked_list(cache)?;
    Ok(())
}

fn profile_builder(cache: &Arc<SerializerCache>) -> Result<SerializerBuilder> {
    let mut builder = SerializerBuilder::new().with_cache(Arc::clone(cache));
    builder.register_record(
        RecordDescriptor::new("Profile")
            .field(FieldDescriptor::new("id", TypeRef::Scalar(ScalarKind::U64)).var_length())
            .field(FieldDescriptor::new("name", TypeRef::Str))
            .field(
                FieldDescriptor::new("email", TypeRef::Str.nullable()).added(Version::new(1)),
            ),
    )?;
    Ok(builder)
}

fn profile(id: u64, name: &str, email: Option<&str>) -> Value {
    let email = email.map_or(Value::Null, Value::from);
    Record::new("Profile")
        .with("id", id)
        .with("name", name)
        .with("email", email)
        .into()
}

fn field_added_later(cache: &Arc<SerializerCache>) -> Result<()> {
    let ser: BinarySerializer = profile_builder(cache)?.build(TypeRef::record("Profile"))?;
    assert_eq!(
        vec![Version::new(0), Version::new(1)],
        ser.versions().into_iter().collect::<Vec<_>>()
    );

    let value = profile(300, "ann", Some("ann@example.com"));
    let mut buf = [0u8; 64];

    let v0_end = ser.encode_at_version(&mut buf, 0, &value, Version::ZERO)?;
    assert_eq!(&[0xac, 0x02, 3, b'a', b'n', b'n'], &buf[..v0_end]);
    let (v0, _) = ser.decode_at_version(&buf[..v0_end], 0, Version::ZERO)?;
    assert_eq!(profile(300, "ann", None), v0);

    let v1_end = ser.encode_at_version(&mut buf, 0, &value, Version::new(1))?;
    assert_eq!(v0_end + 1 + 1 + "ann@example.com".len(), v1_end);
    let (v1, _) = ser.decode_at_version(&buf[..v1_end], 0, Version::new(1))?;
    assert_eq!(value, v1);

    // Decoding v1 bytes with the v0 layout stops before the new field.
    let (_, end) = ser.decode_at_version(&buf[..v1_end], 0, Version::ZERO)?;
    assert_eq!(v0_end, end);
    Ok(())
}

fn headers_across_versions(cache: &Arc<SerializerCache>) -> Result<()> {
    let writer_v0 = profile_builder(cache)?
        .with_version_header(true)
        .with_encode_version(Version::ZERO)
        .build(TypeRef::record("Profile"))?;
    let reader = profile_builder(cache)?
        .with_version_header(true)
        .build(TypeRef::record("Profile"))?;
    assert!(writer_v0.shares_program_with(&reader));

    let bytes = writer_v0.encode_to_vec(&profile(1, "bo", Some("dropped")))?;
    assert_eq!(0, bytes[0]);
    assert_eq!(profile(1, "bo", None), reader.decode(&bytes, 0)?.0);

    let bytes = reader.encode_to_vec(&profile(1, "bo", Some("kept")))?;
    assert_eq!(1, bytes[0]);
    assert_eq!(profile(1, "bo", Some("kept")), writer_v0.decode(&bytes, 0)?.0);

    let mut future = bytes.clone();
    future[0] = 7;
    assert_eq!(
        Err(DecodeError::UnknownVersion {
            version: Version::new(7)
        }),
        reader.decode(&future, 0).map(|(v, _)| v)
    );
    Ok(())
}

fn node(value: i64, next: Value) -> Value {
    Record::new("Node")
        .with("value", value)
        .with("next", next)
        .into()
}

fn linked_list(cache: &Arc<SerializerCache>) -> Result<()> {
    let mut builder = SerializerBuilder::new().with_cache(Arc::clone(cache));
    builder.register_record(
        RecordDescriptor::new("Node")
            .field(FieldDescriptor::new("value", TypeRef::Scalar(ScalarKind::I64)).var_length())
            .field(FieldDescriptor::new("next", TypeRef::record("Node").nullable())),
    )?;
    let ser = builder.build(TypeRef::record("Node"))?;

    let list = (0..100).rev().fold(Value::Null, |next, i| node(i - 50, next));
    let bytes = ser.encode_to_vec(&list)?;
    // One varint byte and one presence byte per node.
    assert_eq!(200, bytes.len());
    assert_eq!(list, ser.decode(&bytes, 0)?.0);

    let single = node(i64::MIN, Value::Null);
    let bytes = ser.encode_to_vec(&single)?;
    assert_eq!(10 + 1, bytes.len());
    let (decoded, _) = ser.decode(&bytes, 0)?;
    assert_eq!(
        Some(&Value::Scalar(Scalar::I64(i64::MIN))),
        match &decoded {
            Value::Record(rec) => rec.get("value"),
            _ => None,
        }
    );
    Ok(())
}
