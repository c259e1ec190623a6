use super::helpers::{register_rpc_types, rpc_serializer, MESSAGE_TYPES};
use anyhow::{anyhow, Result};
use skillet_serializer::{
    BuildError, SerializerBuilder, SerializerCache, SerializerError, SubtypeGroup, TypeRef,
};
use skillet_types::{DecodeError, EncodeError, GroupName, Record, Value};
use std::sync::Arc;

pub fn test_rpc_envelope(cache: &Arc<SerializerCache>) -> Result<()> {
    round_trip_string_payload(cache)?;
    round_trip_int_payload(cache)?;
    null_payload(cache)?;
    foreign_payload(cache)?;
    incomplete_registrations(cache)?;
    Ok(())
}

fn message(cookie: i32, data: Value) -> Value {
    Record::new("RpcMessage")
        .with("cookie", cookie)
        .with("data", data)
        .into()
}

fn round_trip_string_payload(cache: &Arc<SerializerCache>) -> Result<()> {
    let ser = rpc_serializer(cache)?;

    let data = Record::new("TestRpcMessageData").with("s", "TestMessageData");
    let message1 = message(1, data.clone().into());

    let mut buf = [0u8; 1000];
    let end = ser.encode(&mut buf, 0, &message1)?;
    let (message2, r_end) = ser.decode(&buf, 0)?;
    assert_eq!(end, r_end);

    let message2 = match message2 {
        Value::Record(rec) => rec,
        etc => panic!("{etc:?}"),
    };
    assert_eq!(Some(&Value::from(1i32)), message2.get("cookie"));
    match message2.get("data") {
        Some(Value::Record(data2)) => {
            assert_eq!("TestRpcMessageData", data2.type_name().as_str());
            assert_eq!(data.get("s"), data2.get("s"));
        }
        etc => panic!("{etc:?}"),
    }

    // cookie, presence, discriminant, length, body
    assert_eq!(4 + 1 + 1 + 1 + "TestMessageData".len(), end);
    Ok(())
}

fn round_trip_int_payload(cache: &Arc<SerializerCache>) -> Result<()> {
    let ser = rpc_serializer(cache)?;

    let message1 = message(-7, Record::new("TestRpcMessageData2").with("i", 1234).into());
    let bytes = ser.encode_to_vec(&message1)?;
    assert_eq!(vec![0xff, 0xff, 0xff, 0xf9, 1, 1, 0, 0, 0x04, 0xd2], bytes);
    assert_eq!(message1, ser.decode(&bytes, 0)?.0);

    // A truncated envelope never yields a partial message.
    for short in 0..bytes.len() {
        assert!(matches!(
            ser.decode(&bytes[..short], 0),
            Err(DecodeError::Truncated { .. })
        ));
    }

    let mut corrupt = bytes.clone();
    corrupt[5] = 9;
    assert_eq!(
        Err(DecodeError::UnknownDiscriminant {
            group: GroupName::from(MESSAGE_TYPES),
            tag: 9
        }),
        ser.decode(&corrupt, 0).map(|(v, _)| v)
    );
    Ok(())
}

fn null_payload(cache: &Arc<SerializerCache>) -> Result<()> {
    let ser = rpc_serializer(cache)?;

    let message1 = message(0, Value::Null);
    let bytes = ser.encode_to_vec(&message1)?;
    assert_eq!(vec![0, 0, 0, 0, 0], bytes);
    assert_eq!(message1, ser.decode(&bytes, 0)?.0);
    Ok(())
}

fn foreign_payload(cache: &Arc<SerializerCache>) -> Result<()> {
    let ser = rpc_serializer(cache)?;

    let message1 = message(0, Record::new("Unregistered").into());
    assert_eq!(
        Err(EncodeError::UnregisteredSubtype {
            group: GroupName::from(MESSAGE_TYPES),
            runtime_type: String::from("Unregistered"),
        }),
        ser.encode_to_vec(&message1)
    );

    let err = ser.encode_to_vec(&message1).map_err(SerializerError::from);
    assert!(matches!(err, Err(SerializerError::Encode(_))));
    Ok(())
}

fn incomplete_registrations(cache: &Arc<SerializerCache>) -> Result<()> {
    let builder = SerializerBuilder::new().with_cache(Arc::clone(cache));
    let err = match builder.build(TypeRef::record("RpcMessage")) {
        Ok(_) => return Err(anyhow!("built without registrations")),
        Err(e) => anyhow::Error::from(e),
    };
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::Unresolvable {
            type_name,
            referenced_from,
        }) => {
            assert_eq!("record RpcMessage", type_name);
            assert_eq!("root", referenced_from);
        }
        etc => panic!("{etc:?}"),
    }

    let mut builder = SerializerBuilder::new().with_cache(Arc::clone(cache));
    register_rpc_types(&mut builder)?;
    assert_eq!(
        Err(BuildError::DuplicateGroup(GroupName::from(MESSAGE_TYPES))),
        builder.register_subtypes(SubtypeGroup::new(MESSAGE_TYPES).member("TestRpcMessageData"))
    );
    Ok(())
}
