use anyhow::Result;
use itertools::iproduct;
use rand::{distributions::Alphanumeric, rngs::ThreadRng, Rng};
use skillet_serializer::{
    expect_record, take_field, BuildError, FieldDescriptor, RecordDescriptor, Serializable,
    SerializerBuilder, SerializerCache, TypeRef, TypedSerializer,
};
use skillet_types::{CompatibilityLevel, DecodeError, Record, ScalarKind, Value};
use std::sync::Arc;

const LEVELS: [CompatibilityLevel; 4] = [
    CompatibilityLevel::Level1,
    CompatibilityLevel::Level2,
    CompatibilityLevel::Level3,
    CompatibilityLevel::Level3Le,
];

pub fn test_shapes(cache: &Arc<SerializerCache>) -> Result<()> {
    random_orders(cache)?;
    optional_fields(cache)?;
    byte_order(cache)?;
    Ok(())
}

#[derive(PartialEq, Clone, Debug)]
struct Line {
    sku: String,
    qty: i16,
    price: f64,
}

impl Serializable for Line {
    fn type_ref() -> TypeRef {
        TypeRef::record("Line")
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        builder.register_record(
            RecordDescriptor::new("Line")
                .field(FieldDescriptor::new("sku", String::type_ref()))
                .field(FieldDescriptor::new("qty", i16::type_ref()).var_length())
                .field(FieldDescriptor::new("price", f64::type_ref())),
        )
    }

    fn to_value(&self) -> Value {
        Record::new("Line")
            .with("sku", self.sku.to_value())
            .with("qty", self.qty.to_value())
            .with("price", self.price.to_value())
            .into()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut rec = expect_record(value, "Line")?;
        Ok(Self {
            sku: take_field(&mut rec, "sku")?,
            qty: take_field(&mut rec, "qty")?,
            price: take_field(&mut rec, "price")?,
        })
    }
}

#[derive(PartialEq, Clone, Debug)]
struct Order {
    id: u32,
    lines: Vec<Line>,
    note: Option<String>,
    rush: Option<bool>,
}

impl Serializable for Order {
    fn type_ref() -> TypeRef {
        TypeRef::record("Order")
    }

    fn register(builder: &mut SerializerBuilder) -> Result<(), BuildError> {
        builder.register_record(
            RecordDescriptor::new("Order")
                .field(FieldDescriptor::new("id", u32::type_ref()).var_length())
                .field(FieldDescriptor::new("lines", Vec::<Line>::type_ref()))
                .field(FieldDescriptor::new("note", Option::<String>::type_ref()))
                .field(FieldDescriptor::new("rush", Option::<bool>::type_ref())),
        )?;
        Vec::<Line>::register(builder)
    }

    fn to_value(&self) -> Value {
        Record::new("Order")
            .with("id", self.id.to_value())
            .with("lines", self.lines.to_value())
            .with("note", self.note.to_value())
            .with("rush", self.rush.to_value())
            .into()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut rec = expect_record(value, "Order")?;
        Ok(Self {
            id: take_field(&mut rec, "id")?,
            lines: take_field(&mut rec, "lines")?,
            note: take_field(&mut rec, "note")?,
            rush: take_field(&mut rec, "rush")?,
        })
    }
}

fn order_serializer(
    cache: &Arc<SerializerCache>,
    level: CompatibilityLevel,
) -> Result<TypedSerializer<Order>> {
    let ser = SerializerBuilder::new()
        .with_cache(Arc::clone(cache))
        .with_compatibility_level(level)
        .build_typed::<Order>()?;
    Ok(ser)
}

fn gen_string(rng: &mut ThreadRng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn gen_order(rng: &mut ThreadRng) -> Order {
    let lines = (0..rng.gen_range(0..8))
        .map(|_| Line {
            sku: gen_string(rng, 12),
            qty: rng.gen(),
            price: rng.gen_range(0.0..1000.0),
        })
        .collect();
    Order {
        id: rng.gen(),
        lines,
        note: rng.gen_bool(0.5).then(|| gen_string(rng, 40)),
        rush: rng.gen_bool(0.5).then(|| rng.gen()),
    }
}

fn random_orders(cache: &Arc<SerializerCache>) -> Result<()> {
    let mut rng = rand::thread_rng();
    for level in LEVELS {
        let ser = order_serializer(cache, level)?;
        assert_eq!(level, ser.untyped().compatibility_level());

        for _ in 0..200 {
            let order = gen_order(&mut rng);
            let bytes = ser.encode_to_vec(&order)?;
            let (decoded, end) = ser.decode(&bytes, 0)?;
            assert_eq!(order, decoded, "{level:?}");
            assert_eq!(bytes.len(), end);
        }
    }
    Ok(())
}

fn optional_fields(cache: &Arc<SerializerCache>) -> Result<()> {
    let level2 = order_serializer(cache, CompatibilityLevel::Level2)?;
    let level3 = order_serializer(cache, CompatibilityLevel::Level3)?;

    let notes = [None, Some(String::new()), Some(String::from("leave at door"))];
    let rushes = [None, Some(false), Some(true)];
    for (note, rush) in iproduct!(notes, rushes) {
        let order = Order {
            id: 7,
            lines: vec![],
            note,
            rush,
        };
        let bytes2 = level2.encode_to_vec(&order)?;
        let bytes3 = level3.encode_to_vec(&order)?;
        assert_eq!(order, level2.decode(&bytes2, 0)?.0);
        assert_eq!(order, level3.decode(&bytes3, 0)?.0);

        // Only a present boolean costs the extra byte without packing.
        let extra = usize::from(order.rush.is_some());
        assert_eq!(bytes3.len() + extra, bytes2.len(), "{order:?}");
    }
    Ok(())
}

fn byte_order(cache: &Arc<SerializerCache>) -> Result<()> {
    let word: Value = Record::new("Word").with("w", 0x0102_0304u32).into();
    let mut encoded = vec![];
    for level in [CompatibilityLevel::Level3, CompatibilityLevel::Level3Le] {
        let mut builder = SerializerBuilder::new()
            .with_cache(Arc::clone(cache))
            .with_compatibility_level(level);
        builder.register_record(
            RecordDescriptor::new("Word")
                .field(FieldDescriptor::new("w", TypeRef::Scalar(ScalarKind::U32))),
        )?;
        let ser = builder.build(TypeRef::record("Word"))?;
        let bytes = ser.encode_to_vec(&word)?;
        assert_eq!(word, ser.decode(&bytes, 0)?.0);
        encoded.push(bytes);
    }
    assert_eq!(vec![vec![1, 2, 3, 4], vec![4, 3, 2, 1]], encoded);
    Ok(())
}
