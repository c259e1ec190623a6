use anyhow::{anyhow, Result};
use skillet_serializer::{
    BinarySerializer, FieldDescriptor, RecordDescriptor, SerializerBuilder, SerializerCache,
    SubtypeGroup, TypeRef,
};
use skillet_types::ScalarKind;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const MESSAGE_TYPES: &str = "message_types";

/// The message envelope of an RPC protocol, with two payload types.
pub fn register_rpc_types(builder: &mut SerializerBuilder) -> Result<()> {
    builder.register_record(
        RecordDescriptor::new("TestRpcMessageData")
            .field(FieldDescriptor::new("s", TypeRef::Str).order(0)),
    )?;
    builder.register_record(
        RecordDescriptor::new("TestRpcMessageData2")
            .field(FieldDescriptor::new("i", TypeRef::Scalar(ScalarKind::I32)).order(0)),
    )?;
    builder.register_subtypes(
        SubtypeGroup::new(MESSAGE_TYPES)
            .member("TestRpcMessageData")
            .member("TestRpcMessageData2"),
    )?;
    builder.register_record(
        RecordDescriptor::new("RpcMessage")
            .field(FieldDescriptor::new("cookie", TypeRef::Scalar(ScalarKind::I32)).order(1))
            .field(
                FieldDescriptor::new("data", TypeRef::subtypes(MESSAGE_TYPES).nullable()).order(2),
            ),
    )?;
    Ok(())
}

pub fn rpc_serializer(cache: &Arc<SerializerCache>) -> Result<BinarySerializer> {
    let mut builder = SerializerBuilder::new().with_cache(Arc::clone(cache));
    register_rpc_types(&mut builder)?;
    Ok(builder.build(TypeRef::record("RpcMessage"))?)
}

pub async fn join_tasks<T>(tasks: Vec<JoinHandle<Result<T>>>) -> Result<Vec<T>> {
    let mut outputs = vec![];
    let mut errs = vec![];
    for task in tasks {
        match task.await {
            Ok(Ok(output)) => outputs.push(output),
            Ok(Err(e)) => errs.push(e),
            Err(e) => errs.push(anyhow!(e)),
        }
    }
    if errs.is_empty() {
        Ok(outputs)
    } else {
        Err(anyhow!("{} tasks failed: {:?}", errs.len(), errs))
    }
}
