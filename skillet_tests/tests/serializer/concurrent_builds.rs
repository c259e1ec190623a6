use super::helpers::{join_tasks, rpc_serializer};
use anyhow::Result;
use skillet_serializer::{BinarySerializer, SerializerCache};
use skillet_types::{Record, Value};
use std::sync::Arc;

const TASK_COUNT: i32 = 16;

pub async fn test_concurrent_builds(cache: &Arc<SerializerCache>) -> Result<()> {
    let generations_before = cache.generations();

    let mut tasks = vec![];
    for cookie in 0..TASK_COUNT {
        let cache = Arc::clone(cache);
        let task = tokio::task::spawn_blocking(move || -> Result<BinarySerializer> {
            let ser = rpc_serializer(&cache)?;

            let data = Record::new("TestRpcMessageData").with("s", format!("task {cookie}"));
            let message: Value = Record::new("RpcMessage")
                .with("cookie", cookie)
                .with("data", data)
                .into();
            let bytes = ser.encode_to_vec(&message)?;
            assert_eq!(message, ser.decode(&bytes, 0)?.0);

            Ok(ser)
        });
        tasks.push(task);
    }
    let serializers = join_tasks(tasks).await?;

    assert_eq!(TASK_COUNT as usize, serializers.len());
    let first = &serializers[0];
    assert!(serializers.iter().all(|ser| ser.shares_program_with(first)));
    assert_eq!(generations_before + 1, cache.generations());

    // Building again from an async context reuses the same program.
    let again = rpc_serializer(cache)?;
    assert!(again.shares_program_with(first));
    assert_eq!(generations_before + 1, cache.generations());
    Ok(())
}
