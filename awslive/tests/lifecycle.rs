//! Lifecycle integration tests over the in-memory backends
//!
//! These exercise the full create → use → destroy paths the way a consuming
//! test suite would, with the mock stack standing in for the remote service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use awslive::{
    AttrValue, Item, LiveQueue, LiveResource, LiveTable, LiveTopicQueue, QueueError, QueuePolicy,
    SnsApi, SqsApi, TableError, TableSpec, TopicError,
};
use awslive_mock::{memory_stack, MemoryDynamo, MemorySqs};

#[tokio::test]
async fn scoped_queue_is_destroyed_after_normal_exit() {
    let api = Arc::new(MemorySqs::new());

    let name = LiveQueue::scoped(api.clone(), |queue| async move {
        Ok::<_, QueueError>(queue.name)
    })
    .await
    .unwrap();

    let probe = LiveQueue::new(api);
    assert!(!probe.exists(&name).await.unwrap());
}

#[tokio::test]
async fn scoped_queue_is_destroyed_when_the_body_fails() {
    let api = Arc::new(MemorySqs::new());
    let seen_name = Arc::new(Mutex::new(String::new()));

    let captured = seen_name.clone();
    let result: Result<(), QueueError> = LiveQueue::scoped(api.clone(), |queue| async move {
        *captured.lock().unwrap() = queue.name;
        Err(QueueError::NoQueueHeld)
    })
    .await;
    assert!(result.is_err());

    let name = seen_name.lock().unwrap().clone();
    assert!(!name.is_empty());
    let probe = LiveQueue::new(api);
    assert!(!probe.exists(&name).await.unwrap());
}

#[tokio::test]
async fn a_test_body_can_round_trip_messages() {
    let api = Arc::new(MemorySqs::new());

    let bodies = LiveQueue::scoped(api.clone(), |queue| {
        let api = api.clone();
        async move {
            api.send_message(&queue.url, "test text").await?;
            let messages = api.receive_messages(&queue.url, 10).await?;
            Ok::<_, QueueError>(messages.into_iter().map(|m| m.body).collect::<Vec<_>>())
        }
    })
    .await
    .unwrap();

    assert_eq!(bodies, vec!["test text"]);
}

#[tokio::test]
async fn topic_and_queue_are_bound_by_policy_and_subscription() {
    let (sqs, sns, _dynamodb) = memory_stack();
    let mut live = LiveTopicQueue::new(sns.clone(), sqs.clone());
    assert!(live.topic().is_none());
    assert!(live.queue().is_none());

    let (topic, queue) = live.create_topic_and_queue().await.unwrap();
    let queue_arn = sqs.queue_arn(&queue.url).await.unwrap();

    // The policy admits exactly the created pair.
    let policy = QueuePolicy::from_json(&sqs.policy_of(&queue.url).unwrap()).unwrap();
    assert!(policy.permits(&topic.arn, &queue_arn));

    // The queue is the topic's only subscriber.
    assert_eq!(sns.endpoints_of(&topic.arn), vec![queue_arn]);

    live.destroy_topic_and_queue().await.unwrap();
    assert!(live.topic().is_none());
    assert!(live.queue().is_none());
    assert_eq!(sns.topic_count(), 0);
    assert_eq!(sqs.queue_count(), 0);
}

#[tokio::test]
async fn published_messages_arrive_wrapped_in_an_envelope() {
    let (sqs, sns, _dynamodb) = memory_stack();
    let mut live = LiveTopicQueue::new(sns, sqs);
    live.create_topic_and_queue().await.unwrap();

    live.publish("some").await.unwrap();
    let messages = live.receive_messages(1).await.unwrap();
    assert_eq!(messages.len(), 1);

    let envelope: serde_json::Value = serde_json::from_str(&messages[0].body).unwrap();
    assert_eq!(envelope["Type"], "Notification");
    assert_eq!(envelope["Message"], "some");

    live.destroy_topic_and_queue().await.unwrap();
}

#[tokio::test]
async fn scoped_topic_queue_cleans_up_both_resources() {
    let (sqs, sns, _dynamodb) = memory_stack();

    let payload = LiveTopicQueue::scoped(sns.clone(), sqs.clone(), |topic, queue| {
        let sns = sns.clone();
        let sqs = sqs.clone();
        async move {
            sns.publish(&topic.arn, "scoped payload").await?;
            let messages = sqs.receive_messages(&queue.url, 1).await?;
            let envelope: serde_json::Value =
                serde_json::from_str(&messages[0].body).expect("envelope is JSON");
            Ok::<_, TopicError>(envelope["Message"].as_str().unwrap_or_default().to_string())
        }
    })
    .await
    .unwrap();

    assert_eq!(payload, "scoped payload");
}

#[tokio::test]
async fn table_lifecycle_waits_out_creation_and_stores_items() {
    let api = Arc::new(MemoryDynamo::with_creation_probes(2));
    let spec = TableSpec::with_keys(
        "my_partition_key",
        awslive::ScalarType::S,
        "my_sorting_key",
        awslive::ScalarType::N,
        1,
        1,
    );
    let mut live = LiveTable::with_spec(api.clone(), spec.clone())
        .polling(Duration::ZERO, Duration::from_secs(5));

    let name = live.create_table().await.unwrap();
    // The configuration is applied verbatim to the remote create call.
    assert_eq!(api.spec_of(&name), Some(spec));

    let mut item = Item::new();
    item.insert("my_partition_key".to_string(), AttrValue::string("test"));
    item.insert("my_sorting_key".to_string(), AttrValue::number(0));
    live.put_item(item.clone()).await.unwrap();

    let mut key = Item::new();
    key.insert("my_partition_key".to_string(), AttrValue::string("test"));
    key.insert("my_sorting_key".to_string(), AttrValue::number(0));
    assert_eq!(live.get_item(key).await.unwrap(), Some(item));

    live.destroy_table().await.unwrap();
    assert_eq!(api.table_count(), 0);

    // Destroying again has nothing to act on.
    assert!(matches!(
        live.destroy_table().await,
        Err(TableError::NoTableHeld)
    ));
}
