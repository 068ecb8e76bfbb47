//! Cleanup sweeps over the in-memory backends

use std::sync::Arc;

use awslive::{clean_test_queues, clean_test_topics, cleanup, CleanupError, SnsApi, SqsApi};
use awslive_mock::{MemorySns, MemorySqs};

#[tokio::test]
async fn only_matching_resources_are_swept() {
    let sqs = Arc::new(MemorySqs::new());
    let sns = MemorySns::new(sqs.clone());

    for name in ["test-1000001", "test-1000002", "orders", "test-alpha"] {
        sqs.create_queue(name).await.unwrap();
    }
    for name in ["test-2000001", "keep-me"] {
        sns.create_topic(name).await.unwrap();
    }

    assert_eq!(clean_test_queues(sqs.as_ref()).await.unwrap(), 2);
    let remaining = sqs.list_queue_urls().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|url| !url.contains("test-100")));

    assert_eq!(clean_test_topics(&sns).await.unwrap(), 1);
    let remaining = sns.list_topic_arns().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].ends_with("keep-me"));
}

#[tokio::test]
async fn a_failed_delete_aborts_the_sweep() {
    let sqs = MemorySqs::new();
    sqs.create_queue("test-1000001").await.unwrap();
    sqs.set_delete_status(403);

    match clean_test_queues(&sqs).await {
        Err(CleanupError::QueueDelete { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected QueueDelete, got {other:?}"),
    }
    assert_eq!(sqs.queue_count(), 1);
}

#[tokio::test]
async fn topics_are_swept_even_when_the_queue_sweep_fails() {
    let sqs = Arc::new(MemorySqs::new());
    let sns = MemorySns::new(sqs.clone());

    sqs.create_queue("test-1000001").await.unwrap();
    sqs.set_delete_status(500);
    sns.create_topic("test-2000001").await.unwrap();

    let result = cleanup(sqs.as_ref(), &sns).await;
    assert!(matches!(result, Err(CleanupError::QueueDelete { .. })));
    // The topic sweep still ran.
    assert_eq!(sns.topic_count(), 0);
}
