//! Ephemeral AWS resources for integration tests
//!
//! awslive creates uniquely-named AWS resources for the duration of one
//! test and destroys them afterwards:
//!
//! - [`LiveQueue`]: an SQS queue
//! - [`LiveTopicQueue`]: an SNS topic fanning out to a bound SQS queue
//! - [`LiveTable`]: a DynamoDB table
//!
//! Each lifecycle generates a collision-free `test-<digits>` name, creates
//! the resource, and deletes it on scope exit. The [`cleanup`] module (and
//! the `awslive-cleanup` binary) removes resources a crashed run left
//! behind.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use awslive::{LiveQueue, SdkSqs, SqsApi};
//!
//! # async fn example() -> Result<(), awslive::QueueError> {
//! let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//! let api = Arc::new(SdkSqs::new(&config));
//!
//! LiveQueue::scoped(api.clone(), |queue| {
//!     let api = api.clone();
//!     async move {
//!         api.send_message(&queue.url, "some payload").await?;
//!         Ok(())
//!     }
//! })
//! .await
//! # }
//! ```

pub mod cleanup;

pub use awslive_core::{
    is_error_call, is_test_resource, random_test_name, ApiError, LiveResource, TEST_PREFIX,
};
pub use awslive_dynamodb::{
    AttrValue, AttributeSpec, DynamoApi, Item, KeyRole, KeySchemaEntry, LiveTable, ScalarType,
    SdkDynamo, TableError, TableSpec, TableStatus, Throughput,
};
pub use awslive_sns::{LiveTopicQueue, QueuePolicy, SdkSns, SnsApi, TopicError, TopicHandle};
pub use awslive_sqs::{LiveQueue, QueueError, QueueHandle, ReceivedMessage, SdkSqs, SqsApi};

pub use cleanup::{clean_test_queues, clean_test_topics, cleanup, CleanupError};
