//! Ephemeral SNS test topics
//!
//! `LiveTopicQueue` wraps an SNS topic together with an SQS queue subscribed
//! to it, so a test can publish to the topic and observe delivery on the
//! queue. Creation wires the queue's access policy to accept the topic's
//! deliveries and subscribes the queue; teardown destroys the queue first,
//! then the topic.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use awslive_sns::{LiveTopicQueue, SdkSns};
//! use awslive_sqs::SdkSqs;
//!
//! # async fn example() -> Result<(), awslive_sns::TopicError> {
//! let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//! let sns = Arc::new(SdkSns::new(&config));
//! let sqs = Arc::new(SdkSqs::new(&config));
//!
//! let mut live = LiveTopicQueue::new(sns, sqs);
//! let (topic, _queue) = live.create_topic_and_queue().await?;
//! live.publish("some payload").await?;
//! // ... receive from the queue, payload is under the envelope's "Message" ...
//! # let _ = topic;
//! live.destroy_topic_and_queue().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod policy;
pub mod sdk;
pub mod topic;

pub use api::{SnsApi, TopicHandle};
pub use policy::QueuePolicy;
pub use sdk::SdkSns;
pub use topic::{LiveTopicQueue, TopicError};
