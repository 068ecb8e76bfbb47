//! Ephemeral SQS test queues
//!
//! `LiveQueue` wraps one SQS queue in a create/use/destroy lifecycle with a
//! collision-free generated name. Intended usage:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use awslive_sqs::{LiveQueue, SdkSqs, SqsApi};
//!
//! # async fn example() -> Result<(), awslive_sqs::QueueError> {
//! let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//! let api = Arc::new(SdkSqs::new(&config));
//!
//! LiveQueue::scoped(api.clone(), |queue| {
//!     let api = api.clone();
//!     async move {
//!         api.send_message(&queue.url, "some payload").await?;
//!         let messages = api.receive_messages(&queue.url, 1).await?;
//!         assert_eq!(messages[0].body, "some payload");
//!         Ok(())
//!     }
//! })
//! .await
//! # }
//! ```
//!
//! The queue is deleted when the scope exits, whether the body succeeded or
//! not.

pub mod api;
pub mod queue;
pub mod sdk;

pub use api::{QueueHandle, ReceivedMessage, SqsApi};
pub use queue::{LiveQueue, QueueError};
pub use sdk::SdkSqs;
