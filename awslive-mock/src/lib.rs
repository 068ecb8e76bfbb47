//! In-memory AWS backends
//!
//! Implementations of the awslive access-layer traits against process-local
//! state, so every lifecycle path (including SNS→SQS delivery and the
//! DynamoDB status transitions) can be exercised without an AWS account.
//!
//! ```rust
//! use awslive_mock::memory_stack;
//!
//! let (sqs, sns, dynamodb) = memory_stack();
//! // Hand these to LiveQueue / LiveTopicQueue / LiveTable as their APIs.
//! # let _ = (sqs, sns, dynamodb);
//! ```

pub mod dynamodb;
pub mod sns;
pub mod sqs;

use std::sync::Arc;

pub use dynamodb::MemoryDynamo;
pub use sns::MemorySns;
pub use sqs::MemorySqs;

/// A fully wired in-memory stack: the SNS backend delivers into the SQS
/// backend, the DynamoDB backend is independent.
pub fn memory_stack() -> (Arc<MemorySqs>, Arc<MemorySns>, Arc<MemoryDynamo>) {
    let sqs = Arc::new(MemorySqs::new());
    let sns = Arc::new(MemorySns::new(sqs.clone()));
    let dynamodb = Arc::new(MemoryDynamo::new());
    (sqs, sns, dynamodb)
}
