//! SQS access layer seam

use async_trait::async_trait;
use awslive_core::ApiError;

/// A live remote queue: its generated name and service-assigned URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHandle {
    pub name: String,
    pub url: String,
}

/// A message pulled off a queue.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub body: String,
    pub receipt_handle: String,
}

/// The slice of the SQS resource-management API the lifecycle needs.
///
/// `SdkSqs` implements this over the real service; tests inject in-memory
/// doubles. `delete_queue` reports the call's HTTP status rather than
/// failing, so the lifecycle can apply its own status inspection.
#[async_trait]
pub trait SqsApi: Send + Sync {
    async fn create_queue(&self, name: &str) -> Result<QueueHandle, ApiError>;

    /// Delete the queue at `url`, returning the call status.
    async fn delete_queue(&self, url: &str) -> Result<u16, ApiError>;

    /// URLs of all visible queues.
    async fn list_queue_urls(&self) -> Result<Vec<String>, ApiError>;

    /// The queue's ARN, as reported by its attributes.
    async fn queue_arn(&self, url: &str) -> Result<String, ApiError>;

    /// Replace the queue's access policy attribute with `policy` (JSON).
    async fn set_queue_policy(&self, url: &str, policy: &str) -> Result<(), ApiError>;

    async fn send_message(&self, url: &str, body: &str) -> Result<(), ApiError>;

    async fn receive_messages(
        &self,
        url: &str,
        max: i32,
    ) -> Result<Vec<ReceivedMessage>, ApiError>;

    async fn delete_message(&self, url: &str, receipt_handle: &str) -> Result<(), ApiError>;
}
