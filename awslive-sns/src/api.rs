//! SNS access layer seam

use async_trait::async_trait;
use awslive_core::ApiError;

/// A live remote topic: its generated name and service-assigned ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHandle {
    pub name: String,
    pub arn: String,
}

/// The slice of the SNS resource-management API the lifecycle needs.
#[async_trait]
pub trait SnsApi: Send + Sync {
    async fn create_topic(&self, name: &str) -> Result<TopicHandle, ApiError>;

    /// Delete the topic at `arn`, returning the call status.
    async fn delete_topic(&self, arn: &str) -> Result<u16, ApiError>;

    /// ARNs of all visible topics.
    async fn list_topic_arns(&self) -> Result<Vec<String>, ApiError>;

    /// Subscribe `endpoint` to the topic over `protocol`, returning the
    /// subscription ARN.
    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<String, ApiError>;

    /// Publish a message, returning its message id.
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, ApiError>;
}
