//! Topic + queue lifecycle

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use awslive_core::{is_error_call, ApiError, LiveResource};
use awslive_sqs::{LiveQueue, QueueError, QueueHandle, ReceivedMessage, SqsApi};

use crate::api::{SnsApi, TopicHandle};
use crate::policy::QueuePolicy;

#[derive(Error, Debug)]
pub enum TopicError {
    #[error("SNS could not create topic")]
    CreateFailed(#[source] ApiError),
    #[error("SNS could not delete topic {name}: status {status}")]
    DeleteFailed { name: String, status: u16 },
    #[error("no topic is currently held")]
    NoTopicHeld,
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Create/use/destroy wrapper around a test topic fanning out to a test
/// queue.
///
/// Creation wires three things in order: the topic, the queue, and the
/// policy + subscription binding them. The policy and subscription are
/// derived state, rebuilt on every acquisition and never stored here.
pub struct LiveTopicQueue {
    api: Arc<dyn SnsApi>,
    queue: LiveQueue,
    topic: Option<TopicHandle>,
}

impl LiveTopicQueue {
    pub fn new(sns: Arc<dyn SnsApi>, sqs: Arc<dyn SqsApi>) -> Self {
        Self {
            api: sns,
            queue: LiveQueue::new(sqs),
            topic: None,
        }
    }

    /// The held topic, if one is live.
    pub fn topic(&self) -> Option<&TopicHandle> {
        self.topic.as_ref()
    }

    /// The held queue, if one is live.
    pub fn queue(&self) -> Option<&QueueHandle> {
        self.queue.handle()
    }

    /// Create the topic and the queue, then bind them: the queue's policy is
    /// replaced with one admitting the topic's deliveries, and the queue is
    /// subscribed to the topic over the `sqs` protocol.
    pub async fn create_topic_and_queue(
        &mut self,
    ) -> Result<(TopicHandle, QueueHandle), TopicError> {
        let name = self.generate_name().await?;
        let topic = self
            .api
            .create_topic(&name)
            .await
            .map_err(TopicError::CreateFailed)?;
        info!(name = %topic.name, arn = %topic.arn, "Created test topic");
        self.topic = Some(topic.clone());

        let queue = self.queue.create_queue().await?.clone();
        let queue_arn = self.queue.api().queue_arn(&queue.url).await?;

        let policy = QueuePolicy::allow_topic_to_queue(&topic.arn, &queue_arn);
        let policy_json = policy
            .to_json()
            .map_err(|e| ApiError::with_source("could not serialize queue policy", e))?;
        self.queue
            .api()
            .set_queue_policy(&queue.url, &policy_json)
            .await?;

        let subscription_arn = self.api.subscribe(&topic.arn, "sqs", &queue_arn).await?;
        info!(
            topic = %topic.name,
            queue = %queue.name,
            subscription = %subscription_arn,
            "Subscribed queue to topic"
        );
        Ok((topic, queue))
    }

    /// Destroy the queue, then the topic. Deleting the topic first would
    /// leave the subscription dangling on the queue side.
    pub async fn destroy_topic_and_queue(&mut self) -> Result<(), TopicError> {
        self.queue.destroy_queue().await?;

        let topic = self.topic.as_ref().ok_or(TopicError::NoTopicHeld)?;
        let status = self.api.delete_topic(&topic.arn).await?;
        if is_error_call(status) {
            return Err(TopicError::DeleteFailed {
                name: topic.name.clone(),
                status,
            });
        }
        info!(name = %topic.name, "Destroyed test topic");
        self.topic = None;
        Ok(())
    }

    /// Publish a message to the held topic, returning its message id.
    pub async fn publish(&self, message: &str) -> Result<String, TopicError> {
        let topic = self.topic.as_ref().ok_or(TopicError::NoTopicHeld)?;
        Ok(self.api.publish(&topic.arn, message).await?)
    }

    /// Receive up to `max` messages from the bound queue.
    pub async fn receive_messages(&self, max: i32) -> Result<Vec<ReceivedMessage>, TopicError> {
        Ok(self.queue.receive_messages(max).await?)
    }

    /// Run `body` against a freshly bound topic/queue pair, destroying both
    /// on every exit path. A body error takes precedence over a teardown
    /// error; a teardown failure after a failed body is logged and dropped.
    pub async fn scoped<T, E, F, Fut>(
        sns: Arc<dyn SnsApi>,
        sqs: Arc<dyn SqsApi>,
        body: F,
    ) -> Result<T, E>
    where
        E: From<TopicError>,
        F: FnOnce(TopicHandle, QueueHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut live = LiveTopicQueue::new(sns, sqs);
        let (topic, queue) = live.create_topic_and_queue().await.map_err(E::from)?;
        let result = body(topic, queue).await;
        let teardown = live.destroy_topic_and_queue().await;
        match result {
            Ok(value) => teardown.map_err(E::from).map(|()| value),
            Err(err) => {
                if let Err(teardown_err) = teardown {
                    warn!(error = %teardown_err, "topic teardown failed after body error");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl LiveResource for LiveTopicQueue {
    /// Topic ARNs embed the topic name as their final segment.
    async fn exists(&self, name: &str) -> Result<bool, ApiError> {
        let arns = self.api.list_topic_arns().await?;
        Ok(arns.iter().any(|arn| arn.contains(name)))
    }
}
