//! In-memory SNS backend with SQS delivery

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{info, warn};

use awslive_core::ApiError;
use awslive_sns::{QueuePolicy, SnsApi, TopicHandle};
use awslive_sqs::SqsApi;

use crate::sqs::MemorySqs;

struct Subscription {
    endpoint: String,
    arn: String,
}

/// Process-local topic store.
///
/// `publish` actually fans out: every subscribed queue endpoint receives the
/// message wrapped in the service's notification envelope, but only if the
/// queue's policy admits this topic. An unwired policy drops the delivery,
/// as it would remotely.
pub struct MemorySns {
    sqs: Arc<MemorySqs>,
    topics: DashMap<String, TopicHandle>,
    subscriptions: DashMap<String, Vec<Subscription>>,
    delete_status: AtomicU16,
}

impl MemorySns {
    pub fn new(sqs: Arc<MemorySqs>) -> Self {
        Self {
            sqs,
            topics: DashMap::new(),
            subscriptions: DashMap::new(),
            delete_status: AtomicU16::new(200),
        }
    }

    /// Status every subsequent `delete_topic` call reports.
    pub fn set_delete_status(&self, status: u16) {
        self.delete_status.store(status, Ordering::SeqCst);
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Subscription endpoints registered for a topic.
    pub fn endpoints_of(&self, topic_arn: &str) -> Vec<String> {
        self.subscriptions
            .get(topic_arn)
            .map(|subs| subs.iter().map(|s| s.endpoint.clone()).collect())
            .unwrap_or_default()
    }

    fn arn_of(name: &str) -> String {
        format!("arn:aws:sns:us-east-1:000000000000:{name}")
    }

    fn permitted(&self, topic_arn: &str, queue_arn: &str, queue_url: &str) -> bool {
        let Some(policy) = self.sqs.policy_of(queue_url) else {
            return false;
        };
        match QueuePolicy::from_json(&policy) {
            Ok(policy) => policy.permits(topic_arn, queue_arn),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl SnsApi for MemorySns {
    async fn create_topic(&self, name: &str) -> Result<TopicHandle, ApiError> {
        let arn = Self::arn_of(name);
        if self.topics.contains_key(&arn) {
            return Err(ApiError::new(format!("topic already exists: {name}")));
        }

        let handle = TopicHandle {
            name: name.to_string(),
            arn: arn.clone(),
        };
        info!(name = %name, arn = %arn, "Creating topic");
        self.topics.insert(arn.clone(), handle.clone());
        self.subscriptions.insert(arn, Vec::new());
        Ok(handle)
    }

    async fn delete_topic(&self, arn: &str) -> Result<u16, ApiError> {
        let status = self.delete_status.load(Ordering::SeqCst);
        if status == 200 {
            info!(arn = %arn, "Deleting topic");
            self.topics.remove(arn);
            self.subscriptions.remove(arn);
        }
        Ok(status)
    }

    async fn list_topic_arns(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.topics.iter().map(|t| t.key().clone()).collect())
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<String, ApiError> {
        if protocol != "sqs" {
            return Err(ApiError::new(format!("unsupported protocol: {protocol}")));
        }
        let mut subscriptions = self
            .subscriptions
            .get_mut(topic_arn)
            .ok_or_else(|| ApiError::new(format!("topic does not exist: {topic_arn}")))?;

        let short_id = uuid::Uuid::new_v4().to_string();
        let subscription_arn = format!("{topic_arn}:{}", &short_id[..8]);
        info!(topic = %topic_arn, endpoint = %endpoint, "Subscribed");
        subscriptions.push(Subscription {
            endpoint: endpoint.to_string(),
            arn: subscription_arn.clone(),
        });
        Ok(subscription_arn)
    }

    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, ApiError> {
        if !self.topics.contains_key(topic_arn) {
            return Err(ApiError::new(format!("topic does not exist: {topic_arn}")));
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        let endpoints = self.endpoints_of(topic_arn);
        for queue_arn in &endpoints {
            let Some(queue_url) = self.sqs.url_for_arn(queue_arn) else {
                warn!(endpoint = %queue_arn, "subscription endpoint has no queue, dropping");
                continue;
            };
            if !self.permitted(topic_arn, queue_arn, &queue_url) {
                warn!(topic = %topic_arn, queue = %queue_arn,
                    "queue policy does not admit topic, dropping");
                continue;
            }
            let envelope = serde_json::json!({
                "Type": "Notification",
                "MessageId": message_id,
                "TopicArn": topic_arn,
                "Message": message,
                "Timestamp": chrono::Utc::now().to_rfc3339(),
            });
            self.sqs.send_message(&queue_url, &envelope.to_string()).await?;
        }

        info!(topic = %topic_arn, message_id = %message_id,
            subscriber_count = endpoints.len(), "Published message");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn wired_pair(sns: &MemorySns, sqs: &MemorySqs) -> (TopicHandle, String) {
        let topic = sns.create_topic("test-1111111").await.unwrap();
        let queue = sqs.create_queue("test-2222222").await.unwrap();
        let queue_arn = sqs.queue_arn(&queue.url).await.unwrap();

        let policy = QueuePolicy::allow_topic_to_queue(&topic.arn, &queue_arn);
        sqs.set_queue_policy(&queue.url, &policy.to_json().unwrap())
            .await
            .unwrap();
        sns.subscribe(&topic.arn, "sqs", &queue_arn).await.unwrap();
        (topic, queue.url)
    }

    #[tokio::test]
    async fn publish_delivers_enveloped_messages() {
        let sqs = Arc::new(MemorySqs::new());
        let sns = MemorySns::new(sqs.clone());
        let (topic, queue_url) = wired_pair(&sns, &sqs).await;

        sns.publish(&topic.arn, "some").await.unwrap();

        let messages = sqs.receive_messages(&queue_url, 1).await.unwrap();
        assert_eq!(messages.len(), 1);
        let envelope: serde_json::Value = serde_json::from_str(&messages[0].body).unwrap();
        assert_eq!(envelope["Type"], "Notification");
        assert_eq!(envelope["TopicArn"], topic.arn);
        assert_eq!(envelope["Message"], "some");
    }

    #[tokio::test]
    async fn publish_without_a_policy_drops_the_delivery() {
        let sqs = Arc::new(MemorySqs::new());
        let sns = MemorySns::new(sqs.clone());

        let topic = sns.create_topic("test-1111111").await.unwrap();
        let queue = sqs.create_queue("test-2222222").await.unwrap();
        let queue_arn = sqs.queue_arn(&queue.url).await.unwrap();
        sns.subscribe(&topic.arn, "sqs", &queue_arn).await.unwrap();

        sns.publish(&topic.arn, "some").await.unwrap();
        assert!(sqs.receive_messages(&queue.url, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_sqs_subscriptions_are_supported() {
        let sqs = Arc::new(MemorySqs::new());
        let sns = MemorySns::new(sqs);
        let topic = sns.create_topic("test-1111111").await.unwrap();
        assert!(sns
            .subscribe(&topic.arn, "email", "someone@example.com")
            .await
            .is_err());
    }
}
