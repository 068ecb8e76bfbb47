//! In-memory SQS backend

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use awslive_core::ApiError;
use awslive_sqs::{QueueHandle, ReceivedMessage, SqsApi};

struct StoredQueue {
    handle: QueueHandle,
    arn: String,
    policy: Option<String>,
}

/// Process-local queue store.
///
/// Queue URLs and ARNs follow the shapes the real service uses, with the
/// queue name as the final segment, so substring probing behaves as it does
/// remotely. Visibility timeouts are not modeled: a received message is
/// consumed.
#[derive(Default)]
pub struct MemorySqs {
    queues: DashMap<String, StoredQueue>,
    messages: DashMap<String, VecDeque<ReceivedMessage>>,
    fail_next_create: AtomicBool,
    delete_status: AtomicU16,
}

impl MemorySqs {
    pub fn new() -> Self {
        Self {
            delete_status: AtomicU16::new(200),
            ..Self::default()
        }
    }

    /// Make the next `create_queue` call fail at the access layer.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Status every subsequent `delete_queue` call reports.
    pub fn set_delete_status(&self, status: u16) {
        self.delete_status.store(status, Ordering::SeqCst);
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// The policy currently attached to a queue, if any.
    pub fn policy_of(&self, url: &str) -> Option<String> {
        self.queues.get(url).and_then(|q| q.policy.clone())
    }

    /// Resolve a queue ARN back to its URL.
    pub fn url_for_arn(&self, arn: &str) -> Option<String> {
        self.queues
            .iter()
            .find(|q| q.arn == arn)
            .map(|q| q.handle.url.clone())
    }

    fn url_of(name: &str) -> String {
        format!("http://localhost:4566/000000000000/{name}")
    }

    fn arn_of(name: &str) -> String {
        format!("arn:aws:sqs:us-east-1:000000000000:{name}")
    }
}

#[async_trait]
impl SqsApi for MemorySqs {
    async fn create_queue(&self, name: &str) -> Result<QueueHandle, ApiError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(ApiError::new("CreateQueue call failed"));
        }
        let url = Self::url_of(name);
        if self.queues.contains_key(&url) {
            return Err(ApiError::new(format!("queue already exists: {name}")));
        }

        let handle = QueueHandle {
            name: name.to_string(),
            url: url.clone(),
        };
        info!(name = %name, url = %url, "Creating queue");
        self.queues.insert(
            url.clone(),
            StoredQueue {
                handle: handle.clone(),
                arn: Self::arn_of(name),
                policy: None,
            },
        );
        self.messages.insert(url, VecDeque::new());
        Ok(handle)
    }

    async fn delete_queue(&self, url: &str) -> Result<u16, ApiError> {
        let status = self.delete_status.load(Ordering::SeqCst);
        if status == 200 {
            info!(url = %url, "Deleting queue");
            self.queues.remove(url);
            self.messages.remove(url);
        }
        Ok(status)
    }

    async fn list_queue_urls(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.queues.iter().map(|q| q.key().clone()).collect())
    }

    async fn queue_arn(&self, url: &str) -> Result<String, ApiError> {
        self.queues
            .get(url)
            .map(|q| q.arn.clone())
            .ok_or_else(|| ApiError::new(format!("queue does not exist: {url}")))
    }

    async fn set_queue_policy(&self, url: &str, policy: &str) -> Result<(), ApiError> {
        let mut queue = self
            .queues
            .get_mut(url)
            .ok_or_else(|| ApiError::new(format!("queue does not exist: {url}")))?;
        queue.policy = Some(policy.to_string());
        Ok(())
    }

    async fn send_message(&self, url: &str, body: &str) -> Result<(), ApiError> {
        let mut messages = self
            .messages
            .get_mut(url)
            .ok_or_else(|| ApiError::new(format!("queue does not exist: {url}")))?;
        messages.push_back(ReceivedMessage {
            body: body.to_string(),
            receipt_handle: uuid::Uuid::new_v4().to_string(),
        });
        Ok(())
    }

    async fn receive_messages(
        &self,
        url: &str,
        max: i32,
    ) -> Result<Vec<ReceivedMessage>, ApiError> {
        let mut messages = self
            .messages
            .get_mut(url)
            .ok_or_else(|| ApiError::new(format!("queue does not exist: {url}")))?;
        let max = max.clamp(1, 10) as usize;
        let mut out = Vec::new();
        while out.len() < max {
            match messages.pop_front() {
                Some(message) => out.push(message),
                None => break,
            }
        }
        Ok(out)
    }

    async fn delete_message(&self, url: &str, receipt_handle: &str) -> Result<(), ApiError> {
        let mut messages = self
            .messages
            .get_mut(url)
            .ok_or_else(|| ApiError::new(format!("queue does not exist: {url}")))?;
        messages.retain(|m| m.receipt_handle != receipt_handle);
        Ok(())
    }
}
