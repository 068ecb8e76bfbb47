//! Queue lifecycle

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use awslive_core::{is_error_call, ApiError, LiveResource};

use crate::api::{QueueHandle, ReceivedMessage, SqsApi};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("SQS could not create queue")]
    CreateFailed(#[source] ApiError),
    #[error("SQS could not delete queue {name}: status {status}")]
    DeleteFailed { name: String, status: u16 },
    #[error("no queue is currently held")]
    NoQueueHeld,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Create/use/destroy wrapper around one test queue.
///
/// Holds at most one live queue; the name and handle are populated together
/// by `create_queue` and cleared together by `destroy_queue`. One instance
/// serves one test and is not meant to be shared across tasks.
pub struct LiveQueue {
    api: Arc<dyn SqsApi>,
    handle: Option<QueueHandle>,
}

impl LiveQueue {
    pub fn new(api: Arc<dyn SqsApi>) -> Self {
        Self { api, handle: None }
    }

    /// The held queue, if one is live.
    pub fn handle(&self) -> Option<&QueueHandle> {
        self.handle.as_ref()
    }

    pub fn api(&self) -> &Arc<dyn SqsApi> {
        &self.api
    }

    /// Generate a free name and create the queue remotely.
    pub async fn create_queue(&mut self) -> Result<&QueueHandle, QueueError> {
        let name = self.generate_name().await?;
        let handle = self
            .api
            .create_queue(&name)
            .await
            .map_err(QueueError::CreateFailed)?;
        info!(name = %handle.name, url = %handle.url, "Created test queue");
        Ok(&*self.handle.insert(handle))
    }

    /// Delete the held queue. The service keeps the name reserved for a
    /// while after deletion.
    pub async fn destroy_queue(&mut self) -> Result<(), QueueError> {
        let handle = self.handle.as_ref().ok_or(QueueError::NoQueueHeld)?;
        let status = self.api.delete_queue(&handle.url).await?;
        if is_error_call(status) {
            return Err(QueueError::DeleteFailed {
                name: handle.name.clone(),
                status,
            });
        }
        info!(name = %handle.name, "Destroyed test queue");
        self.handle = None;
        Ok(())
    }

    /// Send a message to the held queue.
    pub async fn send_message(&self, body: &str) -> Result<(), QueueError> {
        let handle = self.handle.as_ref().ok_or(QueueError::NoQueueHeld)?;
        Ok(self.api.send_message(&handle.url, body).await?)
    }

    /// Receive up to `max` messages from the held queue.
    pub async fn receive_messages(&self, max: i32) -> Result<Vec<ReceivedMessage>, QueueError> {
        let handle = self.handle.as_ref().ok_or(QueueError::NoQueueHeld)?;
        Ok(self.api.receive_messages(&handle.url, max).await?)
    }

    /// Run `body` against a freshly created queue, destroying the queue on
    /// every exit path. A body error takes precedence over a teardown error;
    /// a teardown failure after a failed body is logged and dropped.
    pub async fn scoped<T, E, F, Fut>(api: Arc<dyn SqsApi>, body: F) -> Result<T, E>
    where
        E: From<QueueError>,
        F: FnOnce(QueueHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut live = LiveQueue::new(api);
        let handle = live.create_queue().await.map_err(E::from)?.clone();
        let result = body(handle).await;
        let teardown = live.destroy_queue().await;
        match result {
            Ok(value) => teardown.map_err(E::from).map(|()| value),
            Err(err) => {
                if let Err(teardown_err) = teardown {
                    warn!(error = %teardown_err, "queue teardown failed after body error");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl LiveResource for LiveQueue {
    /// Queue URLs embed the queue name, so a listing plus substring match is
    /// enough for collision probing.
    async fn exists(&self, name: &str) -> Result<bool, ApiError> {
        let urls = self.api.list_queue_urls().await?;
        Ok(urls.iter().any(|url| url.contains(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Minimal in-process stand-in for the queue API.
    #[derive(Default)]
    struct FakeSqs {
        queues: Mutex<HashMap<String, VecDeque<String>>>,
        delete_status: Mutex<u16>,
    }

    impl FakeSqs {
        fn new() -> Self {
            Self {
                queues: Mutex::new(HashMap::new()),
                delete_status: Mutex::new(200),
            }
        }

        fn set_delete_status(&self, status: u16) {
            *self.delete_status.lock().unwrap() = status;
        }

        fn url_of(name: &str) -> String {
            format!("http://localhost:4566/000000000000/{name}")
        }
    }

    #[async_trait]
    impl SqsApi for FakeSqs {
        async fn create_queue(&self, name: &str) -> Result<QueueHandle, ApiError> {
            let url = Self::url_of(name);
            self.queues
                .lock()
                .unwrap()
                .insert(url.clone(), VecDeque::new());
            Ok(QueueHandle {
                name: name.to_string(),
                url,
            })
        }

        async fn delete_queue(&self, url: &str) -> Result<u16, ApiError> {
            let status = *self.delete_status.lock().unwrap();
            if status == 200 {
                self.queues.lock().unwrap().remove(url);
            }
            Ok(status)
        }

        async fn list_queue_urls(&self) -> Result<Vec<String>, ApiError> {
            Ok(self.queues.lock().unwrap().keys().cloned().collect())
        }

        async fn queue_arn(&self, url: &str) -> Result<String, ApiError> {
            let name = url.rsplit('/').next().unwrap_or_default();
            Ok(format!("arn:aws:sqs:us-east-1:000000000000:{name}"))
        }

        async fn set_queue_policy(&self, _url: &str, _policy: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn send_message(&self, url: &str, body: &str) -> Result<(), ApiError> {
            self.queues
                .lock()
                .unwrap()
                .get_mut(url)
                .ok_or_else(|| ApiError::new("queue does not exist"))?
                .push_back(body.to_string());
            Ok(())
        }

        async fn receive_messages(
            &self,
            url: &str,
            max: i32,
        ) -> Result<Vec<ReceivedMessage>, ApiError> {
            let mut queues = self.queues.lock().unwrap();
            let messages = queues
                .get_mut(url)
                .ok_or_else(|| ApiError::new("queue does not exist"))?;
            let mut out = Vec::new();
            for _ in 0..max {
                match messages.pop_front() {
                    Some(body) => out.push(ReceivedMessage {
                        body,
                        receipt_handle: format!("receipt-{}", out.len()),
                    }),
                    None => break,
                }
            }
            Ok(out)
        }

        async fn delete_message(&self, _url: &str, _receipt: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_populates_name_and_handle_together() {
        let mut live = LiveQueue::new(Arc::new(FakeSqs::new()));
        assert!(live.handle().is_none());

        live.create_queue().await.unwrap();
        let handle = live.handle().unwrap();
        assert!(handle.url.contains(&handle.name));

        live.destroy_queue().await.unwrap();
        assert!(live.handle().is_none());
    }

    #[tokio::test]
    async fn destroy_without_create_is_a_precondition_error() {
        let mut live = LiveQueue::new(Arc::new(FakeSqs::new()));
        assert!(matches!(
            live.destroy_queue().await,
            Err(QueueError::NoQueueHeld)
        ));
    }

    #[tokio::test]
    async fn destroy_surfaces_non_success_status() {
        let api = Arc::new(FakeSqs::new());
        let mut live = LiveQueue::new(api.clone());
        live.create_queue().await.unwrap();

        api.set_delete_status(400);
        match live.destroy_queue().await {
            Err(QueueError::DeleteFailed { status, .. }) => assert_eq!(status, 400),
            other => panic!("expected DeleteFailed, got {other:?}"),
        }
        // Handle stays held after a failed delete.
        assert!(live.handle().is_some());
    }

    #[tokio::test]
    async fn exists_matches_by_substring() {
        let api = Arc::new(FakeSqs::new());
        api.create_queue("test-1234567").await.unwrap();

        let live = LiveQueue::new(api);
        assert!(live.exists("test-1234567").await.unwrap());
        assert!(live.exists("1234").await.unwrap());
        assert!(!live.exists("test-7654321").await.unwrap());
    }

    #[tokio::test]
    async fn messages_round_trip_through_the_held_queue() {
        let mut live = LiveQueue::new(Arc::new(FakeSqs::new()));
        live.create_queue().await.unwrap();

        live.send_message("test text").await.unwrap();
        let messages = live.receive_messages(1).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "test text");

        live.destroy_queue().await.unwrap();
    }

    #[tokio::test]
    async fn scoped_tears_down_on_the_happy_path() {
        let api = Arc::new(FakeSqs::new());
        let url = LiveQueue::scoped(api.clone(), |queue| async move {
            Ok::<_, QueueError>(queue.url)
        })
        .await
        .unwrap();

        assert!(url.contains("test-"));
        assert!(api.list_queue_urls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scoped_tears_down_when_the_body_fails() {
        let api = Arc::new(FakeSqs::new());
        let result: Result<(), QueueError> = LiveQueue::scoped(api.clone(), |_queue| async move {
            Err(QueueError::NoQueueHeld)
        })
        .await;

        assert!(matches!(result, Err(QueueError::NoQueueHeld)));
        assert!(api.list_queue_urls().await.unwrap().is_empty());
    }
}
