//! Leftover test resource removal
//!
//! A crashed test run leaks its resources: teardown never fired, and the
//! remote side keeps them alive (and billed) indefinitely. This module
//! sweeps every queue and topic whose identifier ends in the generated
//! `test-<digits>` pattern. It is a standalone maintenance operation, not
//! part of any single test's lifecycle.

use thiserror::Error;
use tracing::info;

use awslive_core::{is_error_call, is_test_resource, ApiError};
use awslive_sns::SnsApi;
use awslive_sqs::SqsApi;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("could not delete queue {url}: status {status}")]
    QueueDelete { url: String, status: u16 },
    #[error("could not delete topic {arn}: status {status}")]
    TopicDelete { arn: String, status: u16 },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Delete every visible queue that matches the test pattern, returning how
/// many were removed. A failed delete aborts the sweep, but the running
/// count is still logged before the error propagates.
pub async fn clean_test_queues(api: &dyn SqsApi) -> Result<usize, CleanupError> {
    let urls = api.list_queue_urls().await?;
    let mut deleted = 0;
    let mut failure = None;
    for url in urls {
        if !is_test_resource(&url) {
            continue;
        }
        match api.delete_queue(&url).await {
            Ok(status) if is_error_call(status) => {
                failure = Some(CleanupError::QueueDelete { url, status });
                break;
            }
            Ok(_) => deleted += 1,
            Err(err) => {
                failure = Some(err.into());
                break;
            }
        }
    }
    info!(count = deleted, "deleted leftover test queues");
    match failure {
        Some(err) => Err(err),
        None => Ok(deleted),
    }
}

/// Delete every visible topic that matches the test pattern; same reporting
/// contract as [`clean_test_queues`].
pub async fn clean_test_topics(api: &dyn SnsApi) -> Result<usize, CleanupError> {
    let arns = api.list_topic_arns().await?;
    let mut deleted = 0;
    let mut failure = None;
    for arn in arns {
        if !is_test_resource(&arn) {
            continue;
        }
        match api.delete_topic(&arn).await {
            Ok(status) if is_error_call(status) => {
                failure = Some(CleanupError::TopicDelete { arn, status });
                break;
            }
            Ok(_) => deleted += 1,
            Err(err) => {
                failure = Some(err.into());
                break;
            }
        }
    }
    info!(count = deleted, "deleted leftover test topics");
    match failure {
        Some(err) => Err(err),
        None => Ok(deleted),
    }
}

/// Sweep queues, then topics. Both sweeps run even if the first fails; the
/// first failure is the one reported.
pub async fn cleanup(sqs: &dyn SqsApi, sns: &dyn SnsApi) -> Result<(), CleanupError> {
    let queues = clean_test_queues(sqs).await;
    let topics = clean_test_topics(sns).await;
    queues?;
    topics?;
    Ok(())
}
