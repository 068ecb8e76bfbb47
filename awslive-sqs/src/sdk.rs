//! `SqsApi` over the real service

use async_trait::async_trait;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use awslive_core::ApiError;

use crate::api::{QueueHandle, ReceivedMessage, SqsApi};

/// SQS access through the official SDK client.
pub struct SdkSqs {
    client: Client,
}

impl SdkSqs {
    /// Build a client from the shared SDK configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Build a client with region and/or endpoint overrides, inheriting
    /// everything else from the shared SDK configuration.
    pub fn with_overrides(
        config: &aws_config::SdkConfig,
        region: Option<String>,
        endpoint_url: Option<String>,
    ) -> Self {
        let mut builder = aws_sdk_sqs::config::Builder::from(config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_sqs::config::Region::new(region));
        }
        if let Some(endpoint_url) = endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// The underlying SDK client, for operations outside the lifecycle.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SqsApi for SdkSqs {
    async fn create_queue(&self, name: &str) -> Result<QueueHandle, ApiError> {
        let out = self
            .client
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| ApiError::with_source("CreateQueue call failed", e))?;
        let url = out
            .queue_url()
            .ok_or_else(|| ApiError::new("CreateQueue response missing queue URL"))?
            .to_string();
        Ok(QueueHandle {
            name: name.to_string(),
            url,
        })
    }

    async fn delete_queue(&self, url: &str) -> Result<u16, ApiError> {
        match self.client.delete_queue().queue_url(url).send().await {
            Ok(_) => Ok(200),
            // A rejected call still carries a status the lifecycle inspects;
            // only a call that never completed is an access-layer error.
            Err(err) => match err.raw_response().map(|r| r.status().as_u16()) {
                Some(status) => Ok(status),
                None => Err(ApiError::with_source("DeleteQueue call failed", err)),
            },
        }
    }

    async fn list_queue_urls(&self) -> Result<Vec<String>, ApiError> {
        let out = self
            .client
            .list_queues()
            .send()
            .await
            .map_err(|e| ApiError::with_source("ListQueues call failed", e))?;
        Ok(out.queue_urls().to_vec())
    }

    async fn queue_arn(&self, url: &str) -> Result<String, ApiError> {
        let out = self
            .client
            .get_queue_attributes()
            .queue_url(url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .map_err(|e| ApiError::with_source("GetQueueAttributes call failed", e))?;
        out.attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::QueueArn))
            .map(String::from)
            .ok_or_else(|| ApiError::new("queue attributes missing QueueArn"))
    }

    async fn set_queue_policy(&self, url: &str, policy: &str) -> Result<(), ApiError> {
        self.client
            .set_queue_attributes()
            .queue_url(url)
            .attributes(QueueAttributeName::Policy, policy)
            .send()
            .await
            .map_err(|e| ApiError::with_source("SetQueueAttributes call failed", e))?;
        Ok(())
    }

    async fn send_message(&self, url: &str, body: &str) -> Result<(), ApiError> {
        self.client
            .send_message()
            .queue_url(url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| ApiError::with_source("SendMessage call failed", e))?;
        Ok(())
    }

    async fn receive_messages(
        &self,
        url: &str,
        max: i32,
    ) -> Result<Vec<ReceivedMessage>, ApiError> {
        let out = self
            .client
            .receive_message()
            .queue_url(url)
            .max_number_of_messages(max.clamp(1, 10))
            .send()
            .await
            .map_err(|e| ApiError::with_source("ReceiveMessage call failed", e))?;
        Ok(out
            .messages()
            .iter()
            .map(|m| ReceivedMessage {
                body: m.body().unwrap_or_default().to_string(),
                receipt_handle: m.receipt_handle().unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn delete_message(&self, url: &str, receipt_handle: &str) -> Result<(), ApiError> {
        self.client
            .delete_message()
            .queue_url(url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| ApiError::with_source("DeleteMessage call failed", e))?;
        Ok(())
    }
}
