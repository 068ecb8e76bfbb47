//! `SnsApi` over the real service

use async_trait::async_trait;
use aws_sdk_sns::Client;
use awslive_core::ApiError;

use crate::api::{SnsApi, TopicHandle};

/// SNS access through the official SDK client.
pub struct SdkSns {
    client: Client,
}

impl SdkSns {
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
        let mut builder = aws_sdk_sns::config::Builder::from(config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_sns::config::Region::new(region));
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
impl SnsApi for SdkSns {
    async fn create_topic(&self, name: &str) -> Result<TopicHandle, ApiError> {
        let out = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| ApiError::with_source("CreateTopic call failed", e))?;
        let arn = out
            .topic_arn()
            .ok_or_else(|| ApiError::new("CreateTopic response missing topic ARN"))?
            .to_string();
        Ok(TopicHandle {
            name: name.to_string(),
            arn,
        })
    }

    async fn delete_topic(&self, arn: &str) -> Result<u16, ApiError> {
        match self.client.delete_topic().topic_arn(arn).send().await {
            Ok(_) => Ok(200),
            Err(err) => match err.raw_response().map(|r| r.status().as_u16()) {
                Some(status) => Ok(status),
                None => Err(ApiError::with_source("DeleteTopic call failed", err)),
            },
        }
    }

    async fn list_topic_arns(&self) -> Result<Vec<String>, ApiError> {
        let out = self
            .client
            .list_topics()
            .send()
            .await
            .map_err(|e| ApiError::with_source("ListTopics call failed", e))?;
        Ok(out
            .topics()
            .iter()
            .filter_map(|t| t.topic_arn().map(String::from))
            .collect())
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<String, ApiError> {
        let out = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| ApiError::with_source("Subscribe call failed", e))?;
        out.subscription_arn()
            .map(String::from)
            .ok_or_else(|| ApiError::new("Subscribe response missing subscription ARN"))
    }

    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, ApiError> {
        let out = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| ApiError::with_source("Publish call failed", e))?;
        out.message_id()
            .map(String::from)
            .ok_or_else(|| ApiError::new("Publish response missing message id"))
    }
}
