//! `DynamoApi` over the real service

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use awslive_core::ApiError;

use crate::api::DynamoApi;
use crate::schema::{AttrValue, Item, KeyRole, ScalarType, TableSpec, TableStatus};

/// DynamoDB access through the official SDK client.
pub struct SdkDynamo {
    client: Client,
}

impl SdkDynamo {
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
        let mut builder = aws_sdk_dynamodb::config::Builder::from(config);
        if let Some(region) = region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
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

fn key_schema(spec: &TableSpec) -> Result<Vec<KeySchemaElement>, ApiError> {
    spec.key_schema
        .iter()
        .map(|entry| {
            KeySchemaElement::builder()
                .attribute_name(&entry.attribute_name)
                .key_type(match entry.role {
                    KeyRole::Partition => KeyType::Hash,
                    KeyRole::Sort => KeyType::Range,
                })
                .build()
                .map_err(|e| ApiError::with_source("invalid key schema entry", e))
        })
        .collect()
}

fn attribute_definitions(spec: &TableSpec) -> Result<Vec<AttributeDefinition>, ApiError> {
    spec.attributes
        .iter()
        .map(|attribute| {
            AttributeDefinition::builder()
                .attribute_name(&attribute.attribute_name)
                .attribute_type(match attribute.scalar_type {
                    ScalarType::S => ScalarAttributeType::S,
                    ScalarType::N => ScalarAttributeType::N,
                    ScalarType::B => ScalarAttributeType::B,
                })
                .build()
                .map_err(|e| ApiError::with_source("invalid attribute definition", e))
        })
        .collect()
}

fn throughput(spec: &TableSpec) -> Result<ProvisionedThroughput, ApiError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(spec.throughput.read_capacity_units)
        .write_capacity_units(spec.throughput.write_capacity_units)
        .build()
        .map_err(|e| ApiError::with_source("invalid provisioned throughput", e))
}

fn from_sdk_status(status: &aws_sdk_dynamodb::types::TableStatus) -> TableStatus {
    use aws_sdk_dynamodb::types::TableStatus as Sdk;
    match status {
        Sdk::Creating => TableStatus::Creating,
        Sdk::Updating => TableStatus::Updating,
        Sdk::Active => TableStatus::Active,
        Sdk::Deleting => TableStatus::Deleting,
        other => TableStatus::Other(other.as_str().to_string()),
    }
}

fn to_sdk_item(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| {
            let value = match value {
                AttrValue::S(s) => AttributeValue::S(s),
                AttrValue::N(n) => AttributeValue::N(n),
                AttrValue::Bool(b) => AttributeValue::Bool(b),
            };
            (name, value)
        })
        .collect()
}

fn from_sdk_item(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .filter_map(|(name, value)| {
            let value = match value {
                AttributeValue::S(s) => AttrValue::S(s.clone()),
                AttributeValue::N(n) => AttrValue::N(n.clone()),
                AttributeValue::Bool(b) => AttrValue::Bool(*b),
                // Shapes the test tables never write are dropped.
                _ => return None,
            };
            Some((name.clone(), value))
        })
        .collect()
}

#[async_trait]
impl DynamoApi for SdkDynamo {
    async fn create_table(&self, name: &str, spec: &TableSpec) -> Result<TableStatus, ApiError> {
        let out = self
            .client
            .create_table()
            .table_name(name)
            .set_key_schema(Some(key_schema(spec)?))
            .set_attribute_definitions(Some(attribute_definitions(spec)?))
            .provisioned_throughput(throughput(spec)?)
            .send()
            .await
            .map_err(|e| ApiError::with_source("CreateTable call failed", e))?;
        out.table_description()
            .and_then(|description| description.table_status())
            .map(from_sdk_status)
            .ok_or_else(|| ApiError::new("CreateTable response missing table status"))
    }

    async fn table_status(&self, name: &str) -> Result<TableStatus, ApiError> {
        match self.client.describe_table().table_name(name).send().await {
            Ok(out) => out
                .table()
                .and_then(|table| table.table_status())
                .map(from_sdk_status)
                .ok_or_else(|| ApiError::new("DescribeTable response missing table status")),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_resource_not_found_exception())
                    .unwrap_or(false);
                if not_found {
                    Ok(TableStatus::Deleted)
                } else {
                    Err(ApiError::with_source("DescribeTable call failed", err))
                }
            }
        }
    }

    async fn delete_table(&self, name: &str) -> Result<u16, ApiError> {
        match self.client.delete_table().table_name(name).send().await {
            Ok(_) => Ok(200),
            Err(err) => match err.raw_response().map(|r| r.status().as_u16()) {
                Some(status) => Ok(status),
                None => Err(ApiError::with_source("DeleteTable call failed", err)),
            },
        }
    }

    async fn list_table_names(&self) -> Result<Vec<String>, ApiError> {
        let out = self
            .client
            .list_tables()
            .send()
            .await
            .map_err(|e| ApiError::with_source("ListTables call failed", e))?;
        Ok(out.table_names().to_vec())
    }

    async fn put_item(&self, name: &str, item: Item) -> Result<(), ApiError> {
        self.client
            .put_item()
            .table_name(name)
            .set_item(Some(to_sdk_item(item)))
            .send()
            .await
            .map_err(|e| ApiError::with_source("PutItem call failed", e))?;
        Ok(())
    }

    async fn get_item(&self, name: &str, key: Item) -> Result<Option<Item>, ApiError> {
        let out = self
            .client
            .get_item()
            .table_name(name)
            .set_key(Some(to_sdk_item(key)))
            .send()
            .await
            .map_err(|e| ApiError::with_source("GetItem call failed", e))?;
        Ok(out.item().map(from_sdk_item))
    }
}
