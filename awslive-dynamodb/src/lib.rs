//! Ephemeral DynamoDB test tables
//!
//! `LiveTable` wraps one DynamoDB table in a create/use/destroy lifecycle.
//! Table creation and deletion are not instantaneous on the remote side, so
//! both directions poll the table status (bounded by a deadline) before
//! proceeding.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use awslive_dynamodb::{LiveTable, ScalarType, SdkDynamo, TableSpec};
//!
//! # async fn example() -> Result<(), awslive_dynamodb::TableError> {
//! let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//! let api = Arc::new(SdkDynamo::new(&config));
//!
//! let spec = TableSpec::with_keys("device", ScalarType::S, "reading", ScalarType::N, 1, 1);
//! let mut live = LiveTable::with_spec(api, spec);
//! let name = live.create_table().await?;
//! // ... put_item / get_item against `name` ...
//! # let _ = name;
//! live.destroy_table().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod schema;
pub mod sdk;
pub mod table;

pub use api::DynamoApi;
pub use schema::{
    AttrValue, AttributeSpec, Item, KeyRole, KeySchemaEntry, ScalarType, TableSpec, TableStatus,
    Throughput,
};
pub use sdk::SdkDynamo;
pub use table::{LiveTable, TableError};
