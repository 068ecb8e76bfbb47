//! DynamoDB access layer seam

use async_trait::async_trait;
use awslive_core::ApiError;

use crate::schema::{Item, TableSpec, TableStatus};

/// The slice of the DynamoDB resource-management API the lifecycle needs.
#[async_trait]
pub trait DynamoApi: Send + Sync {
    /// Create a table from `spec`, returning the status the service reports
    /// for the new table (normally `Creating`).
    async fn create_table(&self, name: &str, spec: &TableSpec) -> Result<TableStatus, ApiError>;

    /// Current status of the table; `Deleted` if the service does not know
    /// the name.
    async fn table_status(&self, name: &str) -> Result<TableStatus, ApiError>;

    /// Delete the table, returning the call status.
    async fn delete_table(&self, name: &str) -> Result<u16, ApiError>;

    /// Names of all visible tables.
    async fn list_table_names(&self) -> Result<Vec<String>, ApiError>;

    async fn put_item(&self, name: &str, item: Item) -> Result<(), ApiError>;

    async fn get_item(&self, name: &str, key: Item) -> Result<Option<Item>, ApiError>;
}
