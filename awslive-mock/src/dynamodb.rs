//! In-memory DynamoDB backend

use std::sync::atomic::{AtomicU16, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use awslive_core::ApiError;
use awslive_dynamodb::{DynamoApi, Item, TableSpec, TableStatus};

struct StoredTable {
    spec: TableSpec,
    status: TableStatus,
    probes_before_active: u32,
    items: Vec<Item>,
}

/// Process-local table store.
///
/// A new table reports `CREATING` for a configurable number of status probes
/// before promoting itself to `ACTIVE`, so lifecycle poll loops are actually
/// driven through their waiting state.
pub struct MemoryDynamo {
    tables: DashMap<String, StoredTable>,
    probes_before_active: u32,
    delete_status: AtomicU16,
}

impl Default for MemoryDynamo {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDynamo {
    /// Tables become active on the first status probe.
    pub fn new() -> Self {
        Self::with_creation_probes(0)
    }

    /// Tables stay `CREATING` for the given number of status probes.
    pub fn with_creation_probes(probes_before_active: u32) -> Self {
        Self {
            tables: DashMap::new(),
            probes_before_active,
            delete_status: AtomicU16::new(200),
        }
    }

    /// Status every subsequent `delete_table` call reports.
    pub fn set_delete_status(&self, status: u16) {
        self.delete_status.store(status, Ordering::SeqCst);
    }

    /// Pin a table to a status (for exercising unhandled-state paths).
    pub fn force_status(&self, name: &str, status: TableStatus) {
        if let Some(mut table) = self.tables.get_mut(name) {
            table.status = status;
        }
    }

    /// Remove a table behind the lifecycle's back.
    pub fn drop_table(&self, name: &str) {
        self.tables.remove(name);
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// The configuration a table was created with.
    pub fn spec_of(&self, name: &str) -> Option<TableSpec> {
        self.tables.get(name).map(|t| t.spec.clone())
    }

    fn key_names(spec: &TableSpec) -> Vec<String> {
        spec.key_schema
            .iter()
            .map(|entry| entry.attribute_name.clone())
            .collect()
    }
}

#[async_trait]
impl DynamoApi for MemoryDynamo {
    async fn create_table(&self, name: &str, spec: &TableSpec) -> Result<TableStatus, ApiError> {
        if self.tables.contains_key(name) {
            return Err(ApiError::new(format!("table already exists: {name}")));
        }

        info!(name = %name, "Creating table");
        self.tables.insert(
            name.to_string(),
            StoredTable {
                spec: spec.clone(),
                status: TableStatus::Creating,
                probes_before_active: self.probes_before_active,
                items: Vec::new(),
            },
        );
        Ok(TableStatus::Creating)
    }

    async fn table_status(&self, name: &str) -> Result<TableStatus, ApiError> {
        let Some(mut table) = self.tables.get_mut(name) else {
            return Ok(TableStatus::Deleted);
        };
        if table.status == TableStatus::Creating {
            if table.probes_before_active == 0 {
                table.status = TableStatus::Active;
            } else {
                table.probes_before_active -= 1;
            }
        }
        Ok(table.status.clone())
    }

    async fn delete_table(&self, name: &str) -> Result<u16, ApiError> {
        let status = self.delete_status.load(Ordering::SeqCst);
        if status == 200 {
            info!(name = %name, "Deleting table");
            self.tables.remove(name);
        }
        Ok(status)
    }

    async fn list_table_names(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.tables.iter().map(|t| t.key().clone()).collect())
    }

    async fn put_item(&self, name: &str, item: Item) -> Result<(), ApiError> {
        let mut table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| ApiError::new(format!("table does not exist: {name}")))?;

        // Same key, same item: replace.
        let key_names = Self::key_names(&table.spec);
        table
            .items
            .retain(|existing| !key_names.iter().all(|k| existing.get(k) == item.get(k)));
        table.items.push(item);
        Ok(())
    }

    async fn get_item(&self, name: &str, key: Item) -> Result<Option<Item>, ApiError> {
        let table = self
            .tables
            .get(name)
            .ok_or_else(|| ApiError::new(format!("table does not exist: {name}")))?;
        Ok(table
            .items
            .iter()
            .find(|item| key.iter().all(|(k, v)| item.get(k) == Some(v)))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awslive_dynamodb::AttrValue;

    #[tokio::test]
    async fn tables_stay_creating_for_the_configured_probes() {
        let dynamodb = MemoryDynamo::with_creation_probes(2);
        dynamodb
            .create_table("test-1234567", &TableSpec::default())
            .await
            .unwrap();

        assert_eq!(
            dynamodb.table_status("test-1234567").await.unwrap(),
            TableStatus::Creating
        );
        assert_eq!(
            dynamodb.table_status("test-1234567").await.unwrap(),
            TableStatus::Creating
        );
        assert_eq!(
            dynamodb.table_status("test-1234567").await.unwrap(),
            TableStatus::Active
        );
    }

    #[tokio::test]
    async fn unknown_tables_report_deleted() {
        let dynamodb = MemoryDynamo::new();
        assert_eq!(
            dynamodb.table_status("test-7654321").await.unwrap(),
            TableStatus::Deleted
        );
    }

    #[tokio::test]
    async fn put_item_replaces_on_matching_key() {
        let dynamodb = MemoryDynamo::new();
        dynamodb
            .create_table("test-1234567", &TableSpec::default())
            .await
            .unwrap();

        let mut item = Item::new();
        item.insert("string_key".to_string(), AttrValue::string("a"));
        item.insert("numeric_key".to_string(), AttrValue::number(1));
        item.insert("payload".to_string(), AttrValue::string("old"));
        dynamodb.put_item("test-1234567", item.clone()).await.unwrap();

        item.insert("payload".to_string(), AttrValue::string("new"));
        dynamodb.put_item("test-1234567", item).await.unwrap();

        let mut key = Item::new();
        key.insert("string_key".to_string(), AttrValue::string("a"));
        key.insert("numeric_key".to_string(), AttrValue::number(1));
        let fetched = dynamodb.get_item("test-1234567", key).await.unwrap().unwrap();
        assert_eq!(fetched.get("payload"), Some(&AttrValue::string("new")));
    }
}
