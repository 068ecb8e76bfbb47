//! Table lifecycle

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use awslive_core::{is_error_call, ApiError, LiveResource};

use crate::api::DynamoApi;
use crate::schema::{Item, TableSpec, TableStatus};

/// How often the table status is re-fetched while waiting on a transition.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a status transition may take before the lifecycle gives up.
pub const DEFAULT_POLL_DEADLINE: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum TableError {
    #[error("DynamoDB could not create table")]
    CreateFailed(#[source] ApiError),
    #[error("DynamoDB could not delete table {name}: status {status}")]
    DeleteFailed { name: String, status: u16 },
    #[error("no table is currently held")]
    NoTableHeld,
    #[error("table {name} is in unhandled status {status}")]
    UnexpectedStatus { name: String, status: TableStatus },
    #[error("table {name} did not become active in time")]
    CreateTimeout { name: String },
    #[error("table {name} did not settle for deletion in time")]
    DestroyTimeout { name: String },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Create/use/destroy wrapper around one test table.
///
/// The table configuration is fixed at construction and reused verbatim for
/// the remote create call. Creation waits for the table to leave `CREATING`;
/// destruction waits for any in-flight `CREATING`/`UPDATING` transition to
/// settle before issuing the delete.
pub struct LiveTable {
    api: Arc<dyn DynamoApi>,
    spec: TableSpec,
    name: Option<String>,
    poll_interval: Duration,
    poll_deadline: Duration,
}

impl LiveTable {
    /// Lifecycle with the default table configuration.
    pub fn new(api: Arc<dyn DynamoApi>) -> Self {
        Self::with_spec(api, TableSpec::default())
    }

    pub fn with_spec(api: Arc<dyn DynamoApi>, spec: TableSpec) -> Self {
        Self {
            api,
            spec,
            name: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: DEFAULT_POLL_DEADLINE,
        }
    }

    /// Override the status polling cadence and deadline.
    pub fn polling(mut self, interval: Duration, deadline: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_deadline = deadline;
        self
    }

    /// The held table name, if one is live.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn api(&self) -> &Arc<dyn DynamoApi> {
        &self.api
    }

    /// Generate a free name, create the table, and wait until it is no
    /// longer `CREATING`.
    pub async fn create_table(&mut self) -> Result<String, TableError> {
        let name = self.generate_name().await?;
        let mut status = self
            .api
            .create_table(&name, &self.spec)
            .await
            .map_err(TableError::CreateFailed)?;
        info!(name = %name, status = %status, "Created test table");
        self.name = Some(name.clone());

        let start = Instant::now();
        while status == TableStatus::Creating {
            if start.elapsed() >= self.poll_deadline {
                return Err(TableError::CreateTimeout { name });
            }
            sleep(self.poll_interval).await;
            status = self.api.table_status(&name).await?;
            debug!(name = %name, status = %status, "Waiting for table to become active");
        }
        Ok(name)
    }

    /// Delete the held table once it is in a deletable state.
    ///
    /// A table the service already forgot is treated as destroyed; any
    /// status outside `CREATING`/`UPDATING`/`ACTIVE`/`DELETED` is refused.
    pub async fn destroy_table(&mut self) -> Result<(), TableError> {
        let name = self.name.clone().ok_or(TableError::NoTableHeld)?;

        let start = Instant::now();
        let mut status = self.api.table_status(&name).await?;
        while matches!(status, TableStatus::Creating | TableStatus::Updating) {
            if start.elapsed() >= self.poll_deadline {
                return Err(TableError::DestroyTimeout { name });
            }
            sleep(self.poll_interval).await;
            status = self.api.table_status(&name).await?;
            debug!(name = %name, status = %status, "Waiting for table to settle before delete");
        }

        match status {
            TableStatus::Active => {
                let call_status = self.api.delete_table(&name).await?;
                if is_error_call(call_status) {
                    return Err(TableError::DeleteFailed {
                        name,
                        status: call_status,
                    });
                }
                info!(name = %name, "Destroyed test table");
                self.name = None;
                Ok(())
            }
            TableStatus::Deleted => {
                info!(name = %name, "Test table already gone");
                self.name = None;
                Ok(())
            }
            status => Err(TableError::UnexpectedStatus { name, status }),
        }
    }

    /// Put an item into the held table.
    pub async fn put_item(&self, item: Item) -> Result<(), TableError> {
        let name = self.name.as_deref().ok_or(TableError::NoTableHeld)?;
        Ok(self.api.put_item(name, item).await?)
    }

    /// Fetch an item from the held table by its full key.
    pub async fn get_item(&self, key: Item) -> Result<Option<Item>, TableError> {
        let name = self.name.as_deref().ok_or(TableError::NoTableHeld)?;
        Ok(self.api.get_item(name, key).await?)
    }

    /// Run `body` against a freshly created table, destroying the table on
    /// every exit path. A body error takes precedence over a teardown error;
    /// a teardown failure after a failed body is logged and dropped.
    pub async fn scoped<T, E, F, Fut>(
        api: Arc<dyn DynamoApi>,
        spec: TableSpec,
        body: F,
    ) -> Result<T, E>
    where
        E: From<TableError>,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut live = LiveTable::with_spec(api, spec);
        let name = live.create_table().await.map_err(E::from)?;
        let result = body(name).await;
        let teardown = live.destroy_table().await;
        match result {
            Ok(value) => teardown.map_err(E::from).map(|()| value),
            Err(err) => {
                if let Err(teardown_err) = teardown {
                    warn!(error = %teardown_err, "table teardown failed after body error");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl LiveResource for LiveTable {
    async fn exists(&self, name: &str) -> Result<bool, ApiError> {
        let names = self.api.list_table_names().await?;
        Ok(names.iter().any(|table| table.contains(name)))
    }
}
