//! Remote row store abstraction.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod rest;

pub use memory::{MemoryStore, StoreRequest};

#[cfg(not(target_arch = "wasm32"))]
pub use rest::RestStore;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Row not found: {0}")]
    NotFound(String),
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A row to insert into one of the feature tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRow {
    /// Encoded geometry, e.g. `POINT(3 4)`.
    pub shape: String,
    /// Free text or JSON metadata.
    pub meta: String,
    pub project_id: i64,
    pub profile_id: String,
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    pub shape: String,
    pub meta: String,
    pub project_id: i64,
    pub profile_id: String,
}

impl Row {
    /// Attach an id to a new row.
    pub fn from_new(id: i64, row: NewRow) -> Self {
        Self {
            id,
            shape: row.shape,
            meta: row.meta,
            project_id: row.project_id,
            profile_id: row.profile_id,
        }
    }

    /// Whether this row satisfies an equality filter. Unknown columns never match.
    pub fn matches(&self, filter: &Filter) -> bool {
        let value = filter.value.as_str();
        match filter.column.as_str() {
            "id" => value.parse::<i64>().is_ok_and(|id| id == self.id),
            "project_id" => value.parse::<i64>().is_ok_and(|id| id == self.project_id),
            "profile_id" => self.profile_id == value,
            "shape" => self.shape == value,
            "meta" => self.meta == value,
            _ => false,
        }
    }
}

/// Column equality filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }
}

/// Trait for remote row stores.
///
/// Timeouts and retries belong to the implementation; callers treat every
/// error as final for that attempt.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait RemoteStore: Send + Sync {
    /// Insert one row and return it as stored.
    fn insert(&self, table: &str, row: &NewRow) -> BoxFuture<'_, StoreResult<Row>>;

    /// Delete the row with `id`. Deleting a missing row succeeds.
    fn delete(&self, table: &str, id: i64) -> BoxFuture<'_, StoreResult<()>>;

    /// Rows matching every filter.
    fn select(&self, table: &str, filters: &[Filter]) -> BoxFuture<'_, StoreResult<Vec<Row>>>;
}

/// Trait for remote row stores (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait RemoteStore {
    /// Insert one row and return it as stored.
    fn insert(&self, table: &str, row: &NewRow) -> BoxFuture<'_, StoreResult<Row>>;

    /// Delete the row with `id`. Deleting a missing row succeeds.
    fn delete(&self, table: &str, id: i64) -> BoxFuture<'_, StoreResult<()>>;

    /// Rows matching every filter.
    fn select(&self, table: &str, filters: &[Filter]) -> BoxFuture<'_, StoreResult<Vec<Row>>>;
}
