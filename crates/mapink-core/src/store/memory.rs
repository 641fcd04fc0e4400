//! In-memory store implementation.

use super::{BoxFuture, Filter, NewRow, RemoteStore, Row, StoreError, StoreResult};
use crate::geo::Shape;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// A request observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    Insert { table: String, row: NewRow },
    Delete { table: String, id: i64 },
    Select { table: String, filters: Vec<Filter> },
}

/// In-memory store for testing and offline replays.
///
/// Ids are allocated from one counter shared by all tables. Tables can be
/// denied to emulate row-level security rejecting writes.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    next_id: AtomicI64,
    denied: RwLock<HashSet<String>>,
    requests: RwLock<Vec<StoreRequest>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            denied: RwLock::new(HashSet::new()),
            requests: RwLock::new(Vec::new()),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Other(format!("Lock error: {}", e))
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write to `table` from now on.
    pub fn deny_table(&self, table: &str) {
        if let Ok(mut denied) = self.denied.write() {
            denied.insert(table.to_string());
        }
    }

    /// Requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.requests.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Current rows of `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
            .unwrap_or_default()
    }

    /// Insert a row directly, bypassing policy and the request log.
    pub fn seed(&self, table: &str, row: NewRow) -> Row {
        let row = Row::from_new(self.next_id.fetch_add(1, Ordering::Relaxed), row);
        if let Ok(mut tables) = self.tables.write() {
            tables.entry(table.to_string()).or_default().push(row.clone());
        }
        row
    }

    fn record(&self, request: StoreRequest) -> StoreResult<()> {
        self.requests.write().map_err(lock_error)?.push(request);
        Ok(())
    }

    fn check_write(&self, table: &str) -> StoreResult<()> {
        let denied = self.denied.read().map_err(lock_error)?;
        if denied.contains(table) {
            return Err(StoreError::Rejected {
                status: 403,
                message: format!("permission denied for table {}", table),
            });
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn insert(&self, table: &str, row: &NewRow) -> BoxFuture<'_, StoreResult<Row>> {
        let table = table.to_string();
        let row = row.clone();
        Box::pin(async move {
            self.record(StoreRequest::Insert {
                table: table.clone(),
                row: row.clone(),
            })?;
            self.check_write(&table)?;
            row.shape.parse::<Shape>().map_err(|e| StoreError::Rejected {
                status: 400,
                message: format!("invalid geometry: {}", e),
            })?;

            let stored = Row::from_new(self.next_id.fetch_add(1, Ordering::Relaxed), row);
            let mut tables = self.tables.write().map_err(lock_error)?;
            tables.entry(table).or_default().push(stored.clone());
            Ok(stored)
        })
    }

    fn delete(&self, table: &str, id: i64) -> BoxFuture<'_, StoreResult<()>> {
        let table = table.to_string();
        Box::pin(async move {
            self.record(StoreRequest::Delete {
                table: table.clone(),
                id,
            })?;
            self.check_write(&table)?;

            let mut tables = self.tables.write().map_err(lock_error)?;
            if let Some(rows) = tables.get_mut(&table) {
                rows.retain(|row| row.id != id);
            }
            Ok(())
        })
    }

    fn select(&self, table: &str, filters: &[Filter]) -> BoxFuture<'_, StoreResult<Vec<Row>>> {
        let table = table.to_string();
        let filters = filters.to_vec();
        Box::pin(async move {
            self.record(StoreRequest::Select {
                table: table.clone(),
                filters: filters.clone(),
            })?;

            let tables = self.tables.read().map_err(lock_error)?;
            Ok(tables
                .get(&table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| filters.iter().all(|filter| row.matches(filter)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }
}
