//! Dataset registry.
//!
//! Maps dataset ids to immutable tables plus lineage metadata. Entries are
//! never mutated or removed once registered.
//!
//! ```text
//! sales ──clean──▶ sales_cleaned_1 ──clean──▶ sales_cleaned_2
//!   └─────────────────clean──────────────────▶ sales_cleaned_3
//! ```
//!
//! Cleaned ids take the lineage root's name and that lineage's next counter
//! value. The suffix counts cleanings performed anywhere in the lineage, not
//! the depth of the chain: re-cleaning the root after two cleanings yields
//! `_cleaned_3`, never a second `_cleaned_1`. Minting and registration happen
//! while holding the lineage's own mutex, so two concurrent cleanings of the
//! same lineage never produce the same id.

use crate::error::{CleaningError, Result};
use crate::table::Table;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Metadata kept alongside each registered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    /// Id of the original upload this dataset descends from (itself for uploads).
    pub root_id: String,
    /// Dataset this one was derived from, `None` for uploads.
    pub parent_id: Option<String>,
    pub is_cleaned: bool,
    pub rows: usize,
    pub columns: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DatasetEntry {
    table: Arc<Table>,
    info: DatasetInfo,
}

/// Thread-safe store of datasets keyed by id.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    entries: RwLock<HashMap<String, DatasetEntry>>,
    lineages: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
    next_upload: Mutex<u64>,
}

static_assertions::assert_impl_all!(DatasetRegistry: Send, Sync);

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn upload_info(id: &str, table: &Table) -> DatasetInfo {
        DatasetInfo {
            id: id.to_string(),
            root_id: id.to_string(),
            parent_id: None,
            is_cleaned: false,
            rows: table.row_count(),
            columns: table.column_count(),
            created_at: Utc::now(),
        }
    }

    /// Register an upload under a freshly minted `dataset_{n}` id.
    pub fn put(&self, table: Table) -> String {
        let mut counter = self.next_upload.lock();
        let mut entries = self.entries.write();
        let id = loop {
            *counter += 1;
            let candidate = format!("dataset_{}", *counter);
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };

        let info = Self::upload_info(&id, &table);
        entries.insert(
            id.clone(),
            DatasetEntry {
                table: Arc::new(table),
                info,
            },
        );
        debug!("Registered upload '{}'", id);
        id
    }

    /// Register an upload under a caller-chosen id.
    pub fn insert(&self, id: impl Into<String>, table: Table) -> Result<String> {
        let id = id.into();
        if id.is_empty() {
            return Err(CleaningError::InvalidConfig(
                "dataset id must not be empty".to_string(),
            ));
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&id) {
            return Err(CleaningError::AlreadyExists(id));
        }
        let info = Self::upload_info(&id, &table);
        entries.insert(
            id.clone(),
            DatasetEntry {
                table: Arc::new(table),
                info,
            },
        );
        debug!("Registered upload '{}'", id);
        Ok(id)
    }

    /// Look up a table.
    pub fn get(&self, id: &str) -> Result<Arc<Table>> {
        self.entries
            .read()
            .get(id)
            .map(|entry| Arc::clone(&entry.table))
            .ok_or_else(|| CleaningError::NotFound(id.to_string()))
    }

    /// Look up a dataset's metadata.
    pub fn info(&self, id: &str) -> Result<DatasetInfo> {
        self.entries
            .read()
            .get(id)
            .map(|entry| entry.info.clone())
            .ok_or_else(|| CleaningError::NotFound(id.to_string()))
    }

    /// Register a table derived from `parent_id`, returning its new id.
    pub fn put_derived(&self, parent_id: &str, table: Table) -> Result<String> {
        let root_id = self.info(parent_id)?.root_id;

        let lineage = Arc::clone(self.lineages.lock().entry(root_id.clone()).or_default());
        let mut counter = lineage.lock();

        let mut entries = self.entries.write();
        let id = loop {
            *counter += 1;
            let candidate = format!("{}_cleaned_{}", root_id, *counter);
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };

        let info = DatasetInfo {
            id: id.clone(),
            root_id,
            parent_id: Some(parent_id.to_string()),
            is_cleaned: true,
            rows: table.row_count(),
            columns: table.column_count(),
            created_at: Utc::now(),
        };
        entries.insert(
            id.clone(),
            DatasetEntry {
                table: Arc::new(table),
                info,
            },
        );
        debug!("Registered '{}' derived from '{}'", id, parent_id);
        Ok(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Metadata of every dataset, oldest first.
    pub fn list(&self) -> Vec<DatasetInfo> {
        let mut infos: Vec<DatasetInfo> = self
            .entries
            .read()
            .values()
            .map(|entry| entry.info.clone())
            .collect();
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        infos
    }
}
