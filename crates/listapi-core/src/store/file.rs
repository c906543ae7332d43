// # File List Store
//
// File-based implementation of ListStore with crash recovery.
//
// ## Purpose
//
// Persists the list tables across restarts without a database server.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "tables": {
//     "groups": { "last_id": 1, "rows": { "1": { "id": 1, "identity": "office", ... } } },
//     "domainlist": { ... },
//     "domainlist_by_group": [[3, 1]]
//   }
// }
// ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::Error;
use crate::error::StoreError;
use crate::store::tables::{ListTables, SnapshotCursor};
use crate::traits::{ListStore, RowCursor, RowId, RowWrite, WriteMode};
use crate::variant::ListVariant;

/// Store file format version
/// Used for future migration if format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based list store with crash recovery
///
/// Every successful mutation is written to disk before it becomes visible.
/// A mutation whose write fails leaves both the file and the in-memory
/// tables unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use listapi_core::{FileListStore, ListStore, ListVariant, RowWrite, WriteMode};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileListStore::open("/var/lib/listapi/lists.json")?;
///     store.add_or_update(ListVariant::Groups, &RowWrite::new("office", true), WriteMode::Create)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileListStore {
    path: PathBuf,
    tables: RwLock<ListTables>,
}

/// Serializable store file format
#[derive(Debug, serde::Serialize)]
struct StoreFileRef<'a> {
    version: &'a str,
    tables: &'a ListTables,
}

#[derive(Debug, serde::Deserialize)]
struct StoreFile {
    version: String,
    tables: ListTables,
}

impl FileListStore {
    /// Create or load a file list store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing store file
    /// 3. If it is corrupted, try to load from backup
    /// 4. If both fail, start with empty tables
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tables = Self::load_with_recovery(&path)?;

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Load tables with automatic recovery
    fn load_with_recovery(path: &Path) -> Result<ListTables, Error> {
        match Self::load(path) {
            Ok(tables) => Ok(tables),
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Store file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty tables.");
                    return Ok(ListTables::default());
                }

                match Self::load(&backup_path) {
                    Ok(tables) => {
                        tracing::info!("Recovered store from backup");
                        if let Err(restore_err) = fs::copy(&backup_path, path) {
                            tracing::error!(
                                "Failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(tables)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty tables.",
                            backup_err
                        );
                        Ok(ListTables::default())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Load tables from one file
    fn load(path: &Path) -> Result<ListTables, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(ListTables::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::store(format!(
                "Failed to read store file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: StoreFile = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.tables)
    }

    /// Write tables to disk atomically
    fn persist(&self, tables: &ListTables) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(&StoreFileRef {
            version: STORE_FILE_VERSION,
            tables,
        })?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path) {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Store written to file: {}", self.path.display());
        Ok(())
    }

    /// Apply a mutation to a copy of the tables, persist it, then publish it
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut ListTables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| StoreError::new("store lock poisoned"))?;

        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next)
            .map_err(|e| StoreError::new(e.to_string()))?;
        *guard = next;
        Ok(out)
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

impl ListStore for FileListStore {
    fn open_cursor(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
    ) -> Result<Box<dyn RowCursor + '_>, StoreError> {
        let rows = self
            .tables
            .read()
            .map_err(|_| StoreError::new("store lock poisoned"))?
            .select(variant, argument);
        Ok(Box::new(SnapshotCursor::new(rows)))
    }

    fn add_or_update(
        &self,
        variant: ListVariant,
        row: &RowWrite,
        mode: WriteMode,
    ) -> Result<RowId, StoreError> {
        let now = chrono::Utc::now().timestamp();
        self.mutate(|tables| tables.add_or_update(variant, row, mode, now))
    }

    fn replace_groups(
        &self,
        variant: ListVariant,
        row_id: RowId,
        group_ids: &[u32],
    ) -> Result<(), StoreError> {
        self.mutate(|tables| tables.replace_groups(variant, row_id, group_ids))
    }

    fn delete(&self, variant: ListVariant, argument: &str) -> Result<(), StoreError> {
        self.mutate(|tables| tables.delete(variant, argument))
    }
}
