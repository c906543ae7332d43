// # Memory List Store
//
// In-memory implementation of ListStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for embedding the API in front of a store that is
// seeded at startup.
//
// ## Crash Behavior
//
// - All rows are lost on restart/crash
// - Ids restart at 1

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::store::tables::{ListTables, SnapshotCursor};
use crate::traits::{ListStore, RowCursor, RowId, RowWrite, WriteMode};
use crate::variant::ListVariant;

/// In-memory list store
///
/// All tables live behind one `RwLock`; reads snapshot the matching rows when
/// the cursor is opened.
///
/// # Example
///
/// ```rust
/// use listapi_core::{ListStore, ListVariant, MemoryListStore, RowWrite, WriteMode};
///
/// let store = MemoryListStore::new();
/// store.add_or_update(ListVariant::Adlists, &RowWrite::new("https://example.com/hosts", true), WriteMode::Create)?;
/// assert_eq!(store.len(ListVariant::Adlists), 1);
/// # Ok::<(), listapi_core::StoreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryListStore {
    inner: Arc<RwLock<ListTables>>,
}

impl MemoryListStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows visible through `variant`
    pub fn len(&self, variant: ListVariant) -> usize {
        self.read().map(|t| t.count(variant)).unwrap_or(0)
    }

    /// Whether no rows are visible through `variant`
    pub fn is_empty(&self, variant: ListVariant) -> bool {
        self.len(variant) == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ListTables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::new("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ListTables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::new("store lock poisoned"))
    }
}

impl ListStore for MemoryListStore {
    fn open_cursor(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
    ) -> Result<Box<dyn RowCursor + '_>, StoreError> {
        let rows = self.read()?.select(variant, argument);
        tracing::trace!(%variant, rows = rows.len(), "Cursor opened");
        Ok(Box::new(SnapshotCursor::new(rows)))
    }

    fn add_or_update(
        &self,
        variant: ListVariant,
        row: &RowWrite,
        mode: WriteMode,
    ) -> Result<RowId, StoreError> {
        let now = chrono::Utc::now().timestamp();
        self.write()?.add_or_update(variant, row, mode, now)
    }

    fn replace_groups(
        &self,
        variant: ListVariant,
        row_id: RowId,
        group_ids: &[u32],
    ) -> Result<(), StoreError> {
        self.write()?.replace_groups(variant, row_id, group_ids)
    }

    fn delete(&self, variant: ListVariant, argument: &str) -> Result<(), StoreError> {
        self.write()?.delete(variant, argument)
    }
}
