//! Table reader
//!
//! Reads the rows of one list, optionally narrowed to a single identity, and
//! nests the projected array under the list's collection key.
//!
//! ## Error Detection
//!
//! A cursor reports iteration failures only once it is drained, so the
//! result array is built completely before the outcome is known. On failure
//! the array is discarded; no partial result ever leaves the reader.

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::codec::{self, ListItem};
use crate::error::{ApiError, StoreError};
use crate::request::ApiResponse;
use crate::traits::{ListStore, RowCursor};
use crate::variant::ListVariant;

/// Finalizes the wrapped cursor when dropped
struct CursorGuard<'c> {
    cursor: Box<dyn RowCursor + 'c>,
}

impl<'c> CursorGuard<'c> {
    fn cursor(&mut self) -> &mut (dyn RowCursor + 'c) {
        self.cursor.as_mut()
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.cursor.finalize();
    }
}

/// Reads projected rows from a store
pub struct TableReader<'a> {
    store: &'a dyn ListStore,
}

impl<'a> TableReader<'a> {
    pub fn new(store: &'a dyn ListStore) -> Self {
        Self { store }
    }

    /// Read and project every matching row
    pub fn read(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
    ) -> Result<Vec<ListItem>, ApiError> {
        let cursor = self
            .store
            .open_cursor(variant, argument)
            .map_err(|e| {
                warn!(%variant, ?argument, error = %e, "Failed to open cursor");
                ApiError::database("Could not read from database table", argument, &e)
            })?;
        let mut guard = CursorGuard { cursor };

        let mut items = Vec::new();
        let mut malformed: Option<StoreError> = None;
        while let Some(row) = guard.cursor().next_row() {
            if malformed.is_some() {
                // Keep draining so the store can still report its own error
                continue;
            }
            match codec::project(variant, row) {
                Ok(item) => items.push(item),
                Err(e) => malformed = Some(StoreError::new(e.to_string())),
            }
        }

        if let Some(e) = guard.cursor().take_error().or(malformed) {
            warn!(%variant, ?argument, error = %e, "Read failed after draining cursor");
            drop(items);
            return Err(ApiError::database(
                "Could not read from database table",
                argument,
                &e,
            ));
        }

        trace!(%variant, rows = items.len(), "Cursor drained");
        Ok(items)
    }

    /// Read and wrap the result under the collection key with `status`
    pub fn respond(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
        status: u16,
    ) -> Result<ApiResponse, ApiError> {
        let items = self.read(variant, argument)?;
        debug!(%variant, ?argument, rows = items.len(), status, "List read");

        let items = serde_json::to_value(items).map_err(|e| {
            ApiError::database(
                "Could not encode table rows",
                argument,
                &StoreError::new(e.to_string()),
            )
        })?;

        let mut body = Map::new();
        body.insert(variant.collection_key().to_string(), items);
        Ok(ApiResponse::json(status, Value::Object(body)))
    }
}
