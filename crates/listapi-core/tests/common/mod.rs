//! Test doubles and common utilities for list API contract tests
//!
//! These doubles wrap or replace the store so tests can observe exactly which
//! collaborator calls a request made, and inject failures at chosen points.

#![allow(dead_code)]

use listapi_core::traits::{AllowAll, RowId, StaticToken};
use listapi_core::{
    ApiRequest, ApiResponse, Dispatcher, ListStore, ListVariant, MemoryListStore, Method,
    RowCursor, RowWrite, StoreError, TableRow, WriteMode,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Call counters shared between a store double and its cursors
#[derive(Debug, Default)]
pub struct CallCounts {
    pub cursors_opened: AtomicUsize,
    pub cursors_finalized: AtomicUsize,
    pub writes: AtomicUsize,
    pub group_replacements: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CallCounts {
    pub fn cursors_opened(&self) -> usize {
        self.cursors_opened.load(Ordering::SeqCst)
    }

    pub fn cursors_finalized(&self) -> usize {
        self.cursors_finalized.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn group_replacements(&self) -> usize {
        self.group_replacements.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total number of store calls of any kind
    pub fn total(&self) -> usize {
        self.cursors_opened() + self.writes() + self.group_replacements() + self.deletes()
    }
}

/// Cursor wrapper that counts `finalize()` calls
struct CountingCursor<'a> {
    inner: Box<dyn RowCursor + 'a>,
    counts: &'a CallCounts,
}

impl RowCursor for CountingCursor<'_> {
    fn next_row(&mut self) -> Option<TableRow> {
        self.inner.next_row()
    }

    fn take_error(&mut self) -> Option<StoreError> {
        self.inner.take_error()
    }

    fn finalize(&mut self) {
        self.counts.cursors_finalized.fetch_add(1, Ordering::SeqCst);
        self.inner.finalize();
    }
}

/// A memory store that records every call
///
/// `fail_group_replacement` makes every `replace_groups` call fail after
/// being counted, leaving the memberships untouched.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryListStore,
    pub counts: CallCounts,
    fail_group_replacement: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_group_replacement() -> Self {
        Self {
            fail_group_replacement: true,
            ..Self::default()
        }
    }

    /// The wrapped store, for seeding rows without counting
    pub fn inner(&self) -> &MemoryListStore {
        &self.inner
    }
}

impl ListStore for CountingStore {
    fn open_cursor(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
    ) -> Result<Box<dyn RowCursor + '_>, StoreError> {
        self.counts.cursors_opened.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.open_cursor(variant, argument)?;
        Ok(Box::new(CountingCursor {
            inner,
            counts: &self.counts,
        }))
    }

    fn add_or_update(
        &self,
        variant: ListVariant,
        row: &RowWrite,
        mode: WriteMode,
    ) -> Result<RowId, StoreError> {
        self.counts.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.add_or_update(variant, row, mode)
    }

    fn replace_groups(
        &self,
        variant: ListVariant,
        row_id: RowId,
        group_ids: &[u32],
    ) -> Result<(), StoreError> {
        self.counts.group_replacements.fetch_add(1, Ordering::SeqCst);
        if self.fail_group_replacement {
            return Err(StoreError::new("database is locked"));
        }
        self.inner.replace_groups(variant, row_id, group_ids)
    }

    fn delete(&self, variant: ListVariant, argument: &str) -> Result<(), StoreError> {
        self.counts.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(variant, argument)
    }
}

/// Cursor yielding scripted rows, then an optional error
struct ScriptedCursor<'a> {
    rows: std::vec::IntoIter<TableRow>,
    error: Option<StoreError>,
    counts: &'a CallCounts,
}

impl RowCursor for ScriptedCursor<'_> {
    fn next_row(&mut self) -> Option<TableRow> {
        self.rows.next()
    }

    fn take_error(&mut self) -> Option<StoreError> {
        self.error.take()
    }

    fn finalize(&mut self) {
        self.counts.cursors_finalized.fetch_add(1, Ordering::SeqCst);
    }
}

/// A read-only store that replays fixed rows
///
/// With `failing_after`, iteration ends with the given error once every row
/// has been yielded. Writes and deletes always fail.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    rows: Vec<TableRow>,
    error: Option<StoreError>,
    open_error: Option<StoreError>,
    pub counts: CallCounts,
}

impl ScriptedStore {
    pub fn with_rows(rows: Vec<TableRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing_after(rows: Vec<TableRow>, error: StoreError) -> Self {
        Self {
            rows,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn failing_open(error: StoreError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::default()
        }
    }
}

impl ListStore for ScriptedStore {
    fn open_cursor(
        &self,
        _variant: ListVariant,
        _argument: Option<&str>,
    ) -> Result<Box<dyn RowCursor + '_>, StoreError> {
        self.counts.cursors_opened.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        Ok(Box::new(ScriptedCursor {
            rows: self.rows.clone().into_iter(),
            error: self.error.clone(),
            counts: &self.counts,
        }))
    }

    fn add_or_update(
        &self,
        _variant: ListVariant,
        _row: &RowWrite,
        _mode: WriteMode,
    ) -> Result<RowId, StoreError> {
        self.counts.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::new("attempt to write a readonly database"))
    }

    fn replace_groups(
        &self,
        _variant: ListVariant,
        _row_id: RowId,
        _group_ids: &[u32],
    ) -> Result<(), StoreError> {
        self.counts.group_replacements.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::new("attempt to write a readonly database"))
    }

    fn delete(&self, _variant: ListVariant, _argument: &str) -> Result<(), StoreError> {
        self.counts.deletes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::new("attempt to write a readonly database"))
    }
}

/// A domain row as a store would produce it
pub fn domain_row(id: RowId, domain: &str, domain_type: &str, group_ids: Option<&str>) -> TableRow {
    TableRow {
        id,
        domain: Some(domain.to_string()),
        domain_type: Some(domain_type.to_string()),
        enabled: true,
        group_ids: group_ids.map(str::to_string),
        date_added: 1_700_000_000,
        date_modified: 1_700_000_000,
        ..TableRow::default()
    }
}

/// Dispatcher over `store` that authorizes everyone
pub fn open_dispatcher(store: Arc<dyn ListStore>) -> Dispatcher {
    Dispatcher::new(store, Arc::new(AllowAll))
}

/// Dispatcher over `store` that requires `token`
pub fn guarded_dispatcher(store: Arc<dyn ListStore>, token: &str) -> Dispatcher {
    Dispatcher::new(store, Arc::new(StaticToken::new(token)))
}

pub fn get(path: &str) -> ApiRequest {
    ApiRequest::new(Method::Get, path)
}

pub fn post(path: &str, body: &str) -> ApiRequest {
    ApiRequest::new(Method::Post, path).with_body(body)
}

pub fn put(path: &str, body: &str) -> ApiRequest {
    ApiRequest::new(Method::Put, path).with_body(body)
}

pub fn delete(path: &str) -> ApiRequest {
    ApiRequest::new(Method::Delete, path)
}

/// The JSON body of a response; panics on `204`
pub fn body(response: &ApiResponse) -> &Value {
    response.body.as_ref().expect("response has a body")
}

/// The `error` object of an error response
pub fn error_of(response: &ApiResponse) -> &Value {
    &body(response)["error"]
}
