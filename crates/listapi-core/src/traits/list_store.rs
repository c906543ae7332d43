// # List Store Trait
//
// Defines the contract this layer requires from the relational store that
// owns the list tables.
//
// ## Responsibilities
//
// The store owns every row for its whole lifecycle:
// - Assigning ids and timestamps
// - Enforcing uniqueness of identities
// - Aggregating group memberships into a comma-joined id list
// - Serializing concurrent writes
//
// This layer never caches rows; each request reads fresh.
//
// ## Implementations
//
// - In-memory: `MemoryListStore`
// - JSON file: `FileListStore`
// - Future: SQLite-backed gravity database
//
// ## Usage
//
// ```rust
// use listapi_core::{ListStore, ListVariant, MemoryListStore, RowWrite, WriteMode};
//
// let store = MemoryListStore::new();
// let row = RowWrite::new("ads", true);
// let id = store.add_or_update(ListVariant::Groups, &row, WriteMode::Create)?;
//
// let mut cursor = store.open_cursor(ListVariant::Groups, Some("ads"))?;
// assert_eq!(cursor.next_row().map(|r| r.id), Some(id));
// cursor.finalize();
// # Ok::<(), listapi_core::StoreError>(())
// ```

use crate::error::StoreError;
use crate::request::Method;
use crate::variant::ListVariant;

/// Store-assigned row identifier
pub type RowId = i64;

/// A row as produced by the store
///
/// Superset of the fields of every list; only those relevant to the variant
/// that was read are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// Store-assigned, unique, immutable
    pub id: RowId,
    /// Group name (groups)
    pub name: Option<String>,
    /// List URL (adlists)
    pub address: Option<String>,
    /// Domain or regex (domain lists), client address (clients)
    pub domain: Option<String>,
    /// Stored domain type label, e.g. `deny/regex`
    pub domain_type: Option<String>,
    pub enabled: bool,
    pub comment: Option<String>,
    pub description: Option<String>,
    /// Comma-joined group ids, or `None` when the row belongs to no group
    pub group_ids: Option<String>,
    /// Unix timestamp, store-assigned
    pub date_added: i64,
    /// Unix timestamp, store-assigned
    pub date_modified: i64,
}

/// A validated row write handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWrite {
    /// Identity taken from the request path
    pub argument: String,
    pub enabled: bool,
    pub comment: Option<String>,
    pub description: Option<String>,
    /// New group name (group rename)
    pub name: Option<String>,
    /// Previous domain type of the row being moved
    pub oldtype: Option<String>,
}

impl RowWrite {
    /// Create a write with no optional fields
    pub fn new(argument: impl Into<String>, enabled: bool) -> Self {
        Self {
            argument: argument.into(),
            enabled,
            comment: None,
            description: None,
            name: None,
            oldtype: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_oldtype(mut self, oldtype: impl Into<String>) -> Self {
        self.oldtype = Some(oldtype.into());
        self
    }
}

/// How a write treats an existing row with the same identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert; an existing identity is a failure (`POST`)
    Create,
    /// Insert or update in place (`PUT`)
    Upsert,
}

impl WriteMode {
    /// Write mode for a request method, if the method writes
    pub fn from_method(method: Method) -> Option<Self> {
        match method {
            Method::Post => Some(Self::Create),
            Method::Put => Some(Self::Upsert),
            _ => None,
        }
    }

    /// Success status of a write in this mode
    pub fn success_status(&self) -> u16 {
        match self {
            Self::Create => 201,
            Self::Upsert => 200,
        }
    }
}

/// Iteration state of one read
///
/// # Error Reporting
///
/// A cursor surfaces iteration failures only at the end: `next_row()` returns
/// `None` both when the rows are exhausted and when iteration failed, and
/// `take_error()` tells the two apart afterwards.
///
/// # Release
///
/// `finalize()` releases store-side iteration state. Callers must call it on
/// every exit path; it must be safe to call more than once.
pub trait RowCursor {
    /// The next row, or `None` once exhausted or failed
    fn next_row(&mut self) -> Option<TableRow>;

    /// The error that ended iteration, if any
    fn take_error(&mut self) -> Option<StoreError>;

    /// Release store-side iteration state
    fn finalize(&mut self);
}

/// Trait for list store implementations
///
/// All methods are blocking calls that either return or fail. Implementations
/// must be safe to share between the threads that handle concurrent requests.
///
/// # Failure Semantics
///
/// Every failure carries an optional diagnostic message which is reported to
/// the client verbatim. Failures are never retried by the caller.
pub trait ListStore: Send + Sync {
    /// Open a cursor over the rows of `variant`
    ///
    /// # Parameters
    ///
    /// - `variant`: The list to read; broad domain lists span several types
    /// - `argument`: When set, only rows whose identity equals it
    fn open_cursor(
        &self,
        variant: ListVariant,
        argument: Option<&str>,
    ) -> Result<Box<dyn RowCursor + '_>, StoreError>;

    /// Create or update one row
    ///
    /// # Returns
    ///
    /// - `Ok(RowId)`: Id of the written row
    /// - `Err(StoreError)`: Identity conflict, missing row, or storage failure
    fn add_or_update(
        &self,
        variant: ListVariant,
        row: &RowWrite,
        mode: WriteMode,
    ) -> Result<RowId, StoreError>;

    /// Replace the group memberships of one row
    ///
    /// The previous membership set is discarded entirely.
    fn replace_groups(
        &self,
        variant: ListVariant,
        row_id: RowId,
        group_ids: &[u32],
    ) -> Result<(), StoreError>;

    /// Delete the row identified by `argument`
    ///
    /// Deleting a row that does not exist is a failure.
    fn delete(&self, variant: ListVariant, argument: &str) -> Result<(), StoreError>;
}
