//! Table writer (create-or-update)
//!
//! A write runs as three explicit phases, each producing its own value:
//!
//! 1. **Decode**: the request body becomes a [`WriteInput`] or a `bad_request`
//! 2. **Commit**: the row is written, then (if requested) its group memberships
//!    are replaced, yielding a [`Committed`] or a [`CommitFailure`]
//! 3. **Read back**: the row is re-read through the [`TableReader`]; the
//!    response reflects store state, never the request body
//!
//! ## Consistency
//!
//! The row write and the group replacement are two separate store calls with
//! no compensating rollback. When the second fails the row stays written with
//! its previous memberships, and the failure is reported as a `database_error`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ApiError, StoreError};
use crate::request::ApiResponse;
use crate::table::reader::TableReader;
use crate::traits::{ListStore, RowId, RowWrite, WriteMode};
use crate::variant::ListVariant;

/// A decoded and validated write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteInput {
    pub row: RowWrite,
    /// Replacement memberships; `None` leaves memberships untouched
    pub groups: Option<Vec<u32>>,
}

impl WriteInput {
    /// Decode a request body for a write to `argument` in `variant`
    pub fn decode(
        variant: ListVariant,
        argument: &str,
        body: Option<&str>,
    ) -> Result<Self, ApiError> {
        let payload = body
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .ok_or_else(|| ApiError::bad_request("Invalid request body data"))?;

        let Some(enabled) = payload.get("enabled").and_then(Value::as_bool) else {
            return Err(ApiError::bad_request("No \"enabled\" boolean in body data"));
        };

        let groups = match payload.get("groups") {
            None => None,
            Some(value) => {
                if !variant.has_groups() {
                    return Err(ApiError::bad_request(format!(
                        "Group assignment is not supported for {}",
                        variant
                    )));
                }
                Some(decode_group_ids(value)?)
            }
        };

        Ok(Self {
            row: RowWrite {
                argument: argument.to_string(),
                enabled,
                comment: non_empty_string(&payload, "comment"),
                description: non_empty_string(&payload, "description"),
                name: non_empty_string(&payload, "name"),
                oldtype: non_empty_string(&payload, "oldtype"),
            },
            groups,
        })
    }

    /// Identity under which the written row can be read back
    ///
    /// Only an update renames a group; a create keeps the path argument.
    pub fn read_back_argument(&self, variant: ListVariant, mode: WriteMode) -> &str {
        match (variant, mode, &self.row.name) {
            (ListVariant::Groups, WriteMode::Upsert, Some(name)) => name,
            _ => &self.row.argument,
        }
    }

    /// The submitted fields echoed in a failure body
    fn echo(&self, err: &StoreError) -> Value {
        let mut data = Map::new();
        data.insert("argument".into(), Value::from(self.row.argument.as_str()));
        data.insert("enabled".into(), Value::from(self.row.enabled));
        let optional = [
            ("comment", &self.row.comment),
            ("description", &self.row.description),
            ("name", &self.row.name),
            ("oldtype", &self.row.oldtype),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                data.insert(key.into(), Value::from(value.as_str()));
            }
        }
        data.insert(
            "sql_msg".into(),
            err.sql_msg().map_or(Value::Null, Value::from),
        );
        Value::Object(data)
    }
}

/// Present, string, and non-empty; anything else is absent
fn non_empty_string(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_group_ids(value: &Value) -> Result<Vec<u32>, ApiError> {
    let invalid = || {
        ApiError::bad_request("\"groups\" must be an array of non-negative integer group IDs")
    };

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|id| {
            id.as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .ok_or_else(invalid)
        })
        .collect()
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub row_id: RowId,
    /// Whether memberships were replaced
    pub groups_replaced: bool,
}

/// Outcome of a failed commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitFailure {
    /// Nothing was written
    Row(StoreError),
    /// The row was written; its memberships were not replaced
    Groups { row_id: RowId, error: StoreError },
}

impl CommitFailure {
    pub fn error(&self) -> &StoreError {
        match self {
            Self::Row(error) | Self::Groups { error, .. } => error,
        }
    }
}

/// Writes rows into a store
pub struct TableWriter<'a> {
    store: &'a dyn ListStore,
}

impl<'a> TableWriter<'a> {
    pub fn new(store: &'a dyn ListStore) -> Self {
        Self { store }
    }

    /// Decode, commit, and read back one row
    pub fn write(
        &self,
        variant: ListVariant,
        argument: &str,
        mode: WriteMode,
        body: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let input = WriteInput::decode(variant, argument, body)?;

        if let Err(failure) = self.commit(variant, &input, mode) {
            return Err(ApiError::Database {
                message: "Could not add to database table".to_string(),
                data: input.echo(failure.error()),
            });
        }

        TableReader::new(self.store).respond(
            variant,
            Some(input.read_back_argument(variant, mode)),
            mode.success_status(),
        )
    }

    /// Write the row, then replace its memberships if requested
    pub fn commit(
        &self,
        variant: ListVariant,
        input: &WriteInput,
        mode: WriteMode,
    ) -> Result<Committed, CommitFailure> {
        let row_id = self
            .store
            .add_or_update(variant, &input.row, mode)
            .map_err(|e| {
                debug!(%variant, argument = %input.row.argument, error = %e, "Row write rejected");
                CommitFailure::Row(e)
            })?;

        let Some(groups) = &input.groups else {
            return Ok(Committed {
                row_id,
                groups_replaced: false,
            });
        };

        self.store
            .replace_groups(variant, row_id, groups)
            .map_err(|error| {
                warn!(
                    %variant,
                    argument = %input.row.argument,
                    row_id,
                    error = %error,
                    "Row written but group replacement failed; memberships unchanged"
                );
                CommitFailure::Groups { row_id, error }
            })?;

        Ok(Committed {
            row_id,
            groups_replaced: true,
        })
    }
}
