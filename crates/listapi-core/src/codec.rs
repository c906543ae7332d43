//! Row codec
//!
//! Projects a [`TableRow`] into the JSON shape of the list it was read from.
//!
//! | Variant            | Shape                                                                  |
//! |--------------------|------------------------------------------------------------------------|
//! | Groups             | `id, name, description, enabled, date_added, date_modified`            |
//! | Adlists            | `id, address, comment, enabled, date_added, date_modified`             |
//! | Clients, DomainList | `id, domain, type, comment, groups, enabled, date_added, date_modified` |
//!
//! Optional strings are always emitted, as `null` when absent.

use serde::Serialize;
use thiserror::Error;

use crate::traits::{RowId, TableRow};
use crate::variant::ListVariant;

/// Projection failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The store's group aggregate is not a comma-joined list of integers
    #[error("malformed group aggregate '{0}'")]
    MalformedGroups(String),
}

/// A group row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupItem {
    pub id: RowId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub date_added: i64,
    pub date_modified: i64,
}

/// An adlist row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdlistItem {
    pub id: RowId,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub enabled: bool,
    pub date_added: i64,
    pub date_modified: i64,
}

/// A domain list or client row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainItem {
    pub id: RowId,
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub domain_type: Option<String>,
    pub comment: Option<String>,
    pub groups: Vec<u32>,
    pub enabled: bool,
    pub date_added: i64,
    pub date_modified: i64,
}

/// One projected row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListItem {
    Group(GroupItem),
    Adlist(AdlistItem),
    Domain(DomainItem),
}

/// Project a row into the shape of `variant`
pub fn project(variant: ListVariant, row: TableRow) -> Result<ListItem, CodecError> {
    match variant {
        ListVariant::Groups => Ok(ListItem::Group(GroupItem {
            id: row.id,
            name: row.name,
            description: row.description,
            enabled: row.enabled,
            date_added: row.date_added,
            date_modified: row.date_modified,
        })),
        ListVariant::Adlists => Ok(ListItem::Adlist(AdlistItem {
            id: row.id,
            address: row.address,
            comment: row.comment,
            enabled: row.enabled,
            date_added: row.date_added,
            date_modified: row.date_modified,
        })),
        ListVariant::Clients | ListVariant::DomainList { .. } => {
            let groups = parse_group_aggregate(row.group_ids.as_deref())?;
            Ok(ListItem::Domain(DomainItem {
                id: row.id,
                domain: row.domain,
                domain_type: row.domain_type,
                comment: row.comment,
                groups,
                enabled: row.enabled,
                date_added: row.date_added,
                date_modified: row.date_modified,
            }))
        }
    }
}

/// Rebuild a group id array from the store's comma-joined aggregate
///
/// The aggregate is wrapped in brackets and parsed as a JSON array. `None`
/// yields an empty array. Anything but digits and commas is rejected before
/// parsing, as is any text that does not form a valid array.
pub fn parse_group_aggregate(raw: Option<&str>) -> Result<Vec<u32>, CodecError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    if !raw.bytes().all(|b| b.is_ascii_digit() || b == b',') {
        return Err(CodecError::MalformedGroups(raw.to_string()));
    }

    serde_json::from_str(&format!("[{}]", raw))
        .map_err(|_| CodecError::MalformedGroups(raw.to_string()))
}
