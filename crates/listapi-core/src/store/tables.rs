//! Table engine shared by the reference stores
//!
//! Models the relational layout the API expects from its store: one table per
//! list kind, plus membership relations for domain lists and clients. Identity
//! uniqueness, id assignment, timestamps, and the group aggregate live here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::StoreError;
use crate::traits::{RowCursor, RowId, RowWrite, TableRow, WriteMode};
use crate::variant::{DomainType, ListVariant};

/// Physical table a variant lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    Group,
    Adlist,
    Client,
    Domain,
}

impl TableKind {
    fn of(variant: ListVariant) -> Self {
        match variant {
            ListVariant::Groups => Self::Group,
            ListVariant::Adlists => Self::Adlist,
            ListVariant::Clients => Self::Client,
            ListVariant::DomainList { .. } => Self::Domain,
        }
    }

    fn unique_violation(&self) -> StoreError {
        let columns = match self {
            Self::Group => "group.name",
            Self::Adlist => "adlist.address",
            Self::Client => "client.ip",
            Self::Domain => "domainlist.domain, domainlist.type",
        };
        StoreError::new(format!("UNIQUE constraint failed: {}", columns))
    }
}

/// One stored row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredRow {
    id: RowId,
    /// Group name, adlist address, client address, or domain
    identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain_type: Option<DomainType>,
    enabled: bool,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    description: Option<String>,
    date_added: i64,
    date_modified: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Table {
    /// Last assigned id; ids start at 1 and are never reused
    last_id: RowId,
    rows: BTreeMap<RowId, StoredRow>,
}

impl Table {
    fn find(&self, identity: &str, domain_type: Option<DomainType>) -> Option<RowId> {
        self.rows
            .values()
            .find(|r| r.identity == identity && r.domain_type == domain_type)
            .map(|r| r.id)
    }
}

/// All list tables and membership relations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ListTables {
    #[serde(default)]
    groups: Table,
    #[serde(default)]
    adlists: Table,
    #[serde(default)]
    clients: Table,
    #[serde(default)]
    domainlist: Table,
    /// (domain id, group id)
    #[serde(default)]
    domainlist_by_group: BTreeSet<(RowId, RowId)>,
    /// (client id, group id)
    #[serde(default)]
    client_by_group: BTreeSet<(RowId, RowId)>,
}

impl ListTables {
    fn table(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::Group => &self.groups,
            TableKind::Adlist => &self.adlists,
            TableKind::Client => &self.clients,
            TableKind::Domain => &self.domainlist,
        }
    }

    fn table_mut(&mut self, kind: TableKind) -> &mut Table {
        match kind {
            TableKind::Group => &mut self.groups,
            TableKind::Adlist => &mut self.adlists,
            TableKind::Client => &mut self.clients,
            TableKind::Domain => &mut self.domainlist,
        }
    }

    fn memberships(&self, kind: TableKind) -> Option<&BTreeSet<(RowId, RowId)>> {
        match kind {
            TableKind::Client => Some(&self.client_by_group),
            TableKind::Domain => Some(&self.domainlist_by_group),
            TableKind::Group | TableKind::Adlist => None,
        }
    }

    fn memberships_mut(&mut self, kind: TableKind) -> Option<&mut BTreeSet<(RowId, RowId)>> {
        match kind {
            TableKind::Client => Some(&mut self.client_by_group),
            TableKind::Domain => Some(&mut self.domainlist_by_group),
            TableKind::Group | TableKind::Adlist => None,
        }
    }

    /// Number of rows visible through `variant`
    pub(crate) fn count(&self, variant: ListVariant) -> usize {
        self.select(variant, None).len()
    }

    /// Rows of `variant`, in id order, optionally narrowed to one identity
    pub(crate) fn select(&self, variant: ListVariant, argument: Option<&str>) -> Vec<TableRow> {
        let kind = TableKind::of(variant);
        self.table(kind)
            .rows
            .values()
            .filter(|r| match kind {
                TableKind::Domain => r.domain_type.is_some_and(|t| variant.matches_type(t)),
                TableKind::Group | TableKind::Adlist | TableKind::Client => true,
            })
            .filter(|r| argument.is_none_or(|a| r.identity == a))
            .map(|r| self.project(kind, r))
            .collect()
    }

    fn project(&self, kind: TableKind, stored: &StoredRow) -> TableRow {
        let mut row = TableRow {
            id: stored.id,
            domain_type: stored.domain_type.map(|t| t.as_str().to_string()),
            enabled: stored.enabled,
            comment: stored.comment.clone(),
            description: stored.description.clone(),
            group_ids: self.group_aggregate(kind, stored.id),
            date_added: stored.date_added,
            date_modified: stored.date_modified,
            ..TableRow::default()
        };
        let identity = Some(stored.identity.clone());
        match kind {
            TableKind::Group => row.name = identity,
            TableKind::Adlist => row.address = identity,
            TableKind::Client | TableKind::Domain => row.domain = identity,
        }
        row
    }

    /// Comma-joined ascending group ids, `None` for no memberships
    fn group_aggregate(&self, kind: TableKind, row_id: RowId) -> Option<String> {
        let ids: Vec<String> = self
            .memberships(kind)?
            .iter()
            .filter(|(id, _)| *id == row_id)
            .map(|(_, group)| group.to_string())
            .collect();
        (!ids.is_empty()).then(|| ids.join(","))
    }

    pub(crate) fn add_or_update(
        &mut self,
        variant: ListVariant,
        row: &RowWrite,
        mode: WriteMode,
        now: i64,
    ) -> Result<RowId, StoreError> {
        let kind = TableKind::of(variant);
        let target_type = match kind {
            TableKind::Domain => Some(variant.domain_type().ok_or_else(|| read_only(variant))?),
            TableKind::Group | TableKind::Adlist | TableKind::Client => None,
        };

        // Groups carry a description, everything else a comment
        let (comment, description) = match kind {
            TableKind::Group => (None, row.description.clone()),
            TableKind::Adlist | TableKind::Client | TableKind::Domain => (row.comment.clone(), None),
        };

        let existing = match (kind, mode, row.oldtype.as_deref()) {
            (TableKind::Domain, WriteMode::Upsert, Some(oldtype)) => {
                let oldtype: DomainType = oldtype
                    .parse()
                    .map_err(|e: crate::Error| StoreError::new(e.to_string()))?;
                let id = self
                    .table(kind)
                    .find(&row.argument, Some(oldtype))
                    .ok_or_else(|| {
                        StoreError::new(format!("no {} entry '{}'", oldtype, row.argument))
                    })?;
                Some(id)
            }
            _ => self.table(kind).find(&row.argument, target_type),
        };

        let identity = match (kind, mode, &row.name) {
            // A rename needs an existing group to rename
            (TableKind::Group, WriteMode::Upsert, Some(name)) => {
                if existing.is_none() {
                    return Err(not_found(&row.argument));
                }
                name.clone()
            }
            _ => row.argument.clone(),
        };

        match (mode, existing) {
            (WriteMode::Create, Some(_)) => Err(kind.unique_violation()),
            (_, None) => {
                if self.table(kind).find(&identity, target_type).is_some() {
                    return Err(kind.unique_violation());
                }
                let table = self.table_mut(kind);
                table.last_id += 1;
                let id = table.last_id;
                table.rows.insert(
                    id,
                    StoredRow {
                        id,
                        identity,
                        domain_type: target_type,
                        enabled: row.enabled,
                        comment,
                        description,
                        date_added: now,
                        date_modified: now,
                    },
                );
                Ok(id)
            }
            (WriteMode::Upsert, Some(id)) => {
                if let Some(other) = self.table(kind).find(&identity, target_type)
                    && other != id
                {
                    return Err(kind.unique_violation());
                }
                let stored = self
                    .table_mut(kind)
                    .rows
                    .get_mut(&id)
                    .ok_or_else(|| not_found(&row.argument))?;
                stored.identity = identity;
                stored.domain_type = target_type;
                stored.enabled = row.enabled;
                stored.comment = comment;
                stored.description = description;
                stored.date_modified = now;
                Ok(id)
            }
        }
    }

    pub(crate) fn replace_groups(
        &mut self,
        variant: ListVariant,
        row_id: RowId,
        group_ids: &[u32],
    ) -> Result<(), StoreError> {
        let kind = TableKind::of(variant);
        if !self.table(kind).rows.contains_key(&row_id) {
            return Err(StoreError::new(format!("no row with id {}", row_id)));
        }
        if group_ids
            .iter()
            .any(|g| !self.groups.rows.contains_key(&RowId::from(*g)))
        {
            return Err(StoreError::new("FOREIGN KEY constraint failed"));
        }

        let links = self.memberships_mut(kind).ok_or_else(|| {
            StoreError::new(format!("{} rows have no group memberships", variant))
        })?;
        links.retain(|(id, _)| *id != row_id);
        links.extend(group_ids.iter().map(|g| (row_id, RowId::from(*g))));
        Ok(())
    }

    pub(crate) fn delete(&mut self, variant: ListVariant, argument: &str) -> Result<(), StoreError> {
        let kind = TableKind::of(variant);
        let target_type = match kind {
            TableKind::Domain => Some(variant.domain_type().ok_or_else(|| read_only(variant))?),
            TableKind::Group | TableKind::Adlist | TableKind::Client => None,
        };

        let id = self
            .table(kind)
            .find(argument, target_type)
            .ok_or_else(|| not_found(argument))?;
        self.table_mut(kind).rows.remove(&id);

        if let Some(links) = self.memberships_mut(kind) {
            links.retain(|(row, _)| *row != id);
        }
        if kind == TableKind::Group {
            self.domainlist_by_group.retain(|(_, group)| *group != id);
            self.client_by_group.retain(|(_, group)| *group != id);
        }
        Ok(())
    }
}

fn read_only(variant: ListVariant) -> StoreError {
    StoreError::new(format!("{} spans several list types and cannot be modified", variant))
}

fn not_found(argument: &str) -> StoreError {
    StoreError::new(format!("no such item '{}'", argument))
}

/// Cursor over rows captured when it was opened
#[derive(Debug)]
pub struct SnapshotCursor {
    rows: std::vec::IntoIter<TableRow>,
    finalized: bool,
}

impl SnapshotCursor {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl RowCursor for SnapshotCursor {
    fn next_row(&mut self) -> Option<TableRow> {
        if self.finalized {
            return None;
        }
        self.rows.next()
    }

    fn take_error(&mut self) -> Option<StoreError> {
        None
    }

    fn finalize(&mut self) {
        if !self.finalized {
            self.finalized = true;
            // Drop any rows that were never read
            self.rows = Vec::new().into_iter();
        }
    }
}
