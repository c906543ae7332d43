//! Collaborator traits
//!
//! This module defines the interfaces this layer requires from the outside:
//!
//! - [`ListStore`]: Relational store owning every row
//! - [`RowCursor`]: Iteration state of one read
//! - [`ClientAuth`]: Caller authorization

pub mod client_auth;
pub mod list_store;

pub use client_auth::{AllowAll, ClientAuth, StaticToken};
pub use list_store::{ListStore, RowCursor, RowId, RowWrite, TableRow, WriteMode};
