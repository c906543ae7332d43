// # listapi-core
//
// Core library for the list configuration HTTP resource layer.
//
// ## Architecture Overview
//
// This library exposes CRUD operations over the list tables of a
// domain-blocking system (domain allow/deny lists, groups, adlists, clients):
// - **ListVariant**: Closed set of list identities a request can address
// - **Router**: Maps a request path onto a variant and an optional item argument
// - **Dispatcher**: Auth gate plus method dispatch to reader, writer, and remover
// - **TableReader / TableWriter / TableRemover**: The three table operations
// - **Codec**: Projects store rows into their per-variant JSON shape
// - **ListStore**: Trait for the relational collaborator that owns all rows
//
// ## Request Flow
//
// ```text
// ApiRequest ──► ClientAuth ──► router::resolve ──► method branch
//                                                      │
//                   ┌──────────────────┬───────────────┴──┐
//                   ▼                  ▼                  ▼
//              TableReader        TableWriter        TableRemover
//                   │                  │                  │
//                   └──────────► ListStore ◄──────────────┘
// ```
//
// Every call into the store is a plain blocking call. The layer holds no state
// between requests; each request observes a fresh read.

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod router;
pub mod store;
pub mod table;
pub mod traits;
pub mod variant;

// Re-export core types for convenience
pub use config::{AuthConfig, ListApiConfig, StoreConfig};
pub use dispatcher::Dispatcher;
pub use error::{ApiError, Error, Result, StoreError};
pub use request::{ApiRequest, ApiResponse, Method};
pub use store::{FileListStore, MemoryListStore};
pub use traits::{ClientAuth, ListStore, RowCursor, RowWrite, TableRow, WriteMode};
pub use variant::{DomainType, Kind, ListVariant, Scope};
