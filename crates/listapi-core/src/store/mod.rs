// # List Store Implementations
//
// This module provides implementations of the ListStore trait for
// different persistence strategies. Both share one table engine.

pub mod file;
pub mod memory;
mod tables;

pub use file::FileListStore;
pub use memory::MemoryListStore;
pub use tables::SnapshotCursor;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::traits::ListStore;

/// Open the store described by `config`
pub fn open(config: &StoreConfig) -> Result<Arc<dyn ListStore>> {
    match config {
        StoreConfig::Memory => {
            tracing::info!("Using in-memory list store");
            Ok(Arc::new(MemoryListStore::new()))
        }
        StoreConfig::File { path } => {
            tracing::info!("Using file list store at {}", path);
            Ok(Arc::new(FileListStore::open(path)?))
        }
    }
}
