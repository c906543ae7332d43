//! Table operations
//!
//! - [`TableReader`]: Stream rows into a projected JSON array
//! - [`TableWriter`]: Validate a payload, write it, read the result back
//! - [`TableRemover`]: Delete one row

pub mod reader;
pub mod remover;
pub mod writer;

pub use reader::TableReader;
pub use remover::TableRemover;
pub use writer::{TableWriter, WriteInput};
