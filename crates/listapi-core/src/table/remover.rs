//! Table remover

use tracing::{debug, info};

use crate::error::ApiError;
use crate::request::ApiResponse;
use crate::traits::ListStore;
use crate::variant::ListVariant;

/// Deletes rows from a store
pub struct TableRemover<'a> {
    store: &'a dyn ListStore,
}

impl<'a> TableRemover<'a> {
    pub fn new(store: &'a dyn ListStore) -> Self {
        Self { store }
    }

    /// Delete the row identified by `argument`
    ///
    /// A missing row is a failure, so a repeated delete fails.
    pub fn remove(&self, variant: ListVariant, argument: &str) -> Result<ApiResponse, ApiError> {
        match self.store.delete(variant, argument) {
            Ok(()) => {
                info!(%variant, argument, "Item removed");
                Ok(ApiResponse::no_content())
            }
            Err(e) => {
                debug!(%variant, argument, error = %e, "Delete rejected");
                Err(ApiError::database(
                    "Could not remove item from database table",
                    Some(argument),
                    &e,
                ))
            }
        }
    }
}
