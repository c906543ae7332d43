//! Configuration types for the list API
//!
//! This module defines the configuration structures used to assemble a
//! [`Dispatcher`](crate::Dispatcher): which store backs the tables and how
//! callers are authorized.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::traits::{AllowAll, ClientAuth, StaticToken};

/// Main list API configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListApiConfig {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Caller authorization
    #[serde(default)]
    pub auth: AuthConfig,
}

impl ListApiConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    /// Build the authorizer described by `auth`
    pub fn client_auth(&self) -> Arc<dyn ClientAuth> {
        match &self.auth.api_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(AllowAll),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Tables live in memory and are lost on exit
    #[default]
    Memory,

    /// Tables persisted to a JSON file
    File {
        /// Path to the store file
        path: String,
    },
}

impl StoreConfig {
    /// Validate store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            Self::Memory => Ok(()),
            Self::File { path } => {
                if path.trim().is_empty() {
                    return Err(crate::Error::config("Store file path cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            Self::Memory => "memory",
            Self::File { .. } => "file",
        }
    }
}

/// Caller authorization settings
///
/// Without a token every caller is authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token callers must present
    #[serde(default)]
    pub api_token: Option<String>,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.as_deref().is_some_and(str::is_empty) {
            return Err(crate::Error::config("API token cannot be empty"));
        }
        Ok(())
    }
}
