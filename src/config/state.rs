// Application state module
// Shared collaborators handed to every request

use super::types::Config;
use crate::auth::{PasswordError, PasswordHashing};
use crate::session::SessionStore;
use crate::store::{Store, StoreError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub sessions: SessionStore,
    pub passwords: PasswordHashing,
}

/// Failure while assembling the application state at startup
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl AppState {
    /// Open the configured store and build the request collaborators
    pub fn new(config: &Config) -> Result<Self, StateError> {
        let store = Store::open(&config.database.path)?;
        Ok(Self::with_store(config, store)?)
    }

    pub fn with_store(config: &Config, store: Store) -> Result<Self, PasswordError> {
        Ok(Self {
            config: config.clone(),
            store,
            sessions: SessionStore::new(&config.session),
            passwords: PasswordHashing::new(&config.security)?,
        })
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        let config = Config::for_tests();
        let store = Store::open(&config.database.path).expect("in-memory store");
        Self::with_store(&config, store).expect("test hashing parameters")
    }
}
