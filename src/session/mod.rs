//! Session module
//!
//! Server-side per-client state keyed by a signed cookie token.

mod flash;
mod store;

pub use flash::{Flash, Severity};
pub use store::{CookieUpdate, SessionStore};

/// Per-client session payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    logged_in: bool,
    username: Option<String>,
    flashes: Vec<Flash>,
}

impl Session {
    pub const fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Mark the session authenticated as `username`
    pub fn log_in(&mut self, username: &str) {
        self.logged_in = true;
        self.username = Some(username.to_string());
    }

    /// Drop everything, including pending flashes
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn flash(&mut self, severity: Severity, message: impl Into<String>) {
        self.flashes.push(Flash {
            severity,
            message: message.into(),
        });
    }

    /// Consume pending flashes
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn is_empty(&self) -> bool {
        !self.logged_in && self.username.is_none() && self.flashes.is_empty()
    }
}
