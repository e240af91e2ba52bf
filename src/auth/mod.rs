//! Authentication module
//!
//! Password hashing and the login gate applied to author-only routes.

mod guard;
mod password;

pub use guard::require_login;
pub use password::{PasswordError, PasswordHashing};
