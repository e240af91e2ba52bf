//! Request handler module
//!
//! Responsible for request routing dispatch and the page, account and
//! article handlers. Handlers are synchronous functions of the request
//! context and the shared state.

mod accounts;
mod articles;
mod context;
mod pages;
pub mod router;


use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::auth::PasswordError;
use crate::store::StoreError;

pub use context::{RemoteUser, RequestContext};
pub use router::handle_request;

/// Failure a handler cannot turn into a page of its own
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Password(#[from] PasswordError),
}

pub type HandlerResult = Result<Response<Full<Bytes>>, HandlerError>;

/// Parse a path id. Anything that is not a valid row id is treated as absent.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}
