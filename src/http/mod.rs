//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod cookie;
pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::FormData;
pub use response::{
    append_set_cookie, build_400_response, build_405_response, build_413_response,
    build_health_response, build_html_response, build_redirect_response,
};
