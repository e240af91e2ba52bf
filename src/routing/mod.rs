//! Routing module
//!
//! Maps request paths to application endpoints and records which methods
//! each endpoint accepts and whether it sits behind the login gate.

mod matcher;

pub use matcher::{match_path, Endpoint};
