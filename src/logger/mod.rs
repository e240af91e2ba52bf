//! Logger module
//!
//! Installs the tracing subscriber and provides logging utilities for:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::filter::{filter_fn, EnvFilter, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, Layer};
use writer::Stream;

/// Target of access log events, routed to the access log sink only
pub const ACCESS_TARGET: &str = "access";

/// Failure while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log level: {0}")]
    Filter(#[from] ParseError),
    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Access lines go to
/// `access_log_file` (stdout by default); everything else is filtered by
/// `level` and goes to `error_log_file` (stderr by default).
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let access_writer = writer::make_writer(config.access_log_file.as_deref(), Stream::Stdout)?;
    let error_writer = writer::make_writer(config.error_log_file.as_deref(), Stream::Stderr)?;
    let app_filter = EnvFilter::try_new(format!("{},{ACCESS_TARGET}=off", config.level))?;

    let access_layer = fmt::layer()
        .with_writer(access_writer)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));
    let app_layer = fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(app_filter);

    tracing_subscriber::registry()
        .with(access_layer)
        .with(app_layer)
        .try_init()?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Listening on: http://{addr}");
    tracing::info!(
        log_level = %config.logging.level,
        database = %config.database.path,
        workers = ?config.server.workers,
        "Server started"
    );
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    if let Some(ref path) = config.logging.error_log_file {
        tracing::info!("Error log: {path}");
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
