//! Log writer module
//!
//! Builds the sinks the tracing layers write to: an append-mode file when a
//! path is configured, stdout or stderr otherwise.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Fallback stream used when no log file is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Create a writer for `path`, or for `fallback` when no path is set
pub fn make_writer(path: Option<&str>, fallback: Stream) -> io::Result<BoxMakeWriter> {
    let writer = match (path, fallback) {
        (Some(path), _) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        (None, Stream::Stdout) => BoxMakeWriter::new(io::stdout),
        (None, Stream::Stderr) => BoxMakeWriter::new(io::stderr),
    };
    Ok(writer)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
