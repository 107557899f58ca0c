//! Failure taxonomy.
//!
//! Every per-node failure is absorbed into the node it belongs to; only
//! `GraphError` ever stops a build.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The file exists but cannot be read as an executable image.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Failed to open file: {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("File is too small to be an ELF image: {path:?}")]
    FileTooSmall { path: PathBuf },
    #[error("Failed to parse ELF image: {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: goblin::error::Error,
    },
    #[error("Program header out of bounds in {path:?}")]
    Truncated { path: PathBuf },
}

/// Running an external tool went wrong.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} could not be started")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} failed with exit code {code:?}")]
    Failed { program: String, code: Option<i32> },
    #[error("{program} did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
    #[error("I/O error while waiting for {program}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// No owning package could be determined for a file.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("package not found for {path:?}")]
    NotFound { path: PathBuf },
    #[error("package lookup failed for {path:?}")]
    Lookup {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
}

/// The root binary handed to the builder is unusable.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Root binary is not a regular file: {path:?}")]
    NotAFile { path: PathBuf },
    #[error("Root binary cannot be read: {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
