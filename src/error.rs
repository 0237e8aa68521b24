//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Only failures that stop a
//! run before scanning begins live here; a port that does not answer is an
//! outcome, not an error.

use crate::types::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot resolve host '{host}': {reason}")]
    Resolution { host: String, reason: String },

    #[error("invalid port specification: {0}")]
    InvalidPorts(#[from] PortError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write report to {path}: {reason}")]
    Report { path: PathBuf, reason: String },
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
