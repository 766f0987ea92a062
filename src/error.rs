//! Error types shared across the crate.
//!
//! None of these are fatal to the host: callers log them and continue with a
//! shorter pane list, an empty workspace or default configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pane::PaneKind;

/// Failure raised while building a pane from its descriptor.
#[derive(Debug, Error)]
pub enum PaneError {
    #[error("no pane factory registered for kind `{0}`")]
    UnknownKind(PaneKind),
    #[error("failed to construct pane `{kind}`: {reason}")]
    Construction { kind: PaneKind, reason: String },
    #[error("pane `{kind}` rejected its saved state: {reason}")]
    State { kind: PaneKind, reason: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("workspace storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed workspace record for slot {slot}: {source}")]
    Json {
        slot: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("workspace storage worker is no longer running")]
    WorkerGone,
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace slot {slot} is out of range (1..={max})")]
    SlotOutOfRange { slot: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{key}`: {reason}")]
    Value { key: &'static str, reason: String },
}
