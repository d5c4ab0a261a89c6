// src/errors.rs

//! Crate-wide error type.
//!
//! The variants follow how `cng` reacts to a failure:
//! - `StartupConfig`: bad invocation, reported with usage help, exit 1.
//! - `WatchSetup`: the watch set could not be built; fatal.
//! - `Spawn` / `Kill`: command lifecycle problems; logged and swallowed by
//!   the event loop, never fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CngError {
    #[error("{0}")]
    StartupConfig(String),

    #[error("Watch setup error: {0}")]
    WatchSetup(String),

    #[error("Failed to spawn command: {0}")]
    Spawn(String),

    #[error("Failed to kill command: {0}")]
    Kill(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Notify error: {0}")]
    NotifyError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CngError {
    /// Whether this error came from a bad invocation (usage help applies).
    pub fn is_usage(&self) -> bool {
        matches!(self, CngError::StartupConfig(_))
    }

    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CngError>;
