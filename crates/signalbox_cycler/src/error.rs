//! # Cycler Error Types
//!
//! All errors that can occur while configuring, starting, or waiting on a
//! phase cycler.

use signalbox_sync::SyncError;
use thiserror::Error;

/// Errors that can occur in the phase cycler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CyclerError {
    /// `start` was called on a cycler that is already running.
    #[error("phase cycler already started")]
    AlreadyStarted,

    /// The cycler was shut down. Returned to blocked waiters and to
    /// `start` calls made after shutdown.
    #[error("phase cycler shut down")]
    ShutDown,

    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Config(String),

    /// The background thread could not be spawned.
    #[error("failed to spawn cycler thread: {0}")]
    Spawn(String),
}

impl From<SyncError> for CyclerError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Closed => Self::ShutDown,
        }
    }
}

/// Result type for cycler operations.
pub type CyclerResult<T> = Result<T, CyclerError>;
