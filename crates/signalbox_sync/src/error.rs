//! # Sync Error Types

use thiserror::Error;

/// Errors returned by the blocking queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// The queue was closed. Sends are rejected, and receives fail once
    /// the remaining elements have been drained.
    #[error("queue closed")]
    Closed,
}

/// Result type for queue operations.
pub type SyncResult<T> = Result<T, SyncError>;
