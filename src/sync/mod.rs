use std::fmt;

pub mod commands;

#[derive(Debug)]
pub struct SyncError;

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sync error")
    }
}

impl std::error::Error for SyncError {}

pub type SyncResult<T> = error_stack::Result<T, SyncError>;

/// Per-reference result of a batch run. Only drives logging and
/// continuation; a failed item never fails the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    SyncFailed,
}
