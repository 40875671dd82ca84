use std::{result, sync::Arc};

use thiserror::Error;

use super::{process::error::BeaconProcessFatalError, state::BeaconStatus};

/// Rejected [`ThresholdTable`](super::ThresholdTable) construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdTableValidationError {
    #[error("threshold bands must be strictly descending, found {prev} then {next}")]
    NotDescending { prev: i64, next: i64 },
}

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("beacon already shut down")]
    AlreadyShutdown,

    #[error("beacon already terminated, status: {0}")]
    AlreadyTerminated(BeaconStatus),

    #[error("beacon shutdown procedure failed: {0}")]
    ShutdownFailed(Arc<BeaconProcessFatalError>),
}

pub(super) type Result<T> = result::Result<T, BeaconError>;
