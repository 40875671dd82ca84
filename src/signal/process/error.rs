use std::result;

use thiserror::Error;
use tokio::{
    sync::broadcast::error::{RecvError, SendError},
    task::JoinError,
};

use crate::feed::error::FeedError;

#[derive(Error, Debug)]
pub enum BeaconProcessRecoverableError {
    #[error("[Feed] {0}")]
    Feed(#[from] FeedError),
}

#[derive(Error, Debug)]
pub enum BeaconProcessFatalError {
    #[error("visual intent channel closed, refresh task is gone")]
    IntentChannelClosed,

    #[error("poll task join error: {0}")]
    PollTaskJoin(JoinError),

    #[error("refresh task join error: {0}")]
    RefreshTaskJoin(JoinError),

    #[error("shutdown `RecvError` error: {0}")]
    ShutdownSignalRecv(RecvError),

    #[error("failed to send beacon shutdown request: {0}")]
    SendShutdownSignalFailed(SendError<()>),

    #[error("beacon shutdown timeout")]
    ShutdownTimeout,
}

#[derive(Error, Debug)]
pub enum BeaconProcessError {
    #[error(transparent)]
    Recoverable(#[from] BeaconProcessRecoverableError),

    #[error(transparent)]
    Fatal(#[from] BeaconProcessFatalError),
}

pub(crate) type ProcessResult<T> = result::Result<T, BeaconProcessError>;
