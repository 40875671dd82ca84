use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::broadcast;

use super::{
    core::SignalState,
    process::error::{BeaconProcessFatalError, BeaconProcessRecoverableError},
};

/// Detailed status while the beacon is not actively running.
#[derive(Debug, Clone)]
pub enum BeaconStatusNotRunning {
    /// The beacon has not been started yet.
    NotInitiated,
    /// The beacon processes are initializing.
    Starting,
    /// The poll process hit a recoverable error and will restart.
    Failed(Arc<BeaconProcessRecoverableError>),
    /// The poll process is restarting after an error.
    Restarting,
}

impl fmt::Display for BeaconStatusNotRunning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitiated => write!(f, "Not initiated"),
            Self::Starting => write!(f, "Starting"),
            Self::Failed(error) => write!(f, "Failed: {error}"),
            Self::Restarting => write!(f, "Restarting"),
        }
    }
}

/// Overall status of the beacon processes.
#[derive(Debug, Clone)]
pub enum BeaconStatus {
    /// The beacon is not actively polling and refreshing.
    NotRunning(BeaconStatusNotRunning),
    /// Polling and actuator refresh are both active.
    Running,
    /// Shutdown has been requested and is in progress.
    ShutdownInitiated,
    /// The beacon has been gracefully shut down.
    Shutdown,
    /// The beacon terminated due to a fatal error.
    Terminated(Arc<BeaconProcessFatalError>),
}

impl BeaconStatus {
    /// Returns `true` if the beacon has stopped, either shut down or
    /// terminated.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Shutdown | Self::Terminated(_))
    }
}

impl fmt::Display for BeaconStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning(status) => write!(f, "Not running ({status})"),
            Self::Running => write!(f, "Running"),
            Self::ShutdownInitiated => write!(f, "Shutdown initiated"),
            Self::Shutdown => write!(f, "Shutdown"),
            Self::Terminated(error) => write!(f, "Terminated: {error}"),
        }
    }
}

impl From<BeaconStatusNotRunning> for BeaconStatus {
    fn from(value: BeaconStatusNotRunning) -> Self {
        Self::NotRunning(value)
    }
}

impl From<BeaconProcessRecoverableError> for BeaconStatus {
    fn from(value: BeaconProcessRecoverableError) -> Self {
        BeaconStatusNotRunning::Failed(Arc::new(value)).into()
    }
}

impl From<Arc<BeaconProcessFatalError>> for BeaconStatus {
    fn from(value: Arc<BeaconProcessFatalError>) -> Self {
        Self::Terminated(value)
    }
}

impl From<BeaconProcessFatalError> for BeaconStatus {
    fn from(value: BeaconProcessFatalError) -> Self {
        Arc::new(value).into()
    }
}

/// Update events broadcast by the beacon.
#[derive(Debug, Clone)]
pub enum BeaconUpdate {
    /// The beacon status has changed.
    Status(BeaconStatus),
    /// The poll loop derived a new visual intent from the feed.
    Intent(SignalState),
}

impl From<BeaconStatus> for BeaconUpdate {
    fn from(value: BeaconStatus) -> Self {
        Self::Status(value)
    }
}

pub(crate) type BeaconTransmitter = broadcast::Sender<BeaconUpdate>;

/// Receiver for subscribing to [`BeaconUpdate`]s.
pub type BeaconReceiver = broadcast::Receiver<BeaconUpdate>;

/// Read-only interface to beacon status and updates.
pub trait BeaconReader: Send + Sync + 'static {
    /// Creates a new [`BeaconReceiver`] for subscribing to updates.
    fn update_receiver(&self) -> BeaconReceiver;

    /// Returns the current [`BeaconStatus`] as a snapshot.
    fn status_snapshot(&self) -> BeaconStatus;
}

#[derive(Debug)]
pub(crate) struct BeaconStatusManager {
    status: Mutex<BeaconStatus>,
    update_tx: BeaconTransmitter,
}

impl BeaconStatusManager {
    pub fn new(update_tx: BeaconTransmitter) -> Arc<Self> {
        let status = Mutex::new(BeaconStatusNotRunning::NotInitiated.into());

        Arc::new(Self { status, update_tx })
    }

    fn lock_status(&self) -> MutexGuard<'_, BeaconStatus> {
        self.status
            .lock()
            .expect("`BeaconStatusManager` mutex can't be poisoned")
    }

    pub fn update(&self, new_status: BeaconStatus) {
        let mut status_guard = self.lock_status();
        *status_guard = new_status.clone();
        drop(status_guard);

        // Ignore no-receivers errors
        let _ = self.update_tx.send(new_status.into());
    }
}

impl BeaconReader for BeaconStatusManager {
    fn update_receiver(&self) -> BeaconReceiver {
        self.update_tx.subscribe()
    }

    fn status_snapshot(&self) -> BeaconStatus {
        self.lock_status().clone()
    }
}
