use std::sync::Arc;

use chrono::Local;
use log::{info, warn};
use tokio::{
    sync::{broadcast, watch},
    time::{self, MissedTickBehavior},
};

use crate::{
    feed::{FeedRepository, error::FeedError},
    select::DepartureSelector,
    util::{AbortOnDropHandle, Never},
};

use super::{
    config::BeaconProcessConfig,
    core::SignalState,
    state::{BeaconStatus, BeaconStatusManager, BeaconStatusNotRunning, BeaconTransmitter, BeaconUpdate},
};

pub(crate) mod error;

use error::{BeaconProcessError, BeaconProcessFatalError, ProcessResult};

/// The poll loop: fetch the feed, reduce it to seconds-until-departure, map
/// that onto a signal state and publish the new intent.
///
/// The refresh task is the only consumer of the intent; this task never
/// talks to the actuator.
pub(super) struct PollProcess {
    config: BeaconProcessConfig,
    repository: FeedRepository,
    selector: DepartureSelector,
    intent_tx: watch::Sender<SignalState>,
    shutdown_tx: broadcast::Sender<()>,
    status_manager: Arc<BeaconStatusManager>,
    update_tx: BeaconTransmitter,
}

impl PollProcess {
    pub fn spawn(
        config: BeaconProcessConfig,
        repository: FeedRepository,
        selector: DepartureSelector,
        intent_tx: watch::Sender<SignalState>,
        shutdown_tx: broadcast::Sender<()>,
        status_manager: Arc<BeaconStatusManager>,
        update_tx: BeaconTransmitter,
    ) -> AbortOnDropHandle<()> {
        tokio::spawn(async move {
            let process = Self {
                config,
                repository,
                selector,
                intent_tx,
                shutdown_tx,
                status_manager,
                update_tx,
            };

            process.recovery_loop().await
        })
        .into()
    }

    async fn run(&mut self) -> ProcessResult<Never> {
        self.status_manager.update(BeaconStatus::Running);

        let mut ticker = time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let snapshot = match self.repository.fetch_and_update().await {
                Ok(snapshot) => snapshot,
                Err(e @ FeedError::Parse(_)) => {
                    // Stale-but-parsed data keeps backing the light; an
                    // unparseable response just skips this cycle.
                    warn!("skipping poll cycle: {e}");
                    continue;
                }
                Err(e) => return Err(BeaconProcessError::Recoverable(e.into())),
            };

            let now = Local::now().naive_local();
            let seconds = self.selector.select(&snapshot, now);
            let state = self.config.thresholds().state_for(seconds);

            match seconds {
                Some(seconds) => {
                    info!("{seconds}s until the next relevant departure, setting {state}")
                }
                None => info!("no relevant departure in the feed, setting {state}"),
            }

            if self.intent_tx.receiver_count() == 0 {
                // The refresh task is gone; the light can no longer follow
                // the intent, so there is no point polling on.
                return Err(BeaconProcessFatalError::IntentChannelClosed.into());
            }
            self.intent_tx.send_replace(state);

            // Ignore no-receivers errors
            let _ = self.update_tx.send(BeaconUpdate::Intent(state));
        }
    }

    async fn recovery_loop(mut self) {
        self.status_manager
            .update(BeaconStatusNotRunning::Starting.into());

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            let process_error = tokio::select! {
                Err(poll_error) = self.run() => poll_error,
                shutdown_res = shutdown_rx.recv() => {
                    let Err(e) = shutdown_res else {
                        // Shutdown signal received
                        return;
                    };

                    BeaconProcessFatalError::ShutdownSignalRecv(e).into()
                }
            };

            match process_error {
                BeaconProcessError::Fatal(err) => {
                    self.status_manager.update(err.into());
                    return;
                }
                BeaconProcessError::Recoverable(err) => {
                    self.status_manager.update(err.into());
                }
            }

            // Handle shutdown signals while waiting for `restart_interval`

            tokio::select! {
                _ = time::sleep(self.config.restart_interval()) => {} // Loop restarts
                shutdown_res = shutdown_rx.recv() => {
                    if let Err(e) = shutdown_res {
                        let status = BeaconProcessFatalError::ShutdownSignalRecv(e).into();
                        self.status_manager.update(status);
                    }
                    return;
                }
            }

            self.status_manager
                .update(BeaconStatusNotRunning::Restarting.into());
        }
    }
}
