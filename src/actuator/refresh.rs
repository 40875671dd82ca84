use log::{debug, warn};
use tokio::{
    sync::{broadcast, watch},
    time::{self, MissedTickBehavior},
};

use crate::{
    signal::{SignalState, config::BeaconProcessConfig},
    util::AbortOnDropHandle,
};

use super::WrappedActuator;

/// Long-lived task that re-asserts the current visual intent to the
/// actuator on a fixed cadence.
///
/// The actuator channel is owned exclusively by this task; the poll loop
/// only ever updates the intent through the watch channel. One tick issues
/// exactly one command sequence and awaits it in full, so commands never
/// overlap even when a pulse takes longer than a tick.
pub(crate) struct RefreshProcess {
    config: BeaconProcessConfig,
    actuator: WrappedActuator,
    intent_rx: watch::Receiver<SignalState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RefreshProcess {
    pub fn spawn(
        config: BeaconProcessConfig,
        actuator: WrappedActuator,
        intent_rx: watch::Receiver<SignalState>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> AbortOnDropHandle<()> {
        tokio::spawn(async move {
            let process = Self {
                config,
                actuator,
                intent_rx,
                shutdown_tx,
            };

            process.run().await
        })
        .into()
    }

    async fn run(mut self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let mut ticker = time::interval(self.config.refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // A torn read is impossible: the watch slot is replaced
                    // whole by the poll loop.
                    let state = *self.intent_rx.borrow_and_update();

                    let result = match state.blink() {
                        Some(pattern) => self.actuator.blink(state.color(), pattern).await,
                        None => self.actuator.set_color(state.color()).await,
                    };

                    // Runtime actuator trouble is never fatal; the same
                    // intent is simply re-issued on the next tick.
                    if let Err(e) = result {
                        warn!("actuator command failed, retrying next tick: {e}");
                    }
                }
                _ = shutdown_rx.recv() => {
                    if let Some(rest_color) = self.config.shutdown_color() {
                        debug!("shutting down, resting actuator on {rest_color}");
                        if let Err(e) = self.actuator.set_color(rest_color).await {
                            warn!("failed to rest actuator at shutdown: {e}");
                        }
                    }
                    return;
                }
            }
        }
    }
}
