use std::sync::{Arc, Mutex};

use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        watch,
    },
    time,
};

use crate::{
    actuator::{Actuator, WrappedActuator, refresh::RefreshProcess},
    feed::FeedRepository,
    select::DepartureSelector,
    util::AbortOnDropHandle,
};

use super::{
    config::{BeaconConfig, BeaconControllerConfig},
    error::{BeaconError, Result},
    process::{PollProcess, error::BeaconProcessFatalError},
    state::{
        BeaconReader, BeaconReceiver, BeaconStatus, BeaconStatusManager, BeaconTransmitter,
        BeaconUpdate,
    },
};

/// Controller for a running beacon.
///
/// Provides status monitoring and graceful shutdown for the two tasks
/// spawned by [`BeaconEngine::start`]. There is deliberately no global
/// instance; whoever needs to stop the beacon holds (a clone of) this
/// handle.
#[derive(Debug)]
pub struct BeaconController {
    config: BeaconControllerConfig,
    handles: Mutex<Option<BeaconHandles>>,
    shutdown_tx: broadcast::Sender<()>,
    status_manager: Arc<BeaconStatusManager>,
}

#[derive(Debug)]
struct BeaconHandles {
    poll: AbortOnDropHandle<()>,
    refresh: AbortOnDropHandle<()>,
}

impl BeaconController {
    fn new(
        config: &BeaconConfig,
        handles: BeaconHandles,
        shutdown_tx: broadcast::Sender<()>,
        status_manager: Arc<BeaconStatusManager>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: config.into(),
            handles: Mutex::new(Some(handles)),
            shutdown_tx,
            status_manager,
        })
    }

    /// Returns a [`BeaconReader`] interface for accessing status and
    /// updates.
    pub fn reader(&self) -> Arc<dyn BeaconReader> {
        self.status_manager.clone()
    }

    /// Creates a new [`BeaconReceiver`] for subscribing to status updates
    /// and intent changes.
    pub fn update_receiver(&self) -> BeaconReceiver {
        self.status_manager.update_receiver()
    }

    /// Returns the current [`BeaconStatus`] as a snapshot.
    pub fn status_snapshot(&self) -> BeaconStatus {
        self.status_manager.status_snapshot()
    }

    fn try_consume_handles(&self) -> Option<BeaconHandles> {
        self.handles
            .lock()
            .expect("`BeaconController` mutex can't be poisoned")
            .take()
    }

    /// Tries to perform a clean shutdown of both beacon tasks and consumes
    /// their handles.
    ///
    /// The refresh task gets to issue its final rest-color command before
    /// the join; if a clean shutdown does not finish within the configured
    /// timeout, the tasks are aborted. This method can only be called once
    /// per controller instance.
    pub async fn shutdown(&self) -> Result<()> {
        let Some(mut handles) = self.try_consume_handles() else {
            return Err(BeaconError::AlreadyShutdown);
        };

        if handles.poll.is_finished() && handles.refresh.is_finished() {
            let status = self.status_manager.status_snapshot();
            return Err(BeaconError::AlreadyTerminated(status));
        }

        self.status_manager.update(BeaconStatus::ShutdownInitiated);

        let shutdown_send_res = self.shutdown_tx.send(()).map_err(|e| {
            handles.poll.abort();
            handles.refresh.abort();
            BeaconProcessFatalError::SendShutdownSignalFailed(e)
        });

        let shutdown_res = match shutdown_send_res {
            Ok(_) => {
                let join_both = async {
                    (&mut handles.poll)
                        .await
                        .map_err(BeaconProcessFatalError::PollTaskJoin)?;
                    (&mut handles.refresh)
                        .await
                        .map_err(BeaconProcessFatalError::RefreshTaskJoin)
                };

                tokio::select! {
                    join_res = join_both => join_res,
                    _ = time::sleep(self.config.shutdown_timeout()) => {
                        handles.poll.abort();
                        handles.refresh.abort();
                        Err(BeaconProcessFatalError::ShutdownTimeout)
                    }
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = shutdown_res {
            let e_ref = Arc::new(e);
            self.status_manager.update(e_ref.clone().into());

            return Err(BeaconError::ShutdownFailed(e_ref));
        }

        self.status_manager.update(BeaconStatus::Shutdown);
        Ok(())
    }

    /// Waits until the beacon has stopped and returns the final status.
    pub async fn until_stopped(&self) -> BeaconStatus {
        let mut update_rx = self.update_receiver();

        let status = self.status_snapshot();
        if status.is_stopped() {
            return status;
        }

        loop {
            match update_rx.recv().await {
                Ok(update) => {
                    if let BeaconUpdate::Status(status) = update
                        && status.is_stopped()
                    {
                        return status;
                    }
                }
                Err(RecvError::Lagged(_)) => {
                    let status = self.status_snapshot();
                    if status.is_stopped() {
                        return status;
                    }
                }
                Err(RecvError::Closed) => return self.status_snapshot(),
            }
        }
    }
}

/// Builder for configuring and starting the beacon.
///
/// Encapsulates the feed repository, the departure selector and the
/// actuator. The poll and refresh tasks are spawned when
/// [`start`](Self::start) is called, and a [`BeaconController`] is returned
/// for monitoring and shutdown.
pub struct BeaconEngine {
    config: BeaconConfig,
    repository: FeedRepository,
    selector: DepartureSelector,
    actuator: WrappedActuator,
    status_manager: Arc<BeaconStatusManager>,
    update_tx: BeaconTransmitter,
}

impl BeaconEngine {
    /// Creates a new beacon engine from its three collaborators.
    pub fn new(
        config: impl Into<BeaconConfig>,
        repository: FeedRepository,
        selector: DepartureSelector,
        actuator: Box<dyn Actuator>,
    ) -> Self {
        let (update_tx, _) = broadcast::channel::<BeaconUpdate>(1_000);

        let status_manager = BeaconStatusManager::new(update_tx.clone());

        Self {
            config: config.into(),
            repository,
            selector,
            actuator: WrappedActuator::new(actuator),
            status_manager,
            update_tx,
        }
    }

    /// Returns a reader interface for accessing status and updates.
    pub fn reader(&self) -> Arc<dyn BeaconReader> {
        self.status_manager.clone()
    }

    /// Creates a new receiver for subscribing to status updates and intent
    /// changes.
    pub fn update_receiver(&self) -> BeaconReceiver {
        self.status_manager.update_receiver()
    }

    /// Starts the poll and refresh tasks and returns a [`BeaconController`]
    /// for managing them.
    ///
    /// This consumes the engine. The intent channel starts out holding the
    /// "no data" state, so the light shows the most urgent color until the
    /// first poll cycle proves otherwise.
    pub fn start(self) -> Arc<BeaconController> {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let initial_state = self.config.thresholds().state_for(None);
        let (intent_tx, intent_rx) = watch::channel(initial_state);

        let refresh = RefreshProcess::spawn(
            (&self.config).into(),
            self.actuator,
            intent_rx,
            shutdown_tx.clone(),
        );

        let poll = PollProcess::spawn(
            (&self.config).into(),
            self.repository,
            self.selector,
            intent_tx,
            shutdown_tx.clone(),
            self.status_manager.clone(),
            self.update_tx,
        );

        BeaconController::new(
            &self.config,
            BeaconHandles { poll, refresh },
            shutdown_tx,
            self.status_manager,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::{Duration, Local};

    use crate::actuator::error::Result as ActuatorResult;
    use crate::feed::{
        Departure, FeedSnapshot, FetchDepartures, JourneyDirection,
        error::Result as FeedResult,
    };
    use crate::select::SelectorConfig;
    use crate::signal::{BlinkPattern, Rgb, SignalState};

    struct StaticFetcher {
        offset_secs: i64,
    }

    #[async_trait]
    impl FetchDepartures for StaticFetcher {
        async fn fetch(&self) -> FeedResult<Arc<FeedSnapshot>> {
            let now = Local::now().naive_local();
            let departure = Departure::new(
                JourneyDirection::Inbound,
                None,
                now + Duration::seconds(self.offset_secs),
            );
            Ok(Arc::new(FeedSnapshot::new(vec![departure], now)))
        }
    }

    #[derive(Clone, Default)]
    struct NullActuator {
        commands: Arc<StdMutex<VecDeque<SignalState>>>,
    }

    #[async_trait]
    impl crate::actuator::Actuator for NullActuator {
        async fn set_color(&self, color: Rgb) -> ActuatorResult<()> {
            self.commands
                .lock()
                .unwrap()
                .push_back(SignalState::steady(color));
            Ok(())
        }

        async fn blink(&self, color: Rgb, pattern: BlinkPattern) -> ActuatorResult<()> {
            self.commands
                .lock()
                .unwrap()
                .push_back(SignalState::blinking(color, pattern));
            Ok(())
        }
    }

    fn engine(offset_secs: i64, actuator: NullActuator) -> BeaconEngine {
        BeaconEngine::new(
            BeaconConfig::default(),
            FeedRepository::new(Box::new(StaticFetcher { offset_secs })),
            DepartureSelector::new(SelectorConfig::new(JourneyDirection::Inbound)),
            Box::new(actuator),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn engine_drives_actuator_from_feed() {
        let actuator = NullActuator::default();
        let controller = engine(841, actuator.clone()).start();

        // First poll at t=0, refresh ticks every second after it.
        time::sleep(time::Duration::from_millis(2500)).await;

        let commands = actuator.commands.lock().unwrap().clone();
        assert!(commands.contains(&SignalState::steady(Rgb::GREEN)));

        controller.shutdown().await.unwrap();
        assert!(controller.status_snapshot().is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_can_only_be_called_once() {
        let controller = engine(841, NullActuator::default()).start();

        time::sleep(time::Duration::from_millis(100)).await;
        controller.shutdown().await.unwrap();

        assert!(matches!(
            controller.shutdown().await,
            Err(BeaconError::AlreadyShutdown)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn until_stopped_returns_after_shutdown() {
        let controller = engine(841, NullActuator::default()).start();

        time::sleep(time::Duration::from_millis(100)).await;

        let waiter = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.until_stopped().await })
        };

        controller.shutdown().await.unwrap();

        let final_status = waiter.await.unwrap();
        assert!(final_status.is_stopped());
    }
}
