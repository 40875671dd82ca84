use tokio::time;

use super::core::{Rgb, ThresholdTable};

/// Configuration for the beacon engine.
#[derive(Clone, Debug)]
pub struct BeaconConfig {
    poll_interval: time::Duration,
    refresh_interval: time::Duration,
    thresholds: ThresholdTable,
    restart_interval: time::Duration,
    shutdown_timeout: time::Duration,
    shutdown_color: Option<Rgb>,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            poll_interval: time::Duration::from_secs(10),
            refresh_interval: time::Duration::from_secs(1),
            thresholds: ThresholdTable::default(),
            restart_interval: time::Duration::from_secs(10),
            shutdown_timeout: time::Duration::from_secs(6),
            shutdown_color: Some(Rgb::OFF),
        }
    }
}

impl BeaconConfig {
    /// Returns the interval between feed polls.
    pub fn poll_interval(&self) -> time::Duration {
        self.poll_interval
    }

    /// Returns the interval at which the current intent is re-asserted to
    /// the actuator.
    pub fn refresh_interval(&self) -> time::Duration {
        self.refresh_interval
    }

    /// Returns the seconds-to-state mapping.
    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Returns the pause before the poll process restarts after a
    /// recoverable error.
    pub fn restart_interval(&self) -> time::Duration {
        self.restart_interval
    }

    /// Returns the timeout for graceful shutdown.
    pub fn shutdown_timeout(&self) -> time::Duration {
        self.shutdown_timeout
    }

    /// Returns the color the actuator is left on at shutdown, or `None` to
    /// leave the last state showing.
    pub fn shutdown_color(&self) -> Option<Rgb> {
        self.shutdown_color
    }

    /// Sets the interval between feed polls.
    ///
    /// Default: `10` seconds
    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval = time::Duration::from_secs(secs);
        self
    }

    /// Sets the actuator refresh interval.
    ///
    /// Default: `1` second
    pub fn with_refresh_interval(mut self, millis: u64) -> Self {
        self.refresh_interval = time::Duration::from_millis(millis);
        self
    }

    /// Sets the seconds-to-state mapping.
    ///
    /// Default: [`ThresholdTable::default`]
    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets the pause before the poll process restarts after a recoverable
    /// error.
    ///
    /// Default: `10` seconds
    pub fn with_restart_interval(mut self, secs: u64) -> Self {
        self.restart_interval = time::Duration::from_secs(secs);
        self
    }

    /// Sets the timeout for graceful shutdown.
    ///
    /// Default: `6` seconds
    pub fn with_shutdown_timeout(mut self, secs: u64) -> Self {
        self.shutdown_timeout = time::Duration::from_secs(secs);
        self
    }

    /// Sets the color the actuator falls back to at shutdown. `None` leaves
    /// the last state showing.
    ///
    /// Default: `Some(Rgb::OFF)`
    pub fn with_shutdown_color(mut self, color: Option<Rgb>) -> Self {
        self.shutdown_color = color;
        self
    }
}

/// The subset of [`BeaconConfig`] the spawned processes need.
#[derive(Clone, Debug)]
pub(crate) struct BeaconProcessConfig {
    poll_interval: time::Duration,
    refresh_interval: time::Duration,
    thresholds: ThresholdTable,
    restart_interval: time::Duration,
    shutdown_color: Option<Rgb>,
}

impl From<&BeaconConfig> for BeaconProcessConfig {
    fn from(config: &BeaconConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            refresh_interval: config.refresh_interval,
            thresholds: config.thresholds.clone(),
            restart_interval: config.restart_interval,
            shutdown_color: config.shutdown_color,
        }
    }
}

impl BeaconProcessConfig {
    pub fn poll_interval(&self) -> time::Duration {
        self.poll_interval
    }

    pub fn refresh_interval(&self) -> time::Duration {
        self.refresh_interval
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn restart_interval(&self) -> time::Duration {
        self.restart_interval
    }

    pub fn shutdown_color(&self) -> Option<Rgb> {
        self.shutdown_color
    }
}

/// The subset of [`BeaconConfig`] the controller needs after start.
#[derive(Clone, Debug)]
pub(crate) struct BeaconControllerConfig {
    shutdown_timeout: time::Duration,
}

impl From<&BeaconConfig> for BeaconControllerConfig {
    fn from(config: &BeaconConfig) -> Self {
        Self {
            shutdown_timeout: config.shutdown_timeout,
        }
    }
}

impl BeaconControllerConfig {
    pub fn shutdown_timeout(&self) -> time::Duration {
        self.shutdown_timeout
    }
}
