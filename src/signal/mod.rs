pub(crate) mod config;
mod core;
mod engine;
pub(crate) mod error;
pub(crate) mod process;
mod state;

pub use config::BeaconConfig;
pub use core::{BlinkPattern, Rgb, SignalState, ThresholdBand, ThresholdTable};
pub use engine::{BeaconController, BeaconEngine};
pub use state::{BeaconReader, BeaconReceiver, BeaconStatus, BeaconStatusNotRunning, BeaconUpdate};
