#![doc = include_str!("../README.md")]

/// Exports the [`Actuator`] trait and the `blink1-tool` implementation.
///
/// [`Actuator`]: crate::actuator::Actuator
pub mod actuator;
/// Exports [`FeedRepository`] and the feed client and models.
///
/// [`FeedRepository`]: crate::feed::FeedRepository
pub mod feed;
/// Exports [`DepartureSelector`], the direction/line filter and
/// proximity-skip rule.
///
/// [`DepartureSelector`]: crate::select::DepartureSelector
pub mod select;
/// Exports [`BeaconEngine`], the threshold table and other types related to
/// the signal state engine.
///
/// [`BeaconEngine`]: crate::signal::BeaconEngine
pub mod signal;
mod util;

/// Error types returned by `departure-beacon`.
pub mod error {
    pub use super::actuator::error::ActuatorError;
    pub use super::feed::error::{FeedError, UnknownDirectionCode};
    pub use super::signal::{
        error::{BeaconError, ThresholdTableValidationError},
        process::error::{
            BeaconProcessError, BeaconProcessFatalError, BeaconProcessRecoverableError,
        },
    };
    pub use super::util::PanicPayload;

    /// Convenience general-purpose Result type alias.
    pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
}
