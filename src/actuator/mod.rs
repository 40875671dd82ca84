use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;

use crate::signal::{BlinkPattern, Rgb};

mod blink1;
pub(crate) mod error;
pub(crate) mod refresh;

pub use blink1::{Blink1Tool, Blink1ToolConfig};
pub use error::ActuatorError;

use error::Result;

/// The physical indicator driven by the refresh loop.
///
/// The device is assumed to be best-effort: commands are idempotent and the
/// refresh loop re-issues the current intent on every tick, so an
/// implementation does not need to remember anything between calls. Both
/// operations must finish (or safely give up) before returning; the refresh
/// loop never overlaps commands.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Holds a steady color.
    async fn set_color(&self, color: Rgb) -> Result<()>;

    /// Performs one visible pulse cycle to `color`.
    ///
    /// How the pulse is produced (native device blink, or a sequential
    /// fade-to-off / fade-back) is an implementation detail; the call must
    /// leave the device showing `color`, never the dark half of a pulse.
    async fn blink(&self, color: Rgb, pattern: BlinkPattern) -> Result<()>;
}

/// Panic-protection wrapper around user-provided [`Actuator`] impls.
pub(crate) struct WrappedActuator(Box<dyn Actuator>);

impl WrappedActuator {
    pub fn new(actuator: Box<dyn Actuator>) -> Self {
        Self(actuator)
    }

    pub async fn set_color(&self, color: Rgb) -> Result<()> {
        FutureExt::catch_unwind(AssertUnwindSafe(self.0.set_color(color)))
            .await
            .map_err(|e| ActuatorError::Panicked(e.into()))?
    }

    pub async fn blink(&self, color: Rgb, pattern: BlinkPattern) -> Result<()> {
        FutureExt::catch_unwind(AssertUnwindSafe(self.0.blink(color, pattern)))
            .await
            .map_err(|e| ActuatorError::Panicked(e.into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickyActuator;

    #[async_trait]
    impl Actuator for PanickyActuator {
        async fn set_color(&self, _color: Rgb) -> Result<()> {
            panic!("device driver exploded")
        }

        async fn blink(&self, _color: Rgb, _pattern: BlinkPattern) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn wrapped_actuator_turns_panics_into_errors() {
        let wrapped = WrappedActuator::new(Box::new(PanickyActuator));

        match wrapped.set_color(Rgb::RED).await {
            Err(ActuatorError::Panicked(payload)) => {
                assert!(payload.to_string().contains("device driver exploded"));
            }
            other => panic!("expected panic error, got {other:?}"),
        }

        // An operation that does not panic passes through untouched.
        wrapped.blink(Rgb::RED, BlinkPattern::default()).await.unwrap();
    }
}
