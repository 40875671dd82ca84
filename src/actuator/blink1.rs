use async_trait::async_trait;
use tokio::{process::Command, time};

use crate::signal::{BlinkPattern, Rgb};

use super::{
    Actuator,
    error::{ActuatorError, Result},
};

const DEFAULT_PROGRAM: &str = "blink1-tool";
const DEFAULT_FADE_MILLIS: u64 = 900;
const DEFAULT_PULSE_FADE_MILLIS: u64 = 400;

/// Configuration for the [`Blink1Tool`] actuator.
#[derive(Clone, Debug)]
pub struct Blink1ToolConfig {
    program: String,
    fade_millis: u64,
    pulse_fade_millis: u64,
}

impl Default for Blink1ToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            fade_millis: DEFAULT_FADE_MILLIS,
            pulse_fade_millis: DEFAULT_PULSE_FADE_MILLIS,
        }
    }
}

impl Blink1ToolConfig {
    /// Returns the `blink1-tool` executable name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the fade time for steady color changes, in milliseconds.
    pub fn fade_millis(&self) -> u64 {
        self.fade_millis
    }

    /// Returns the fade time for each half of a pulse, in milliseconds.
    pub fn pulse_fade_millis(&self) -> u64 {
        self.pulse_fade_millis
    }

    /// Sets the `blink1-tool` executable name or path.
    ///
    /// Default: `blink1-tool`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the fade time for steady color changes.
    ///
    /// Default: `900` milliseconds
    pub fn with_fade_millis(mut self, millis: u64) -> Self {
        self.fade_millis = millis;
        self
    }

    /// Sets the fade time for each half of a pulse.
    ///
    /// Default: `400` milliseconds
    pub fn with_pulse_fade_millis(mut self, millis: u64) -> Self {
        self.pulse_fade_millis = millis;
        self
    }
}

/// [`Actuator`] driving a blink(1) device through the external `blink1-tool`
/// command-line program.
///
/// Each operation is one or more short-lived `blink1-tool` invocations. The
/// pulse is produced sequentially (fade to off, settle, fade back to the
/// color), so a [`blink`](Actuator::blink) call always ends on the lit half.
pub struct Blink1Tool {
    config: Blink1ToolConfig,
}

impl Blink1Tool {
    /// Probes for a blink(1) device and returns the actuator.
    ///
    /// Fails with [`ActuatorError::Unavailable`] when the tool cannot be run
    /// or lists no device. Callers treat that as fatal at startup: a beacon
    /// without a light is useless.
    pub async fn acquire(config: Blink1ToolConfig) -> Result<Self> {
        let output = Command::new(config.program())
            .arg("--list")
            .output()
            .await
            .map_err(|e| {
                ActuatorError::Unavailable(format!("cannot run {}: {e}", config.program()))
            })?;

        if !output.status.success() {
            return Err(ActuatorError::Unavailable(format!(
                "{} --list exited with {}",
                config.program(),
                output.status
            )));
        }

        // `blink1-tool --list` exits 0 regardless; only device lines carry a
        // serial number.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.contains("serialnum") {
            return Err(ActuatorError::Unavailable(
                "no blink(1) device found".to_string(),
            ));
        }

        Ok(Self { config })
    }

    async fn fade_to(&self, color: Rgb, fade_millis: u64) -> Result<()> {
        let status = Command::new(self.config.program())
            .args(["--quiet", "--rgb", &color.to_string()])
            .args(["--millis", &fade_millis.to_string()])
            .status()
            .await
            .map_err(ActuatorError::Spawn)?;

        if !status.success() {
            return Err(ActuatorError::Command(status));
        }

        Ok(())
    }
}

#[async_trait]
impl Actuator for Blink1Tool {
    async fn set_color(&self, color: Rgb) -> Result<()> {
        self.fade_to(color, self.config.fade_millis()).await
    }

    async fn blink(&self, color: Rgb, pattern: BlinkPattern) -> Result<()> {
        let settle = pattern.period() / 2;

        for _ in 0..pattern.repetitions() {
            self.fade_to(Rgb::OFF, self.config.pulse_fade_millis())
                .await?;
            time::sleep(settle).await;

            self.fade_to(color, self.config.pulse_fade_millis()).await?;
            time::sleep(settle).await;
        }

        Ok(())
    }
}
