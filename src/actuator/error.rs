use std::{io, process::ExitStatus, result};

use thiserror::Error;

use crate::util::PanicPayload;

#[derive(Error, Debug)]
pub enum ActuatorError {
    /// No usable actuator could be acquired. Fatal at startup.
    #[error("no usable actuator: {0}")]
    Unavailable(String),

    #[error("actuator command could not be spawned: {0}")]
    Spawn(io::Error),

    #[error("actuator command exited with {0}")]
    Command(ExitStatus),

    #[error("`Actuator` implementation panicked: {0}")]
    Panicked(PanicPayload),
}

pub(crate) type Result<T> = result::Result<T, ActuatorError>;
