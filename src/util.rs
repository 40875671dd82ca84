use std::{
    any::Any,
    fmt,
    future::Future,
    ops::{Deref, DerefMut},
    pin::Pin,
    task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

/// A type that can not be instantiated
pub(crate) enum Never {}

/// A wrapper around `tokio::task::JoinHandle` that aborts the task when the
/// wrapper is dropped, while still allowing access to the handle.
///
/// Calling `abort()` does **not** run destructors or cleanup code, so tasks
/// held through this wrapper should tolerate abrupt cancellation.
#[derive(Debug)]
pub(crate) struct AbortOnDropHandle<T>(JoinHandle<T>);

impl<T> From<JoinHandle<T>> for AbortOnDropHandle<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        Self(handle)
    }
}

impl<T> Deref for AbortOnDropHandle<T> {
    type Target = JoinHandle<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for AbortOnDropHandle<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Future for AbortOnDropHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDropHandle<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Best-effort string rendition of a panic payload, for error reporting.
#[derive(Debug)]
pub struct PanicPayload(String);

impl From<Box<dyn Any + Send>> for PanicPayload {
    fn from(value: Box<dyn Any + Send>) -> Self {
        let panic_msg = if let Some(s) = value.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = value.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };

        Self(panic_msg)
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_downcasts_str_and_string() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(PanicPayload::from(boxed).to_string(), "boom");

        let boxed: Box<dyn Any + Send> = Box::new("boom".to_string());
        assert_eq!(PanicPayload::from(boxed).to_string(), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(PanicPayload::from(boxed).to_string(), "unknown panic payload");
    }
}
