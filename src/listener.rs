//! The capability every sink implements.
use crate::types::Severity;
use std::sync::Arc;

/// A receiver of finished log messages.
///
/// `notify` is called once per dispatched message, with the full message
/// text (timestamp and severity header included) and its severity.
///
/// Implementations must not panic and must not report failures back: a sink
/// that cannot record a message simply drops it.
pub trait Listener: Send + Sync {
    /// Receives a finished log message.
    fn notify(&self, message: &str, level: Severity);
}

impl<T: Listener + ?Sized> Listener for Box<T> {
    fn notify(&self, message: &str, level: Severity) {
        (**self).notify(message, level)
    }
}

impl<T: Listener + ?Sized> Listener for Arc<T> {
    fn notify(&self, message: &str, level: Severity) {
        (**self).notify(message, level)
    }
}
