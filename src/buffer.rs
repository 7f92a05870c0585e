//! In-memory listener.
use crate::listener::Listener;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A listener that accumulates every message it receives in memory.
///
/// # Examples
///
/// ```
/// use logcast::Listener;
/// use logcast::buffer::BufferListener;
/// use logcast::types::Severity;
///
/// let buffer = BufferListener::new();
/// buffer.notify("A", Severity::Info);
/// buffer.notify("B", Severity::Error);
///
/// assert_eq!(buffer.get_buffer(false), "AB");
/// assert_eq!(buffer.get_buffer(true), "AB");
/// assert_eq!(buffer.get_buffer(true), "");
/// ```
#[derive(Debug, Default)]
pub struct BufferListener {
    buffer: Mutex<String>,
}
impl BufferListener {
    /// Makes a new empty `BufferListener`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulated text, emptying the buffer if `clear` is `true`.
    pub fn get_buffer(&self, clear: bool) -> String {
        let mut buffer = self.lock();
        if clear {
            mem::take(&mut *buffer)
        } else {
            buffer.clone()
        }
    }

    /// Empties the buffer.
    pub fn clear_buffer(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
impl Listener for BufferListener {
    fn notify(&self, message: &str, _level: Severity) {
        self.lock().push_str(message);
    }
}

/// The configuration of `BufferListener`.
///
/// It has no settings. A buffer installed from a `LoggingConfig` is read
/// through `Installation::buffer`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct BufferListenerConfig {}
impl BufferListenerConfig {
    /// Creates a new `BufferListenerConfig`.
    pub fn new() -> Self {
        Default::default()
    }
}
