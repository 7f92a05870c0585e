//! Console listener.
use crate::listener::Listener;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// A listener that writes messages verbatim to the standard streams.
///
/// `Critical` and `Error` messages go to the standard error, everything else
/// to the standard output. No newline is added.
pub struct ConsoleListener {
    stdout: Mutex<Box<dyn Write + Send>>,
    stderr: Mutex<Box<dyn Write + Send>>,
}
impl ConsoleListener {
    /// Makes a new `ConsoleListener` writing to the process' standard streams.
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }

    /// Makes a new `ConsoleListener` with replacement streams.
    pub fn with_writers<O, E>(stdout: O, stderr: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        ConsoleListener {
            stdout: Mutex::new(Box::new(stdout)),
            stderr: Mutex::new(Box::new(stderr)),
        }
    }
}
impl Default for ConsoleListener {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Debug for ConsoleListener {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConsoleListener").finish()
    }
}
impl Listener for ConsoleListener {
    fn notify(&self, message: &str, level: Severity) {
        let stream = match Destination::for_level(level) {
            Destination::Stdout => &self.stdout,
            Destination::Stderr => &self.stderr,
        };
        let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = stream.write_all(message.as_bytes());
        let _ = stream.flush();
    }
}

/// The stream a console message is written to.
///
/// # Examples
///
/// ```
/// use logcast::console::Destination;
/// use logcast::types::Severity;
///
/// assert_eq!(Destination::for_level(Severity::Error), Destination::Stderr);
/// assert_eq!(Destination::for_level(Severity::Warning), Destination::Stdout);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,

    /// Standard error.
    Stderr,
}
impl Destination {
    /// Returns the stream used for messages of `level`.
    pub fn for_level(level: Severity) -> Self {
        if level <= Severity::Error {
            Destination::Stderr
        } else {
            Destination::Stdout
        }
    }
}

/// The configuration of `ConsoleListener`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ConsoleListenerConfig {}
impl ConsoleListenerConfig {
    /// Creates a new `ConsoleListenerConfig`.
    pub fn new() -> Self {
        Default::default()
    }
}
