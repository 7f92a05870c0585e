use super::{Facility, SyslogListener};
use crate::{Build, Error, ErrorKind, Result};
use std::ffi::CString;
use trackable::error::ErrorKindExt;

/// A builder of `SyslogListener` instances.
///
/// The defaults match `SyslogListener::new`: the process ID is included, the
/// connection is opened immediately and messages go to the `daemon`
/// facility.
///
/// # Example
///
/// ```
/// use logcast::{Build, Registry};
/// use logcast::syslog::{Facility, SyslogListenerBuilder};
/// use logcast::types::Severity;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), logcast::Error> {
/// let listener = SyslogListenerBuilder::new("logcast-example-app")
///     .facility(Facility::User)
///     .build()?;
///
/// let registry = Registry::new();
/// let _registration = registry.register(Arc::new(listener));
/// registry
///     .statement(Severity::Info)
///     .append("Hello, world! This is a test message from `logcast::syslog`.");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SyslogListenerBuilder {
    ident: String,
    facility: Facility,
    option: libc::c_int,
}

impl SyslogListenerBuilder {
    /// Makes a new `SyslogListenerBuilder` tagging messages with `ident`.
    /// (POSIX calls this the “tag”.)
    ///
    /// The string must not contain any zero (ASCII NUL) bytes, or `build`
    /// fails.
    pub fn new(ident: impl Into<String>) -> Self {
        SyslogListenerBuilder {
            ident: ident.into(),
            facility: Facility::default(),
            option: libc::LOG_PID | libc::LOG_NDELAY,
        }
    }

    /// Sets the syslog facility to send messages to.
    ///
    /// By default, this is the `daemon` facility.
    pub fn facility(&mut self, facility: Facility) -> &mut Self {
        self.facility = facility;
        self
    }

    /// Whether to include the process ID in messages. On by default.
    #[inline]
    pub fn log_pid(&mut self, enabled: bool) -> &mut Self {
        if enabled {
            self.option |= libc::LOG_PID;
        } else {
            self.option &= !libc::LOG_PID;
        }
        self
    }

    /// Immediately open a connection to the syslog server. This is the
    /// default.
    ///
    /// `log_ndelay` and `log_odelay` are mutually exclusive.
    #[inline]
    pub fn log_ndelay(&mut self) -> &mut Self {
        self.option = (self.option & !libc::LOG_ODELAY) | libc::LOG_NDELAY;
        self
    }

    /// *Don't* immediately open a connection to the syslog server. Wait until
    /// the first message is sent before connecting.
    #[inline]
    pub fn log_odelay(&mut self) -> &mut Self {
        self.option = (self.option & !libc::LOG_NDELAY) | libc::LOG_ODELAY;
        self
    }

    /// If a child process is created to send a message, don't wait for it
    /// to exit. Has no effect on any modern system.
    #[inline]
    pub fn log_nowait(&mut self) -> &mut Self {
        self.option |= libc::LOG_NOWAIT;
        self
    }

    /// Also emit messages on `stderr`.
    ///
    /// # Warning
    ///
    /// The libc `syslog` function does not take the lock Rust uses for
    /// `stderr`, so these copies may be interleaved with other output
    /// written to `stderr` at the same time.
    #[inline]
    pub fn log_perror(&mut self) -> &mut Self {
        self.option |= libc::LOG_PERROR;
        self
    }
}

impl Build for SyslogListenerBuilder {
    type Listener = SyslogListener;
    fn build(&self) -> Result<SyslogListener> {
        let ident = track!(CString::new(self.ident.as_str())
            .map_err(|e| Error::from(ErrorKind::Invalid.cause(e))))?;
        Ok(SyslogListener::open(ident, self.option, self.facility))
    }
}
