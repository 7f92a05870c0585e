use super::{Facility, SyslogListenerBuilder};
use crate::listener::Listener;
use crate::types::Severity;
use libc::{c_char, c_int};
use once_cell::sync::Lazy;
use std::ffi::{CStr, CString};
use std::fmt;
use std::mem;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use super::mock::{self, closelog, openlog, syslog};
#[cfg(not(test))]
use libc::{closelog, openlog, syslog};

/// Keeps track of which `ident` string was most recently passed to `openlog`.
///
/// The mutex is locked while calling `openlog` or `closelog`. It holds the
/// address of the `ident` string most recently passed to `openlog`, stored as
/// a `usize` because pointers are `!Send`. It is only compared, never
/// dereferenced.
///
/// Some libc implementations keep the `ident` pointer instead of copying the
/// string, so an `ident` must not be freed while it is the current one unless
/// `closelog` is called first.
#[allow(clippy::mutex_atomic)]
static LAST_UNIQUE_IDENT: Lazy<Mutex<usize>> =
    Lazy::new(|| Mutex::new(ptr::null::<c_char>() as usize));

/// A listener that sends every message to syslog.
///
/// The syslog session is opened when the listener is made and closed when it
/// is dropped.
///
/// # Example
///
/// ```
/// use logcast::Registry;
/// use logcast::syslog::SyslogListener;
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let syslog = Arc::new(SyslogListener::new("logcast-example-app"));
/// registry.add_listener(&syslog);
/// ```
pub struct SyslogListener {
    /// Kept alive so that `closelog` can be called, if necessary, before the
    /// string is freed.
    ident: Box<CStr>,
}

impl SyslogListener {
    /// Opens a syslog session tagged with `identity`, with the process ID
    /// included, connecting immediately, on the `daemon` facility.
    ///
    /// Null bytes in `identity` are removed.
    pub fn new(identity: &str) -> Self {
        Self::open(
            to_cstring_lossy(identity.to_owned()),
            libc::LOG_PID | libc::LOG_NDELAY,
            Facility::Daemon,
        )
    }

    /// Returns the builder of syslog listeners.
    pub fn builder(identity: impl Into<String>) -> SyslogListenerBuilder {
        SyslogListenerBuilder::new(identity)
    }

    pub(super) fn open(ident: CString, option: c_int, facility: Facility) -> Self {
        let ident = ident.into_boxed_c_str();
        {
            let mut last_unique_ident: MutexGuard<usize> = LAST_UNIQUE_IDENT
                .lock()
                .unwrap_or_else(|e| e.into_inner());

            // `openlog` has to happen *before* the previous `ident` string
            // can be freed.
            unsafe {
                openlog(ident.as_ptr(), option, facility.into());
            }
            *last_unique_ident = ident.as_ptr() as usize;
        }
        SyslogListener { ident }
    }

    /// Returns the identity messages are tagged with.
    pub fn identity(&self) -> String {
        self.ident.to_string_lossy().into_owned()
    }
}

impl Drop for SyslogListener {
    fn drop(&mut self) {
        let mut last_unique_ident: MutexGuard<usize> = match LAST_UNIQUE_IDENT.lock() {
            Ok(locked) => locked,

            // A panic may have happened between `openlog` and the update of
            // the stored pointer. Leaking the string is the only safe option.
            Err(_) => {
                let ident = mem::replace(&mut self.ident, CString::default().into_boxed_c_str());
                mem::forget(ident);
                return;
            }
        };

        if self.ident.as_ptr() as usize == *last_unique_ident {
            // Ours was the most recent `openlog`, so it must be closed before
            // the string is dropped. Another listener created later will
            // have replaced it, in which case its session stays open.
            unsafe {
                closelog();
            }
            *last_unique_ident = ptr::null::<c_char>() as usize;
        }

        #[cfg(test)]
        mock::release(self.ident.as_ptr());
    }
}

impl fmt::Debug for SyslogListener {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SyslogListener")
            .field("ident", &self.ident)
            .finish()
    }
}

impl Listener for SyslogListener {
    fn notify(&self, message: &str, level: Severity) {
        let msg = to_cstring_lossy(message.to_owned());
        unsafe {
            syslog(
                priority(level),
                CStr::from_bytes_with_nul_unchecked(b"%s\0").as_ptr(),
                msg.as_ptr(),
            );
        }
    }
}

/// Maps a severity to the syslog priority it is reported with.
pub fn priority(level: Severity) -> c_int {
    match level {
        Severity::Critical => libc::LOG_CRIT,
        Severity::Error => libc::LOG_ERR,
        Severity::Warning => libc::LOG_WARNING,
        Severity::Info => libc::LOG_INFO,
        Severity::Debug | Severity::Debug1 | Severity::Debug2 => libc::LOG_DEBUG,
    }
}

/// Converts a `String` to a `CString`, stripping null bytes in the middle.
fn to_cstring_lossy(s: String) -> CString {
    let mut s: Vec<u8> = s.into();
    s.retain(|b| *b != 0);

    // Sound because every null byte was just stripped.
    unsafe { CString::from_vec_unchecked(s) }
}
