//! A fake syslog daemon standing in for libc under `cfg(test)`.
//!
//! It keeps the session state the real `openlog`/`closelog` pair would, so
//! tests can check which session each message was sent under and that no
//! `ident` string is released while it is still the current one.
//!
//! The real `syslog` is variadic; the fake one takes exactly the three
//! arguments the listener passes.

use libc::{c_char, c_int};
use once_cell::sync::Lazy;
use std::ffi::CStr;
use std::mem;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An `openlog` call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub ident: String,
    pub option: c_int,
    pub facility: c_int,
}

/// A `syslog` call, with the ident of the session it was sent under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delivery {
    pub ident: Option<String>,
    pub priority: c_int,
    pub format: String,
    pub text: String,
}

/// Everything the daemon saw while a test ran.
#[derive(Debug, Default)]
pub struct Daemon {
    pub opened: Vec<Session>,
    pub delivered: Vec<Delivery>,
    pub closed: usize,
    /// Idents released by dropped listeners, in order.
    pub released: Vec<String>,
    /// Idents released while libc could still be holding them.
    pub released_while_current: Vec<String>,
    current: Option<(usize, Session)>,
}
impl Daemon {
    /// Returns the session still open at the end of the test.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref().map(|(_, session)| session)
    }

    /// Returns the `(priority, text)` of every delivery.
    pub fn messages(&self) -> Vec<(c_int, &str)> {
        self.delivered
            .iter()
            .map(|d| (d.priority, d.text.as_str()))
            .collect()
    }
}

static DAEMON: Lazy<Mutex<Daemon>> = Lazy::new(|| Mutex::new(Daemon::default()));
static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn daemon() -> MutexGuard<'static, Daemon> {
    DAEMON.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f` against a fresh daemon and returns what it saw.
///
/// Runs are serialized, since the daemon (like the real one) is global.
pub fn with_daemon<T>(f: impl FnOnce() -> T) -> (T, Daemon) {
    let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    *daemon() = Daemon::default();

    let result = catch_unwind(AssertUnwindSafe(f));
    let seen = mem::take(&mut *daemon());
    match result {
        Ok(ok) => (ok, seen),
        Err(panicked) => resume_unwind(panicked),
    }
}

/// Called by a listener just before its `ident` string is freed.
pub fn release(ident: *const c_char) {
    let name = unsafe { string_from_ptr(ident) };
    let mut daemon = daemon();
    if let Some((current, _)) = daemon.current {
        if current == ident as usize {
            daemon.released_while_current.push(name.clone());
        }
    }
    daemon.released.push(name);
}

pub unsafe extern "C" fn openlog(ident: *const c_char, logopt: c_int, facility: c_int) {
    let session = Session {
        ident: string_from_ptr(ident),
        option: logopt,
        facility,
    };
    let mut daemon = daemon();
    daemon.opened.push(session.clone());
    daemon.current = Some((ident as usize, session));
}

pub unsafe extern "C" fn closelog() {
    let mut daemon = daemon();
    daemon.current = None;
    daemon.closed += 1;
}

pub unsafe extern "C" fn syslog(priority: c_int, format: *const c_char, message: *const c_char) {
    let delivery = Delivery {
        ident: None,
        priority,
        format: string_from_ptr(format),
        text: string_from_ptr(message),
    };
    let mut daemon = daemon();
    let ident = daemon.current().map(|s| s.ident.clone());
    daemon.delivered.push(Delivery { ident, ..delivery });
}

unsafe fn string_from_ptr(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}
