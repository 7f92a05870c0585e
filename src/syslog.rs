//! Listener that sends messages to the local syslog daemon. Unix-like
//! platforms only. Uses the [POSIX syslog API].
//!
//! [POSIX syslog API]: https://pubs.opengroup.org/onlinepubs/9699919799/functions/closelog.html
//!
//! # Concurrency issues
//!
//! POSIX doesn't support opening more than one connection to syslogd at a
//! time. Creating a second `SyslogListener` while the first is alive
//! overwrites the identity and facility of the first, and only the most
//! recently created listener calls `closelog` when dropped.
//!
//! Libraries should not create a `SyslogListener` unless told to by the main
//! application, and an application should not call `openlog` by other means.

#![cfg(unix)]

mod builder;
pub use builder::*;

mod config;
pub use config::*;

mod facility;
pub use facility::*;

mod listener;
pub use listener::*;

#[cfg(test)]
mod mock;
