//! This crate provides a small logging facility: a log statement collects a
//! timestamped message and broadcasts it, once, to every listener registered
//! in a [`Registry`].
//!
//! Listeners for an in-memory buffer, the console, a file and (on unix)
//! syslog are included, and any type implementing [`Listener`] can be added.
//!
//! # Examples
//!
//! Logs through the global registry:
//!
//! ```
//! use logcast::{logi, loge};
//! use logcast::buffer::BufferListener;
//! use std::sync::Arc;
//!
//! let buffer = Arc::new(BufferListener::new());
//! logcast::global().add_listener(&buffer);
//!
//! logi!("Hello {}!", "World");
//! loge!("Something went wrong: code={}", 42);
//!
//! # #[cfg(not(feature = "disabled"))]
//! assert!(buffer.get_buffer(true).contains("ERROR:\tSomething went wrong: code=42"));
//! logcast::global().remove_listener(&buffer);
//! ```
//!
//! Installs listeners from configuration text (TOML):
//!
//! ```
//! use logcast::{logw, LoggingConfig, Registry};
//!
//! let config: LoggingConfig = serdeconv::from_toml_str(r#"
//! level = "WARNING"
//!
//! [[listeners]]
//! type = "console"
//! "#).unwrap();
//!
//! let registry = Registry::new();
//! let _installation = config.install(&registry).unwrap();
//! logw!(registry: registry, "Hello World!\n");
//! ```
//!
//! [`Registry`]: struct.Registry.html
//! [`Listener`]: trait.Listener.html
#![warn(missing_docs)]
#[macro_use]
extern crate trackable;

#[macro_use]
mod macros;

pub use crate::bridge::{set_stdlog_registry, RegistryDrain, SlogListener};
pub use crate::build::{Build, ListenerBuilder};
pub use crate::config::{Config, Installation, ListenerConfig, LoggingConfig};
pub use crate::error::{Error, ErrorKind};
pub use crate::listener::Listener;
pub use crate::registry::{global, init_global, Registration, Registry, RegistryBuilder};
pub use crate::statement::Statement;

pub mod buffer;
pub mod console;
pub mod file;
pub mod syslog;
pub mod types;

mod bridge;
mod build;
mod config;
mod error;
mod fake_syslog;
mod listener;
mod misc;
mod permissions;
mod registry;
mod statement;

/// A specialized `Result` type for this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
