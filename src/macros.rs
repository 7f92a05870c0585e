//! Logging macros.
//!
//! `log_at!` takes an explicit severity; `logc!`, `loge!`, `logw!`, `logi!`,
//! `logd!`, `logd1!` and `logd2!` are shorthands for each severity. All of
//! them log through the global registry unless the first argument is
//! `registry: <expr>`.
//!
//! The reporting threshold is checked once, before the message arguments
//! are evaluated. With the `disabled` cargo feature every macro expands to a
//! block that never evaluates its arguments.
//!
//! ```
//! use logcast::{logi, logw, Registry};
//! use logcast::buffer::BufferListener;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let buffer = Arc::new(BufferListener::new());
//! registry.add_listener(&buffer);
//!
//! logw!(registry: registry, "retrying in {}s", 5);
//! logi!(registry: registry, "{}", "hello");
//! # #[cfg(not(feature = "disabled"))]
//! assert!(buffer.get_buffer(false).contains("WARNING:\tretrying in 5s"));
//! ```

/// Logs a message of the given severity.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! log_at {
    (registry: $registry:expr, $level:expr, $($arg:tt)+) => {{
        let registry: &$crate::Registry = &$registry;
        let level: $crate::types::Severity = $level;
        if registry.is_enabled(level) {
            $crate::Statement::new(registry, level).append(format_args!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $crate::global(), $level, $($arg)+)
    };
}

/// Logs a message of the given severity.
#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! log_at {
    (registry: $registry:expr, $level:expr, $($arg:tt)+) => {{
        if false {
            let _ = (&$registry, $level);
            let _ = format_args!($($arg)+);
        }
    }};
    ($level:expr, $($arg:tt)+) => {{
        if false {
            let _ = $level;
            let _ = format_args!($($arg)+);
        }
    }};
}

/// Logs a `Critical` message.
#[macro_export]
macro_rules! logc {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Critical, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Critical, $($arg)+)
    };
}

/// Logs an `Error` message.
#[macro_export]
macro_rules! loge {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Error, $($arg)+)
    };
}

/// Logs a `Warning` message.
#[macro_export]
macro_rules! logw {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Warning, $($arg)+)
    };
}

/// Logs an `Info` message.
#[macro_export]
macro_rules! logi {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Info, $($arg)+)
    };
}

/// Logs a `Debug` message.
#[macro_export]
macro_rules! logd {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Debug, $($arg)+)
    };
}

/// Logs a `Debug1` message.
#[macro_export]
macro_rules! logd1 {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Debug1, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Debug1, $($arg)+)
    };
}

/// Logs a `Debug2` message.
#[macro_export]
macro_rules! logd2 {
    (registry: $registry:expr, $($arg:tt)+) => {
        $crate::log_at!(registry: $registry, $crate::types::Severity::Debug2, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log_at!($crate::types::Severity::Debug2, $($arg)+)
    };
}
