//! Interoperability with `slog` and the `log` crate.
use crate::listener::Listener;
use crate::registry::Registry;
use crate::statement::Statement;
use crate::types::Severity;
use crate::{Error, Result};
use slog::{
    crit, debug, error, info, o, trace, warn, Drain, Level, Logger, Never, OwnedKVList, Record, KV,
};
use std::fmt::{self, Write};
use std::ops::Deref;

/// An `slog` drain that broadcasts every record through a registry.
///
/// The record becomes one statement of the matching severity: the message,
/// then the key/value pairs as ` [key="value" ...]`, then a newline.
/// Records below the registry's reporting threshold are dropped.
///
/// # Examples
///
/// ```
/// use logcast::{Registry, RegistryDrain};
/// use logcast::buffer::BufferListener;
/// use slog::{info, o, Logger};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let buffer = Arc::new(BufferListener::new());
/// registry.add_listener(&buffer);
///
/// let logger = Logger::root(RegistryDrain::new(registry.clone()), o!());
/// info!(logger, "Hello World!"; "user" => "alice");
/// assert!(buffer
///     .get_buffer(false)
///     .ends_with("INFO:\tHello World! [user=\"alice\"]\n"));
/// ```
#[derive(Debug, Clone)]
pub struct RegistryDrain<R = &'static Registry> {
    registry: R,
}
impl<R: Deref<Target = Registry>> RegistryDrain<R> {
    /// Makes a new `RegistryDrain` broadcasting through `registry`.
    pub fn new(registry: R) -> Self {
        RegistryDrain { registry }
    }
}
impl<R: Deref<Target = Registry>> Drain for RegistryDrain<R> {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> ::std::result::Result<(), Never> {
        let level = Severity::from_level(record.level());
        if let Some(mut statement) = self.registry.log(level) {
            let _ = write_record(&mut statement, record, values);
            statement.append('\n');
        }
        Ok(())
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.registry.is_enabled(Severity::from_level(level))
    }
}

fn write_record(statement: &mut Statement, record: &Record, values: &OwnedKVList) -> slog::Result {
    write!(statement, "{}", record.msg())?;

    let mut serializer = KeyValueWriter {
        out: statement,
        is_first_kv: true,
    };
    values.serialize(record, &mut serializer)?;
    record.kv().serialize(record, &mut serializer)?;
    if !serializer.is_first_kv {
        serializer.out.write_char(']')?;
    }
    Ok(())
}

struct KeyValueWriter<'s, 'a> {
    out: &'s mut Statement<'a>,
    is_first_kv: bool,
}
impl<'s, 'a> slog::Serializer for KeyValueWriter<'s, 'a> {
    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        self.out
            .write_str(if self.is_first_kv { " [" } else { " " })?;
        self.is_first_kv = false;

        // Keys are written as is; values are quoted and escaped.
        write!(self.out, "{}=\"", key)?;
        write!(ValueEscaper(&mut *self.out), "{}", val)?;
        self.out.write_char('"')?;
        Ok(())
    }
}

/// Copies its input, escaping `\`, `"` and `]` with a backslash.
struct ValueEscaper<W: Write>(W);
impl<W: Write> Write for ValueEscaper<W> {
    fn write_str(&mut self, mut s: &str) -> fmt::Result {
        while let Some(index) = s.find(|c| c == '\\' || c == '"' || c == ']') {
            self.0.write_str(&s[..index])?;
            self.0.write_char('\\')?;
            // All three delimiters are ASCII.
            self.0.write_char(s.as_bytes()[index] as char)?;
            s = &s[index + 1..];
        }
        self.0.write_str(s)
    }
}

/// A listener that forwards every message to an `slog` logger.
///
/// The message is logged verbatim, without its trailing newline, at the
/// `slog` level matching its severity.
///
/// # Examples
///
/// ```
/// use logcast::{logw, Registry, SlogListener};
/// use slog::{o, Discard, Logger};
/// use std::sync::Arc;
///
/// let logger = Logger::root(Discard, o!());
/// let registry = Registry::new();
/// let listener = Arc::new(SlogListener::new(logger));
/// registry.add_listener(&listener);
///
/// logw!(registry: registry, "forwarded to slog");
/// ```
#[derive(Debug, Clone)]
pub struct SlogListener {
    logger: Logger,
}
impl SlogListener {
    /// Makes a new `SlogListener` forwarding to `logger`.
    pub fn new(logger: Logger) -> Self {
        SlogListener { logger }
    }
}
impl Listener for SlogListener {
    fn notify(&self, message: &str, level: Severity) {
        let message = message.trim_end_matches('\n');
        match level.as_level() {
            Level::Critical => crit!(self.logger, "{}", message),
            Level::Error => error!(self.logger, "{}", message),
            Level::Warning => warn!(self.logger, "{}", message),
            Level::Info => info!(self.logger, "{}", message),
            Level::Debug => debug!(self.logger, "{}", message),
            Level::Trace => trace!(self.logger, "{}", message),
        }
    }
}

/// Routes the records of the `log` crate into `registry`.
///
/// This installs an `slog_scope` global logger broadcasting through
/// `registry` and makes `slog_stdlog` the `log` crate's logger. The routing
/// stays in place while the returned guard is alive.
///
/// The `log` crate's logger can only be set once per process; later calls
/// fail with `ErrorKind::Other`.
pub fn set_stdlog_registry(registry: &'static Registry) -> Result<slog_scope::GlobalLoggerGuard> {
    let logger = Logger::root(RegistryDrain::new(registry), o!());
    let guard = slog_scope::set_global_logger(logger);
    track!(slog_stdlog::init().map_err(Error::from))?;
    Ok(guard)
}
