use crate::buffer::{BufferListener, BufferListenerConfig};
use crate::console::ConsoleListenerConfig;
#[cfg(not(unix))]
use crate::fake_syslog::UnsupportedSyslogListenerConfig;
use crate::file::FileListenerConfig;
use crate::registry::{Registry, RegistryBuilder};
#[cfg(unix)]
use crate::syslog::SyslogListenerConfig;
use crate::types::{Severity, TimeZone};
use crate::{Build, Listener, ListenerBuilder, Result};
use serde::{Deserialize, Serialize};
use slog::warn;
use std::fmt;
use std::sync::Arc;

/// Configuration of a listener builder.
pub trait Config {
    /// Listener builder.
    type Builder: Build;

    /// Makes a listener builder associated with this configuration.
    fn try_to_builder(&self) -> Result<Self::Builder>;

    /// Builds a listener with this configuration.
    fn build_listener(&self) -> Result<<Self::Builder as Build>::Listener> {
        let builder = track!(self.try_to_builder())?;
        let listener = track!(builder.build())?;
        Ok(listener)
    }
}

/// The configuration of `ListenerBuilder`.
///
/// # Examples
///
/// Buffer listener.
///
/// ```
/// use logcast::ListenerConfig;
///
/// let toml = r#"
/// type = "buffer"
/// "#;
/// let _config: ListenerConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
///
/// File listener.
///
/// ```
/// use logcast::ListenerConfig;
///
/// let toml = r#"
/// type = "file"
/// file_name = "app.log"
/// directory = "/var/log/app"
/// append = true
/// "#;
/// let _config: ListenerConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
///
/// Syslog listener. (Unix-like systems only.)
///
/// ```
/// use logcast::ListenerConfig;
///
/// let toml = r#"
/// type = "syslog"
/// ident = "my-app"
/// facility = "local0"
/// "#;
/// # #[cfg(unix)]
/// let _config: ListenerConfig = serdeconv::from_toml_str(toml).unwrap();
/// # #[cfg(not(unix))]
/// # assert!(serdeconv::from_toml_str::<ListenerConfig>(toml).is_err());
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ListenerConfig {
    Buffer(BufferListenerConfig),
    Console(ConsoleListenerConfig),
    File(FileListenerConfig),
    #[cfg(unix)]
    Syslog(SyslogListenerConfig),
    #[cfg(not(unix))]
    #[doc(hidden)]
    Syslog(UnsupportedSyslogListenerConfig),
}
impl Config for ListenerConfig {
    type Builder = ListenerBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        match *self {
            ListenerConfig::Buffer(_) => Ok(ListenerBuilder::Buffer),
            ListenerConfig::Console(_) => Ok(ListenerBuilder::Console),
            ListenerConfig::File(ref c) => track!(c.try_to_builder()).map(ListenerBuilder::File),
            #[cfg(unix)]
            ListenerConfig::Syslog(ref c) => {
                track!(c.try_to_builder()).map(ListenerBuilder::Syslog)
            }
            #[cfg(not(unix))]
            ListenerConfig::Syslog(ref c) => match *c {},
        }
    }
}

/// The configuration of a registry and the listeners installed in it.
///
/// # Examples
///
/// ```
/// use logcast::{LoggingConfig, Registry};
/// use logcast::types::Severity;
///
/// let config: LoggingConfig = serdeconv::from_toml_str(r#"
/// level = "DEBUG"
///
/// [[listeners]]
/// type = "buffer"
///
/// [[listeners]]
/// type = "console"
/// "#).unwrap();
///
/// let registry = Registry::new();
/// let installation = config.install(&registry).unwrap();
/// assert_eq!(installation.len(), 2);
/// assert_eq!(registry.reporting_level(), Severity::Debug);
///
/// drop(installation);
/// assert_eq!(registry.listener_count(), 0);
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct LoggingConfig {
    /// Reporting threshold.
    #[serde(default)]
    pub level: Severity,

    /// Time zone of statement timestamps.
    ///
    /// A registry's time zone is fixed when it is built, so this only takes
    /// effect through [`to_registry_builder`]. [`install`] leaves the time
    /// zone of an existing registry alone and reports the mismatch to the
    /// registry's diagnostics logger.
    ///
    /// [`to_registry_builder`]: #method.to_registry_builder
    /// [`install`]: #method.install
    #[serde(default)]
    pub timezone: TimeZone,

    /// Listeners to install.
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}
impl LoggingConfig {
    /// Creates a new `LoggingConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes a registry builder with the threshold and time zone of this
    /// configuration.
    pub fn to_registry_builder(&self) -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        builder.reporting_level(self.level);
        builder.timezone(self.timezone);
        builder
    }

    /// Sets the reporting threshold of `registry` and registers the
    /// configured listeners in it.
    ///
    /// Every listener is built before any is registered, so a failure leaves
    /// the registry untouched. The returned `Installation` owns the listeners
    /// and unregisters them when dropped.
    pub fn install<'a>(&self, registry: &'a Registry) -> Result<Installation<'a>> {
        let mut listeners: Vec<Arc<dyn Listener>> = Vec::with_capacity(self.listeners.len());
        let mut buffers = Vec::with_capacity(self.listeners.len());
        for config in &self.listeners {
            let mut builder = track!(config.try_to_builder())?;
            if let ListenerBuilder::File(ref mut b) = builder {
                b.diagnostics(registry.diagnostics().clone());
            }
            if let ListenerBuilder::Buffer = builder {
                let buffer = Arc::new(BufferListener::new());
                buffers.push(Some(buffer.clone()));
                listeners.push(buffer);
            } else {
                buffers.push(None);
                listeners.push(Arc::from(track!(builder.build())?));
            }
        }

        if registry.timezone() != self.timezone {
            warn!(registry.diagnostics(), "Configured time zone is not applied to an existing registry";
                  "configured" => ?self.timezone, "registry" => ?registry.timezone());
        }
        registry.set_reporting_level(self.level);
        for listener in &listeners {
            registry.add_dyn_listener(listener);
        }
        Ok(Installation {
            registry,
            listeners,
            buffers,
        })
    }
}

/// Listeners installed from a `LoggingConfig`.
///
/// Dropping it removes the listeners from the registry.
pub struct Installation<'a> {
    registry: &'a Registry,
    listeners: Vec<Arc<dyn Listener>>,
    buffers: Vec<Option<Arc<BufferListener>>>,
}
impl<'a> Installation<'a> {
    /// Returns the number of installed listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listener was installed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns the buffer listener built from the `index`-th configured
    /// listener, or `None` if that entry is not a buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use logcast::{logi, LoggingConfig, Registry};
    ///
    /// let config: LoggingConfig = serdeconv::from_toml_str(r#"
    /// [[listeners]]
    /// type = "console"
    ///
    /// [[listeners]]
    /// type = "buffer"
    /// "#).unwrap();
    ///
    /// let registry = Registry::new();
    /// let installation = config.install(&registry).unwrap();
    /// assert!(installation.buffer(0).is_none());
    ///
    /// registry.statement(logcast::types::Severity::Info).append("kept");
    /// let buffer = installation.buffer(1).unwrap();
    /// assert!(buffer.get_buffer(true).ends_with("INFO:\tkept"));
    /// ```
    pub fn buffer(&self, index: usize) -> Option<&BufferListener> {
        self.buffers.get(index)?.as_ref().map(|b| &**b)
    }
}
impl<'a> Drop for Installation<'a> {
    fn drop(&mut self) {
        for listener in &self.listeners {
            self.registry.remove_dyn_listener(listener);
        }
    }
}
impl<'a> fmt::Debug for Installation<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Installation")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn unknown_listener_type_is_rejected() {
        let result: std::result::Result<ListenerConfig, _> = serdeconv::from_toml_str(
            r#"
type = "carrier-pigeon"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_level_is_rejected() {
        let result: std::result::Result<LoggingConfig, _> =
            serdeconv::from_toml_str(r#"level = "LOUD""#);
        assert!(result.is_err());
    }

    #[test]
    fn defaults() {
        let config: LoggingConfig = serdeconv::from_toml_str("").unwrap();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.timezone, TimeZone::Local);
        assert!(config.listeners.is_empty());

        let registry = config.to_registry_builder().build();
        assert_eq!(registry.reporting_level(), Severity::Info);
    }

    #[test]
    fn installs_file_listener() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
level = "WARNING"
timezone = "utc"

[[listeners]]
type = "file"
file_name = "installed.log"
directory = {:?}
"#,
            dir.path().to_str().unwrap()
        );
        let config: LoggingConfig = serdeconv::from_toml_str(&toml).unwrap();
        let registry = config.to_registry_builder().build();
        let installation = config.install(&registry).unwrap();
        assert_eq!(installation.len(), 1);

        if let Some(mut s) = registry.log(Severity::Error) {
            s.append("written\n");
        }
        if let Some(mut s) = registry.log(Severity::Info) {
            s.append("filtered\n");
        }
        drop(installation);
        registry.statement(Severity::Error).append("after\n");

        let text = std::fs::read_to_string(dir.path().join("installed.log")).unwrap();
        assert!(text.ends_with("ERROR:\twritten\n"));
        assert!(!text.contains("filtered"));
        assert!(!text.contains("after"));
    }

    #[test]
    fn failed_build_registers_nothing() {
        let mut file = FileListenerConfig::new();
        file.file_name = String::new();
        let mut config = LoggingConfig::new();
        config.level = Severity::Debug;
        config.listeners.push(ListenerConfig::Buffer(BufferListenerConfig::new()));
        config.listeners.push(ListenerConfig::File(file));

        let registry = Registry::new();
        let e = config.install(&registry).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
        assert_eq!(registry.listener_count(), 0);
        assert_eq!(registry.reporting_level(), Severity::Info);
    }

    #[test]
    fn installed_buffers_are_readable() {
        let config: LoggingConfig = serdeconv::from_toml_str(
            r#"
[[listeners]]
type = "buffer"

[[listeners]]
type = "console"

[[listeners]]
type = "buffer"
"#,
        )
        .unwrap();
        let registry = Registry::new();
        let installation = config.install(&registry).unwrap();
        assert_eq!(installation.len(), 3);
        assert_eq!(registry.listener_count(), 3);

        registry.statement(Severity::Warning).append("both");
        let first = installation.buffer(0).unwrap();
        let second = installation.buffer(2).unwrap();
        assert!(installation.buffer(1).is_none());
        assert!(installation.buffer(3).is_none());
        assert!(first.get_buffer(true).ends_with("WARNING:\tboth"));
        assert!(second.get_buffer(false).ends_with("WARNING:\tboth"));
        assert_eq!(first.get_buffer(false), "");
    }

    #[test]
    fn timezone_mismatch_is_reported() {
        use slog::{Drain, Logger, Never, OwnedKVList, Record};
        use std::sync::Mutex;

        struct Collect(Arc<Mutex<Vec<String>>>);
        impl Drain for Collect {
            type Ok = ();
            type Err = Never;
            fn log(&self, record: &Record, _: &OwnedKVList) -> std::result::Result<(), Never> {
                self.0.lock().unwrap().push(record.msg().to_string());
                Ok(())
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = RegistryBuilder::new()
            .timezone(TimeZone::Local)
            .diagnostics(Logger::root(Collect(seen.clone()), slog::o!()))
            .build();

        let mut config = LoggingConfig::new();
        config.timezone = TimeZone::Utc;
        let _installation = config.install(&registry).unwrap();
        assert_eq!(registry.timezone(), TimeZone::Local);
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains("time zone is not applied")));

        seen.lock().unwrap().clear();
        config.timezone = TimeZone::Local;
        let _again = config.install(&registry).unwrap();
        assert!(!seen
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains("time zone")));
    }
}
