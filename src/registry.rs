//! The set of listeners a log statement is broadcast to.
//!
//! # Listener lifetime
//!
//! A registry never owns its listeners: it keeps weak handles to them, and
//! the caller keeps the `Arc`. Remove a listener before dropping it. A
//! listener that is dropped while still registered is skipped by later
//! dispatches and pruned on the next mutation of the registry.
//!
//! # Threads
//!
//! Mutation takes a write lock. Dispatch takes a snapshot of the live
//! listeners under a read lock and releases it before any listener is
//! called, so a slow sink never blocks `add_listener` or `remove_listener`,
//! and a listener may itself log without deadlocking.
use crate::listener::Listener;
use crate::statement::Statement;
use crate::types::{Severity, TimeZone};
use crate::{ErrorKind, Result};
use once_cell::sync::OnceCell;
use slog::{debug, o, Discard, Logger};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Returns the process-wide registry, creating it with default settings on
/// first use.
///
/// The registry lives until the process exits.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::new)
}

/// Installs `registry` as the process-wide registry.
///
/// This fails if the global registry was already initialized, either by an
/// earlier call to this function or by a call to [`global`].
///
/// # Examples
///
/// ```
/// use logcast::RegistryBuilder;
/// use logcast::types::{Severity, TimeZone};
///
/// let registry = RegistryBuilder::new()
///     .reporting_level(Severity::Debug)
///     .timezone(TimeZone::Utc)
///     .build();
/// logcast::init_global(registry).unwrap();
/// assert_eq!(logcast::global().reporting_level(), Severity::Debug);
///
/// assert!(logcast::init_global(RegistryBuilder::new().build()).is_err());
/// ```
///
/// [`global`]: fn.global.html
pub fn init_global(registry: Registry) -> Result<()> {
    track_assert!(
        GLOBAL.set(registry).is_ok(),
        ErrorKind::Other,
        "The global registry is already initialized"
    );
    Ok(())
}

/// An ordered set of listeners plus the reporting threshold.
///
/// # Examples
///
/// ```
/// use logcast::Registry;
/// use logcast::buffer::BufferListener;
/// use logcast::types::Severity;
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let buffer = Arc::new(BufferListener::new());
/// assert!(registry.add_listener(&buffer));
///
/// registry.statement(Severity::Warning).append("disk is ").append(93).append("% full");
/// assert!(buffer.get_buffer(false).ends_with("WARNING:\tdisk is 93% full"));
///
/// assert!(registry.remove_listener(&buffer));
/// assert!(!registry.remove_listener(&buffer));
/// ```
pub struct Registry {
    listeners: RwLock<Vec<Weak<dyn Listener>>>,
    reporting_level: AtomicU8,
    timezone: TimeZone,
    diagnostics: Logger,
}
impl Registry {
    /// Makes a new empty registry with the default settings.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Adds `listener` to the end of the registry.
    ///
    /// Returns `false` (and changes nothing) if the same listener is already
    /// registered.
    pub fn add_listener<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        let handle = Arc::downgrade(listener);
        let handle: Weak<dyn Listener> = handle;
        self.insert(handle)
    }

    /// Adds a listener that is already a trait object.
    ///
    /// Same as [`add_listener`], for registries fed from a heterogeneous
    /// collection of `Arc<dyn Listener>`.
    ///
    /// [`add_listener`]: #method.add_listener
    pub fn add_dyn_listener(&self, listener: &Arc<dyn Listener>) -> bool {
        self.insert(Arc::downgrade(listener))
    }

    /// Removes every registration of `listener`.
    ///
    /// Returns `false` if the listener was not registered.
    pub fn remove_listener<L: Listener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.remove(Arc::as_ptr(listener) as *const ())
    }

    /// Removes every registration of a listener added as a trait object.
    pub fn remove_dyn_listener(&self, listener: &Arc<dyn Listener>) -> bool {
        self.remove(Arc::as_ptr(listener) as *const ())
    }

    fn insert(&self, handle: Weak<dyn Listener>) -> bool {
        let id = weak_identity(&handle);
        let mut listeners = self.write_listeners();
        listeners.retain(|l| l.strong_count() > 0);
        if listeners.iter().any(|l| weak_identity(l) == id) {
            debug!(self.diagnostics, "Listener is already registered");
            return false;
        }

        listeners.push(handle);
        debug!(self.diagnostics, "Listener added"; "listeners" => listeners.len());
        true
    }

    fn remove(&self, id: *const ()) -> bool {
        let mut listeners = self.write_listeners();
        let before = listeners.len();
        listeners.retain(|l| weak_identity(l) != id);
        let removed = listeners.len() != before;
        listeners.retain(|l| l.strong_count() > 0);
        if removed {
            debug!(self.diagnostics, "Listener removed"; "listeners" => listeners.len());
        }
        removed
    }

    /// Adds `listener` and returns a guard that removes it again when dropped.
    ///
    /// Returns `None` if the listener is already registered.
    pub fn register<L: Listener + 'static>(&self, listener: Arc<L>) -> Option<Registration<L>> {
        if self.add_listener(&listener) {
            Some(Registration {
                registry: self,
                listener,
            })
        } else {
            None
        }
    }

    /// Returns the number of live registered listeners.
    pub fn listener_count(&self) -> usize {
        self.read_listeners()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Returns the current reporting threshold.
    pub fn reporting_level(&self) -> Severity {
        Severity::from_u8(self.reporting_level.load(Ordering::Relaxed))
    }

    /// Sets the reporting threshold.
    pub fn set_reporting_level(&self, level: Severity) {
        self.reporting_level.store(level as u8, Ordering::Relaxed);
        debug!(self.diagnostics, "Reporting level changed"; "level" => level.as_str());
    }

    /// Returns `true` if a message of `level` passes the reporting threshold.
    pub fn is_enabled(&self, level: Severity) -> bool {
        level <= self.reporting_level()
    }

    /// Returns the time zone used for the timestamps of log statements.
    pub fn timezone(&self) -> TimeZone {
        self.timezone
    }

    /// Returns the logger this registry reports its own events to.
    pub fn diagnostics(&self) -> &Logger {
        &self.diagnostics
    }

    /// Starts a log statement regardless of the reporting threshold.
    pub fn statement(&self, level: Severity) -> Statement {
        Statement::new(self, level)
    }

    /// Starts a log statement if `level` passes the reporting threshold.
    pub fn log(&self, level: Severity) -> Option<Statement> {
        if self.is_enabled(level) {
            Some(Statement::new(self, level))
        } else {
            None
        }
    }

    /// Converts a canonical severity name, falling back to `Info`.
    ///
    /// An unknown name is reported as a single `Warning` message through this
    /// registry.
    pub fn level_from_name(&self, name: &str) -> Severity {
        match Severity::lookup(name) {
            Some(level) => level,
            None => {
                if let Some(mut statement) = self.log(Severity::Warning) {
                    statement
                        .append("Unknown logging level '")
                        .append(name)
                        .append("'. Using INFO level as default.");
                }
                Severity::Info
            }
        }
    }

    /// Delivers `message` to every live listener, in registration order.
    ///
    /// Returns the number of listeners notified. The reporting threshold is
    /// not consulted here; callers check it before building the message.
    pub fn broadcast(&self, message: &str, level: Severity) -> usize {
        let snapshot: Vec<Arc<dyn Listener>> = self
            .read_listeners()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for listener in &snapshot {
            listener.notify(message, level);
        }
        snapshot.len()
    }

    fn read_listeners(&self) -> RwLockReadGuard<Vec<Weak<dyn Listener>>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_listeners(&self) -> RwLockWriteGuard<Vec<Weak<dyn Listener>>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}
impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("listeners", &self.listener_count())
            .field("reporting_level", &self.reporting_level())
            .field("timezone", &self.timezone)
            .finish()
    }
}

fn weak_identity(listener: &Weak<dyn Listener>) -> *const () {
    listener.as_ptr() as *const ()
}

/// A builder of `Registry` instances.
#[derive(Debug)]
pub struct RegistryBuilder {
    reporting_level: Severity,
    timezone: TimeZone,
    diagnostics: Option<Logger>,
}
impl RegistryBuilder {
    /// Makes a new `RegistryBuilder` instance.
    pub fn new() -> Self {
        RegistryBuilder {
            reporting_level: Severity::default(),
            timezone: TimeZone::default(),
            diagnostics: None,
        }
    }

    /// Sets the initial reporting threshold.
    pub fn reporting_level(&mut self, level: Severity) -> &mut Self {
        self.reporting_level = level;
        self
    }

    /// Sets the time zone of statement timestamps.
    pub fn timezone(&mut self, timezone: TimeZone) -> &mut Self {
        self.timezone = timezone;
        self
    }

    /// Sets the logger that receives the registry's own debug events.
    ///
    /// Do not point this back at a drain that feeds the same registry.
    pub fn diagnostics(&mut self, logger: Logger) -> &mut Self {
        self.diagnostics = Some(logger);
        self
    }

    /// Builds the registry.
    pub fn build(&self) -> Registry {
        Registry {
            listeners: RwLock::new(Vec::new()),
            reporting_level: AtomicU8::new(self.reporting_level as u8),
            timezone: self.timezone,
            diagnostics: self
                .diagnostics
                .clone()
                .unwrap_or_else(|| Logger::root(Discard, o!())),
        }
    }
}
impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a listener registered for as long as it is alive.
///
/// Returned by [`Registry::register`].
///
/// [`Registry::register`]: struct.Registry.html#method.register
#[derive(Debug)]
pub struct Registration<'a, L: Listener + 'static> {
    registry: &'a Registry,
    listener: Arc<L>,
}
impl<'a, L: Listener + 'static> Registration<'a, L> {
    /// Returns the registered listener.
    pub fn listener(&self) -> &Arc<L> {
        &self.listener
    }
}
impl<'a, L: Listener + 'static> Drop for Registration<'a, L> {
    fn drop(&mut self) {
        self.registry.remove_listener(&self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferListener;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        journal: Arc<Mutex<Vec<(&'static str, String, Severity)>>>,
    }
    impl Listener for Recorder {
        fn notify(&self, message: &str, level: Severity) {
            self.journal
                .lock()
                .unwrap()
                .push((self.name, message.to_owned(), level));
        }
    }

    fn recorders(names: &[&'static str]) -> (Vec<Arc<Recorder>>, Arc<Mutex<Vec<(&'static str, String, Severity)>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let listeners = names
            .iter()
            .map(|&name| {
                Arc::new(Recorder {
                    name,
                    journal: journal.clone(),
                })
            })
            .collect();
        (listeners, journal)
    }

    #[test]
    fn add_rejects_duplicates() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        assert!(registry.add_listener(&buffer));
        assert!(!registry.add_listener(&buffer));
        assert_eq!(registry.listener_count(), 1);
    }

    #[test]
    fn remove_unknown_listener_fails() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        assert!(!registry.remove_listener(&buffer));
        assert!(registry.add_listener(&buffer));
        assert!(registry.remove_listener(&buffer));
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn reporting_level_defaults_to_info() {
        let registry = Registry::new();
        assert_eq!(registry.reporting_level(), Severity::Info);
        registry.set_reporting_level(Severity::Debug2);
        assert_eq!(registry.reporting_level(), Severity::Debug2);
    }

    #[test]
    fn threshold_gating() {
        let registry = Registry::new();
        for threshold in Severity::ALL.iter().copied() {
            registry.set_reporting_level(threshold);
            for level in Severity::ALL.iter().copied() {
                assert_eq!(registry.is_enabled(level), level as u8 <= threshold as u8);
                assert_eq!(registry.log(level).is_some(), registry.is_enabled(level));
            }
        }

    }

    #[cfg(not(feature = "disabled"))]
    #[test]
    fn macros_respect_threshold() {
        let registry = Registry::new();
        let (listeners, journal) = recorders(&["a"]);
        registry.add_listener(&listeners[0]);
        registry.set_reporting_level(Severity::Warning);
        log_at!(registry: registry, Severity::Debug, "dropped");
        assert!(journal.lock().unwrap().is_empty());
        log_at!(registry: registry, Severity::Error, "kept");
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[test]
    fn trait_objects_can_be_registered() {
        let registry = Registry::new();
        let (listeners, journal) = recorders(&["erased", "plain"]);
        let erased: Arc<dyn Listener> = listeners[0].clone();
        let buffer: Arc<dyn Listener> = Arc::new(BufferListener::new());
        let others = vec![erased.clone(), buffer];

        for l in &others {
            assert!(registry.add_dyn_listener(l));
        }
        assert!(!registry.add_dyn_listener(&erased));
        // Same allocation, whether seen through the concrete type or not.
        assert!(!registry.add_listener(&listeners[0]));
        assert!(registry.add_listener(&listeners[1]));
        assert_eq!(registry.listener_count(), 3);

        registry.broadcast("x", Severity::Info);
        assert_eq!(journal.lock().unwrap().len(), 2);

        assert!(registry.remove_dyn_listener(&erased));
        assert!(!registry.remove_listener(&listeners[0]));
        assert_eq!(registry.listener_count(), 2);
    }

    #[test]
    fn fan_out_follows_insertion_order() {
        let registry = Registry::new();
        let (listeners, journal) = recorders(&["first", "second", "third"]);
        for l in &listeners {
            assert!(registry.add_listener(l));
        }

        assert_eq!(registry.broadcast("one", Severity::Info), 3);
        assert!(registry.remove_listener(&listeners[1]));
        assert_eq!(registry.broadcast("two", Severity::Error), 2);

        let journal = journal.lock().unwrap();
        let seen: Vec<_> = journal
            .iter()
            .map(|(name, msg, _)| (*name, msg.as_str()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("first", "one"),
                ("second", "one"),
                ("third", "one"),
                ("first", "two"),
                ("third", "two"),
            ]
        );
        assert_eq!(journal[3].2, Severity::Error);
    }

    #[test]
    fn empty_registry_dispatches_nothing() {
        let registry = Registry::new();
        assert_eq!(registry.broadcast("nobody listens", Severity::Critical), 0);
        registry.statement(Severity::Critical).append("still fine");
    }

    #[test]
    fn dropped_listener_is_skipped() {
        let registry = Registry::new();
        let (mut listeners, journal) = recorders(&["gone", "kept"]);
        for l in &listeners {
            registry.add_listener(l);
        }
        listeners.remove(0);

        assert_eq!(registry.broadcast("x", Severity::Info), 1);
        assert_eq!(registry.listener_count(), 1);
        assert_eq!(journal.lock().unwrap()[0].0, "kept");
    }

    #[test]
    fn registration_guard_removes_listener() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        {
            let registration = registry.register(buffer.clone()).unwrap();
            assert!(registry.register(buffer.clone()).is_none());
            assert_eq!(registry.listener_count(), 1);
            registry.broadcast("a", Severity::Info);
            assert_eq!(registration.listener().get_buffer(false), "a");
        }
        assert_eq!(registry.listener_count(), 0);
        registry.broadcast("b", Severity::Info);
        assert_eq!(buffer.get_buffer(false), "a");
    }

    #[test]
    fn unknown_level_name_warns_once() {
        let registry = Registry::new();
        let (listeners, journal) = recorders(&["a"]);
        registry.add_listener(&listeners[0]);

        for level in Severity::ALL.iter().copied() {
            assert_eq!(registry.level_from_name(level.as_str()), level);
        }
        assert!(journal.lock().unwrap().is_empty());

        assert_eq!(registry.level_from_name("BOGUS"), Severity::Info);
        let journal = journal.lock().unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].2, Severity::Warning);
        assert!(journal[0]
            .1
            .ends_with("WARNING:\tUnknown logging level 'BOGUS'. Using INFO level as default."));
    }

    #[test]
    fn unknown_level_name_below_threshold_is_silent() {
        let registry = RegistryBuilder::new()
            .reporting_level(Severity::Error)
            .build();
        let (listeners, journal) = recorders(&["a"]);
        registry.add_listener(&listeners[0]);
        assert_eq!(registry.level_from_name("verbose"), Severity::Info);
        assert!(journal.lock().unwrap().is_empty());
    }

    #[test]
    fn listener_may_log_while_notified() {
        struct Echo {
            registry: Arc<Registry>,
            depth: Mutex<u32>,
        }
        impl Listener for Echo {
            fn notify(&self, _message: &str, _level: Severity) {
                let mut depth = self.depth.lock().unwrap();
                *depth += 1;
                if *depth == 1 {
                    drop(depth);
                    self.registry.statement(Severity::Info).append("echo");
                }
            }
        }

        let registry = Arc::new(Registry::new());
        let echo = Arc::new(Echo {
            registry: registry.clone(),
            depth: Mutex::new(0),
        });
        registry.add_listener(&echo);
        registry.statement(Severity::Info).append("ping");
        assert_eq!(*echo.depth.lock().unwrap(), 2);
        registry.remove_listener(&echo);
    }
}
