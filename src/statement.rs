//! A single log message in flight.
use crate::misc;
use crate::registry::Registry;
use crate::types::Severity;
use std::fmt::{self, Write};
use std::mem;

/// One log message being built.
///
/// Text is appended with [`append`] (or through `fmt::Write`). The first
/// append writes the header `YYYY-MM-DD HH:MM:SS.mmm LEVEL:\t`. When the
/// statement is dropped, on every exit path including unwinding, the whole
/// text is delivered once to every listener of the registry.
///
/// Statements are usually created through the `log_at!` family of macros,
/// which skip the work entirely when the reporting threshold does not let
/// the message through.
///
/// # Examples
///
/// ```
/// use logcast::{Registry, Statement};
/// use logcast::buffer::BufferListener;
/// use logcast::types::Severity;
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let buffer = Arc::new(BufferListener::new());
/// registry.add_listener(&buffer);
///
/// {
///     let mut statement = Statement::new(&registry, Severity::Error);
///     statement.append("code=").append(42);
///     assert_eq!(buffer.get_buffer(false), "");
/// }
/// assert!(buffer.get_buffer(false).ends_with(" ERROR:\tcode=42"));
/// ```
///
/// [`append`]: #method.append
#[derive(Debug)]
pub struct Statement<'a> {
    registry: &'a Registry,
    level: Severity,
    buffer: String,
}
impl<'a> Statement<'a> {
    /// Starts a statement of `level` that will be broadcast through `registry`.
    ///
    /// The reporting threshold is not checked; see [`Registry::log`].
    ///
    /// [`Registry::log`]: struct.Registry.html#method.log
    pub fn new(registry: &'a Registry, level: Severity) -> Self {
        Statement {
            registry,
            level,
            buffer: String::new(),
        }
    }

    /// Returns the severity of this statement.
    pub fn level(&self) -> Severity {
        self.level
    }

    /// Returns the text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Appends the `Display` representation of `value`.
    pub fn append<T: fmt::Display>(&mut self, value: T) -> &mut Self {
        let _ = write!(self, "{}", value);
        self
    }

    /// Ends the statement now instead of at the end of the scope.
    pub fn finish(self) {}

    fn write_header(&mut self) {
        if self.buffer.is_empty() {
            self.buffer
                .push_str(&misc::timestamp(self.registry.timezone()));
            self.buffer.push(' ');
            self.buffer.push_str(self.level.as_str());
            self.buffer.push_str(":\t");
        }
    }
}
impl<'a> Write for Statement<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_header();
        self.buffer.push_str(s);
        Ok(())
    }
}
impl<'a> Drop for Statement<'a> {
    fn drop(&mut self) {
        self.write_header();
        let message = mem::take(&mut self.buffer);
        self.registry.broadcast(&message, self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferListener;
    use crate::listener::Listener;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);
    impl Listener for Counter {
        fn notify(&self, _message: &str, _level: Severity) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn split_header(message: &str) -> (&str, &str) {
        let (header, body) = message.split_at(message.find('\t').unwrap() + 1);
        (header, body)
    }

    #[test]
    fn dispatches_exactly_once_per_listener() {
        let registry = Registry::new();
        let counters: Vec<_> = (0..3).map(|_| Arc::new(Counter::default())).collect();
        for c in &counters {
            registry.add_listener(c);
        }

        {
            let mut statement = registry.statement(Severity::Info);
            statement.append("a").append("b").append("c");
            for c in &counters {
                assert_eq!(c.0.load(Ordering::SeqCst), 0);
            }
        }
        for c in &counters {
            assert_eq!(c.0.load(Ordering::SeqCst), 1);
        }

        registry.statement(Severity::Debug2).finish();
        for c in &counters {
            assert_eq!(c.0.load(Ordering::SeqCst), 2);
        }
    }

    #[test]
    fn header_is_written_by_first_append() {
        let registry = Registry::new();
        let mut statement = registry.statement(Severity::Debug1);
        assert_eq!(statement.as_str(), "");
        statement.append("x=").append(1.5);

        let (header, body) = split_header(statement.as_str());
        assert_eq!(body, "x=1.5");
        assert!(header.ends_with(" DEBUG1:\t"));
        assert_eq!(header.len(), "2016-01-01 00:00:00.000 DEBUG1:\t".len());
    }

    #[test]
    fn empty_statement_sends_header_only() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        registry.add_listener(&buffer);
        registry.statement(Severity::Critical).finish();

        let text = buffer.get_buffer(true);
        let (header, body) = split_header(&text);
        assert!(header.ends_with(" CRITICAL:\t"));
        assert_eq!(body, "");
    }

    #[test]
    fn fmt_write_appends_to_same_buffer() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        registry.add_listener(&buffer);
        {
            let mut statement = registry.statement(Severity::Info);
            write!(statement, "{}-{}", 1, 2).unwrap();
            statement.append('|');
            write!(statement, "{:>3}", 7).unwrap();
        }
        let text = buffer.get_buffer(true);
        assert_eq!(split_header(&text).1, "1-2|  7");
    }

    #[test]
    fn dispatches_while_unwinding() {
        let registry = Registry::new();
        let buffer = Arc::new(BufferListener::new());
        registry.add_listener(&buffer);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut statement = registry.statement(Severity::Error);
            statement.append("before panic");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(buffer.get_buffer(true).ends_with("ERROR:\tbefore panic"));
    }

    #[test]
    fn utc_timezone_is_honored() {
        use crate::registry::RegistryBuilder;
        use crate::types::TimeZone;

        let registry = RegistryBuilder::new().timezone(TimeZone::Utc).build();
        let before = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let mut statement = registry.statement(Severity::Info);
        statement.append("now");
        let after = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let date = &statement.as_str()[..10];
        assert!(date == before || date == after);
    }
}
