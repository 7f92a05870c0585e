//! Commonly used types.
use serde::{Deserialize, Serialize};
use slog::Level;
use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorKind};

/// The severity of a log message.
///
/// Variants are ordered from the most urgent to the least urgent, so a message
/// passes a reporting threshold `t` when `severity <= t`.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use logcast::types::Severity;
///
/// assert_eq!(Severity::default(), Severity::Info);
/// assert!(Severity::Error < Severity::Warning);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Debug1,
    Debug2,
}
impl Severity {
    /// Every severity, from the most urgent to the least urgent.
    pub const ALL: [Severity; 7] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
        Severity::Debug1,
        Severity::Debug2,
    ];

    /// Returns the canonical (uppercase) name of this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Debug1 => "DEBUG1",
            Severity::Debug2 => "DEBUG2",
        }
    }

    /// Converts a canonical name to `Severity`, falling back to `Info`.
    ///
    /// An unknown name produces a warning through the global registry.
    /// Use [`Registry::level_from_name`] to report through another registry,
    /// or the `FromStr` implementation to get an error instead.
    ///
    /// ```
    /// use logcast::types::Severity;
    ///
    /// assert_eq!(Severity::from_name("DEBUG1"), Severity::Debug1);
    /// assert_eq!(Severity::from_name("debug1"), Severity::Info);
    /// ```
    ///
    /// [`Registry::level_from_name`]: ../struct.Registry.html#method.level_from_name
    pub fn from_name(name: &str) -> Self {
        crate::global().level_from_name(name)
    }

    /// Converts `Severity` to `slog::Level`.
    ///
    /// `Debug1` and `Debug2` both become `Trace`.
    pub fn as_level(self) -> Level {
        match self {
            Severity::Critical => Level::Critical,
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
            Severity::Info => Level::Info,
            Severity::Debug => Level::Debug,
            Severity::Debug1 | Severity::Debug2 => Level::Trace,
        }
    }

    /// Converts `slog::Level` to `Severity`.
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Critical => Severity::Critical,
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug => Severity::Debug,
            Level::Trace => Severity::Debug2,
        }
    }

    pub(crate) fn lookup(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.as_str() == name)
    }

    pub(crate) fn from_u8(n: u8) -> Self {
        Self::ALL
            .get(usize::from(n))
            .copied()
            .unwrap_or(Severity::Info)
    }
}
impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}
impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for Severity {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match Self::lookup(s) {
            Some(level) => Ok(level),
            None => track_panic!(ErrorKind::Invalid, "Undefined severity: {:?}", s),
        }
    }
}

/// Time Zone.
///
/// # Examples
///
/// The default value:
///
/// ```
/// use logcast::types::TimeZone;
///
/// assert_eq!(TimeZone::default(), TimeZone::Local);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZone {
    Utc,
    Local,
}
impl Default for TimeZone {
    fn default() -> Self {
        TimeZone::Local
    }
}
impl FromStr for TimeZone {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "utc" => Ok(TimeZone::Utc),
            "local" => Ok(TimeZone::Local),
            _ => track_panic!(ErrorKind::Invalid, "Undefined time zone: {:?}", s),
        }
    }
}
