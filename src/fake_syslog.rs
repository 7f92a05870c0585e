//! The `syslog` entry of `ListenerConfig` on platforms without syslog.
#![cfg(not(unix))]

use serde::de::{Error, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A syslog listener configuration that cannot exist on this platform.
///
/// Deserializing one always fails, so a configuration naming a `syslog`
/// listener is rejected instead of silently installing nothing.
#[derive(Clone, Debug)]
pub enum UnsupportedSyslogListenerConfig {}

impl Serialize for UnsupportedSyslogListenerConfig {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        match *self {}
    }
}

impl<'de> Deserialize<'de> for UnsupportedSyslogListenerConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Err(D::Error::custom(
            "syslog listeners are only available on unix platforms",
        ))
    }
}
