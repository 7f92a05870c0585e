use super::{Facility, SyslogListenerBuilder};
use crate::Config;
use serde::{Deserialize, Serialize};

/// The configuration of `SyslogListenerBuilder`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct SyslogListenerConfig {
    /// The name of this program, for inclusion with messages. (POSIX calls
    /// this the “tag”.)
    ///
    /// The string must not contain any zero (ASCII NUL) bytes.
    pub ident: String,

    /// The syslog facility to send messages to.
    #[serde(default)]
    pub facility: Facility,

    /// Include the process ID in messages.
    #[serde(default = "default_log_pid")]
    pub log_pid: bool,

    /// Whether to wait for the first message before connecting.
    ///
    /// If `false` (the default), a connection is opened immediately.
    #[serde(default)]
    pub log_delay: Option<bool>,

    /// Also emit messages on `stderr`. See `SyslogListenerBuilder::log_perror`.
    #[serde(default)]
    pub log_perror: bool,
}

impl SyslogListenerConfig {
    /// Creates a new `SyslogListenerConfig` tagging messages with `ident`.
    pub fn new(ident: impl Into<String>) -> Self {
        SyslogListenerConfig {
            ident: ident.into(),
            facility: Facility::default(),
            log_pid: default_log_pid(),
            log_delay: None,
            log_perror: false,
        }
    }
}

impl Config for SyslogListenerConfig {
    type Builder = SyslogListenerBuilder;

    fn try_to_builder(&self) -> crate::Result<Self::Builder> {
        let mut b = SyslogListenerBuilder::new(self.ident.clone());
        b.facility(self.facility);
        b.log_pid(self.log_pid);

        if let Some(log_delay) = self.log_delay {
            if log_delay {
                b.log_odelay();
            } else {
                b.log_ndelay();
            }
        }

        if self.log_perror {
            b.log_perror();
        }

        Ok(b)
    }
}

fn default_log_pid() -> bool {
    true
}
