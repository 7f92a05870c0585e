use crate::buffer::BufferListener;
use crate::console::ConsoleListener;
use crate::file::FileListenerBuilder;
#[cfg(unix)]
use crate::syslog::SyslogListenerBuilder;
use crate::{Listener, Result};

/// This trait allows to build a listener instance.
pub trait Build {
    /// The listener this builder makes.
    type Listener: Listener + 'static;

    /// Builds a listener.
    fn build(&self) -> Result<Self::Listener>;
}

/// Listener builder.
#[allow(missing_docs)]
#[derive(Debug)]
#[non_exhaustive]
pub enum ListenerBuilder {
    Buffer,
    Console,
    File(FileListenerBuilder),
    #[cfg(unix)]
    Syslog(SyslogListenerBuilder),
}
impl Build for ListenerBuilder {
    type Listener = Box<dyn Listener>;
    fn build(&self) -> Result<Box<dyn Listener>> {
        match *self {
            ListenerBuilder::Buffer => Ok(Box::new(BufferListener::new())),
            ListenerBuilder::Console => Ok(Box::new(ConsoleListener::new())),
            ListenerBuilder::File(ref b) => {
                let listener = track!(b.build())?;
                Ok(Box::new(listener))
            }
            #[cfg(unix)]
            ListenerBuilder::Syslog(ref b) => {
                let listener = track!(b.build())?;
                Ok(Box::new(listener))
            }
        }
    }
}
