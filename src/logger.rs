use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::Dispatch;

use crate::layer::Sink;
use crate::{Error, Result};

/// An assembled logger: one tracing dispatcher fanning out to every appender.
///
/// Records are emitted with the usual `tracing` macros while the logger is
/// the active dispatcher, either for a scope ([`Logger::in_scope`]) or for the
/// whole process ([`Logger::try_init_global`]).
pub struct Logger {
    dispatch: Dispatch,
    sinks: Vec<Arc<Sink>>,
}

impl Logger {
    pub(crate) fn new(dispatch: Dispatch, sinks: Vec<Arc<Sink>>) -> Self {
        Self { dispatch, sinks }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Names of the appenders this logger writes to.
    pub fn appender_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Run `f` with this logger as the thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Install this logger as the global default dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if a global default was already set.
    pub fn try_init_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|e| Error::Init(e.to_string()))
    }

    /// Flush every appender. All sinks are flushed even if one fails; the
    /// first error is returned.
    pub fn sync(&self) -> io::Result<()> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.flush()
                && result.is_ok()
            {
                result = Err(e);
            }
        }
        result
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("appenders", &self.appender_names())
            .finish()
    }
}
