//! The get-or-build cache around the active logger.
//!
//! A [`LoggerRegistry`] owns two loggers: a fallback that needs no
//! configuration, and the current configured logger. [`LoggerRegistry::get_logger`]
//! reuses the current logger while the requested [`ConfigOption`] is unchanged
//! and rebuilds it otherwise. Whatever goes wrong during a rebuild, the caller
//! always gets a usable logger back, together with the error when there was one.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;

use crate::appender::load_appenders;
use crate::builder::fallback_logger;
use crate::options::load_options;
use crate::source::{ConfigSource, FileConfigSource, resolve};
use crate::{ConfigOption, Error, Logger, LoggerBuilder};

/// Lifecycle of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStatus {
    /// No logger was requested yet.
    Uninitialized,
    /// Only the fallback logger exists.
    FallbackOnly,
    /// A configured logger is active.
    Ready,
}

#[derive(Default)]
struct RegistryState {
    fallback: Option<Arc<Logger>>,
    current: Option<Arc<Logger>>,
    current_option: Option<ConfigOption>,
}

impl RegistryState {
    /// Flush the previous logger, then install `logger` for `option`.
    fn replace_current(&mut self, logger: Arc<Logger>, option: ConfigOption) {
        if let Some(previous) = self.current.take() {
            let _ = previous.sync();
        }
        self.current = Some(logger);
        self.current_option = Some(option);
    }
}

type FallbackFactory = Box<dyn Fn() -> Logger + Send + Sync>;

/// Caches the active logger and rebuilds it when the configuration changes.
pub struct LoggerRegistry {
    source: Box<dyn ConfigSource + Send + Sync>,
    make_fallback: FallbackFactory,
    state: Mutex<RegistryState>,
}

impl LoggerRegistry {
    /// A registry reading configuration files from disk.
    pub fn new() -> Self {
        Self::with_source(FileConfigSource::new())
    }

    /// A registry reading configuration from `source`.
    pub fn with_source(source: impl ConfigSource + Send + Sync + 'static) -> Self {
        Self::with_source_and_fallback(source, fallback_logger)
    }

    /// A registry reading configuration from `source` whose fallback logger
    /// is built by `make_fallback` on first use.
    pub fn with_source_and_fallback(
        source: impl ConfigSource + Send + Sync + 'static,
        make_fallback: impl Fn() -> Logger + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            make_fallback: Box::new(make_fallback),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Return the logger for `option`, building it if needed.
    ///
    /// `None` stands for [`ConfigOption::default`]. The returned logger is
    /// never missing: when the configuration cannot be loaded, or none of its
    /// appenders can be built, the fallback logger is returned along with the
    /// error and the current logger is left as it was.
    pub fn get_logger(&self, option: Option<&ConfigOption>) -> (Arc<Logger>, Option<Error>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let fallback = Arc::clone(
            state
                .fallback
                .get_or_insert_with(|| Arc::new((self.make_fallback)())),
        );

        let option = option.cloned().unwrap_or_default();
        let result = self.get_or_build(&mut state, &fallback, option);

        // Best effort.
        let _ = fallback.sync();
        if let Some(current) = &state.current {
            let _ = current.sync();
        }

        result
    }

    fn get_or_build(
        &self,
        state: &mut RegistryState,
        fallback: &Arc<Logger>,
        option: ConfigOption,
    ) -> (Arc<Logger>, Option<Error>) {
        if let Some(current) = &state.current
            && !option.force_new
            && option.matches(state.current_option.as_ref())
        {
            return (Arc::clone(current), None);
        }

        let doc = match resolve(self.source.as_ref(), &option) {
            Ok(doc) => doc,
            Err(e) => {
                fallback.in_scope(|| tracing::warn!(error = %e, "failed to load logger config"));
                return (Arc::clone(fallback), Some(e));
            }
        };

        let mut load = load_appenders(&doc);
        if let Some(e) = load.fatal.take() {
            fallback.in_scope(|| tracing::warn!(error = %e, "failed to load appenders"));
            return (Arc::clone(fallback), Some(e));
        }

        let mut failed: Vec<_> = load.failed.into_iter().collect();
        failed.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, e) in &failed {
            fallback.in_scope(|| tracing::warn!(appender = %name, error = %e, "skipping appender"));
        }

        let mut built: Vec<_> = load.built.into_values().collect();
        built.sort_by(|a, b| a.name.cmp(&b.name));

        let logger = Arc::new(
            LoggerBuilder::new()
                .with_appenders(built)
                .with_options(load_options(&doc))
                .build(),
        );

        state.replace_current(Arc::clone(&logger), option);
        (logger, None)
    }

    /// The current configured logger, if one was built.
    pub fn current(&self) -> Option<Arc<Logger>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current.clone()
    }

    /// The fallback logger, if any logger was requested yet.
    pub fn fallback(&self) -> Option<Arc<Logger>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.fallback.clone()
    }

    pub fn status(&self) -> RegistryStatus {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match (&state.fallback, &state.current) {
            (None, _) => RegistryStatus::Uninitialized,
            (Some(_), None) => RegistryStatus::FallbackOnly,
            (Some(_), Some(_)) => RegistryStatus::Ready,
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("status", &self.status())
            .finish()
    }
}

static GLOBAL: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

/// The process-wide registry reading configuration files from disk.
pub fn global() -> &'static LoggerRegistry {
    &GLOBAL
}

/// [`LoggerRegistry::get_logger`] on the process-wide registry.
pub fn get_logger(option: Option<&ConfigOption>) -> (Arc<Logger>, Option<Error>) {
    GLOBAL.get_logger(option)
}
