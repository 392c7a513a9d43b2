//! # lumber-logging
//!
//! Lazily built, name-keyed loggers driven by the `logging` configuration
//! tree.
//!
//! ### Components:
//! - `severity`: level names and ordinals
//! - `formatter`: compiled `%(field)s` templates
//! - `sink` / `handler`: console and size-rotating file output
//! - `logger`: level filtering and propagation to the root logger
//! - `registry`: per-name caches and the once-only root configuration
//! - `facade`: deferred handles resolved on their first message
//!
//! ```no_run
//! let log = lumber_logging::facade("app");
//! log.info("ready")?;
//! # Ok::<(), lumber_logging::LoggingError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use lumber_config::Settings;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;

pub mod error;
pub mod facade;
pub mod formatter;
pub mod handler;
pub mod logger;
pub mod record;
pub mod registry;
pub mod severity;
pub mod sink;

#[cfg(test)]
mod test_support;

pub use error::LoggingError;
pub use facade::LoggerFacade;
pub use formatter::Formatter;
pub use handler::{Handler, HandlerKind};
pub use logger::Logger;
pub use record::LogRecord;
pub use registry::{LoggerRegistry, RegistryBuilder, ROOT_LOGGER};
pub use severity::Severity;

/// Logger used by [`default_facade`].
pub const DEFAULT_LOGGER: &str = "main";

static REGISTRY: OnceCell<Arc<LoggerRegistry>> = OnceCell::new();

static FACADES: Lazy<Mutex<HashMap<String, Arc<LoggerFacade>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Makes `registry` the process-wide registry.
///
/// Fails, handing the registry back, when one is already in place.
pub fn install(registry: Arc<LoggerRegistry>) -> Result<(), Arc<LoggerRegistry>> {
    REGISTRY.set(registry)
}

/// The process-wide registry, built from [`Settings::load`] unless one was
/// installed first.
pub fn global() -> Result<&'static Arc<LoggerRegistry>, LoggingError> {
    REGISTRY.get_or_try_init(|| {
        let settings = Settings::load()?;
        Ok(Arc::new(LoggerRegistry::new(settings.logging)))
    })
}

/// Process-wide facade for `name`, created on first request.
pub fn facade(name: &str) -> Arc<LoggerFacade> {
    FACADES
        .lock()
        .entry(name.to_string())
        .or_insert_with(|| Arc::new(LoggerFacade::global(name)))
        .clone()
}

pub fn default_facade() -> Arc<LoggerFacade> {
    facade(DEFAULT_LOGGER)
}
