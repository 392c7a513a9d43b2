//! Name-keyed caches of formatters, handlers and loggers.
//!
//! Each entry is built from the merged configuration the first time its name
//! is requested and handed out unchanged afterwards. Cache locks are taken in
//! the order loggers, handlers, formatters; the root logger lives in a
//! once-cell so it is configured exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use lumber_config::{LoggingSettings, DEFAULT_ENTRY};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

use crate::sink::ConsoleSink;
use crate::{Formatter, Handler, Logger, LoggerFacade, LoggingError, Severity};

/// Name of the logger every named logger propagates to.
pub const ROOT_LOGGER: &str = "root";

pub struct LoggerRegistry {
    settings: RwLock<Arc<LoggingSettings>>,
    console: ConsoleSink,
    formatters: Mutex<HashMap<String, Arc<Formatter>>>,
    handlers: Mutex<HashMap<String, Arc<Handler>>>,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
    root: OnceCell<Arc<Logger>>,
}

pub struct RegistryBuilder {
    settings: LoggingSettings,
    console: Option<BoxMakeWriter>,
}

impl RegistryBuilder {
    /// Replaces standard error as the destination of `console` handlers.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = Some(BoxMakeWriter::new(writer));
        self
    }

    pub fn build(self) -> LoggerRegistry {
        let console = match self.console {
            Some(writer) => ConsoleSink::new(Arc::new(writer)),
            None => ConsoleSink::stderr(),
        };
        LoggerRegistry {
            settings: RwLock::new(Arc::new(self.settings)),
            console,
            formatters: Mutex::default(),
            handlers: Mutex::default(),
            loggers: Mutex::default(),
            root: OnceCell::new(),
        }
    }
}

impl LoggerRegistry {
    pub fn new(settings: LoggingSettings) -> Self {
        Self::builder(settings).build()
    }

    pub fn builder(settings: LoggingSettings) -> RegistryBuilder {
        RegistryBuilder {
            settings,
            console: None,
        }
    }

    pub fn settings(&self) -> Arc<LoggingSettings> {
        self.settings.read().clone()
    }

    /// Swaps the configuration used for entries built from now on.
    ///
    /// Entries already cached keep the configuration they were built with.
    pub fn reload(&self, settings: LoggingSettings) {
        *self.settings.write() = Arc::new(settings);
    }

    pub fn formatter(&self, name: &str) -> Result<Arc<Formatter>, LoggingError> {
        let mut cache = self.formatters.lock();
        if let Some(formatter) = cache.get(name) {
            return Ok(formatter.clone());
        }

        let config = self.settings().formatter(name)?;
        let formatter = Arc::new(Formatter::new(
            &config.format,
            config.date_format.as_deref(),
        )?);
        tracing::debug!(formatter = name, "built formatter");
        cache.insert(name.to_string(), formatter.clone());
        Ok(formatter)
    }

    pub fn handler(&self, name: &str) -> Result<Arc<Handler>, LoggingError> {
        let mut cache = self.handlers.lock();
        if let Some(handler) = cache.get(name) {
            return Ok(handler.clone());
        }

        let config = self.settings().handler(name)?;
        let formatter = self.formatter(&config.formatter)?;
        let handler = Arc::new(Handler::from_config(name, &config, formatter, &self.console)?);
        tracing::debug!(handler = name, kind = %handler.kind(), "built handler");
        cache.insert(name.to_string(), handler.clone());
        Ok(handler)
    }

    /// Configures the root logger from the `default` logger entry, once.
    pub fn ensure_root(&self) -> Result<&Arc<Logger>, LoggingError> {
        self.root.get_or_try_init(|| {
            let config = self.settings().logger(DEFAULT_ENTRY)?;
            let level = Severity::resolve(&config.level)?;
            let handlers = config
                .handlers
                .iter()
                .map(|name| self.handler(name))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(%level, handlers = ?config.handlers, "configured root logger");
            Ok(Arc::new(Logger::new(ROOT_LOGGER, level, false, handlers, None)))
        })
    }

    pub fn is_root_configured(&self) -> bool {
        self.root.get().is_some()
    }

    pub fn root(&self) -> Option<&Arc<Logger>> {
        self.root.get()
    }

    /// Returns the logger called `name`, building it on first request.
    ///
    /// A freshly built logger records `Logger <name> just initialized` at
    /// `Info` through itself before it is cached.
    pub fn logger(&self, name: &str) -> Result<Arc<Logger>, LoggingError> {
        let root = self.ensure_root()?.clone();

        let mut cache = self.loggers.lock();
        if let Some(logger) = cache.get(name) {
            return Ok(logger.clone());
        }

        let config = self.settings().logger(name)?;
        let level = Severity::resolve(&config.level)?;
        let handlers = config
            .handlers
            .iter()
            .map(|handler| self.handler(handler))
            .collect::<Result<Vec<_>, _>>()?;

        let logger = Arc::new(Logger::new(name, level, config.propagate, handlers, Some(root)));
        logger.log(Severity::Info, format_args!("Logger {name} just initialized"));
        cache.insert(name.to_string(), logger.clone());
        Ok(logger)
    }

    /// A facade bound to this registry. Nothing is built until it logs.
    pub fn facade(self: &Arc<Self>, name: &str) -> LoggerFacade {
        LoggerFacade::new(self.clone(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use lumber_config::Settings;
    use tracing_test::traced_test;

    use crate::test_support::Capture;
    use crate::HandlerKind;

    fn settings(document: &str) -> LoggingSettings {
        Settings::from_yaml_str(document).unwrap().logging
    }

    fn registry(document: &str) -> (LoggerRegistry, Capture) {
        let capture = Capture::default();
        let registry = LoggerRegistry::builder(settings(document))
            .console_writer(capture.clone())
            .build();
        (registry, capture)
    }

    #[traced_test]
    #[test]
    fn formatter_is_built_once() {
        let (registry, _) = registry("{}");

        let first = registry.formatter("x").unwrap();
        let second = registry.formatter("x").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        logs_assert(|lines| {
            match lines.iter().filter(|l| l.contains("built formatter")).count() {
                1 => Ok(()),
                n => Err(format!("formatter built {n} times")),
            }
        });
    }

    #[test]
    fn formatter_override_shadows_default() {
        let (registry, _) = registry(
            r#"
logging:
  formatters:
    terse:
      format: "%(levelname)s %(message)s"
"#,
        );
        let terse = registry.formatter("terse").unwrap();
        assert_eq!(terse.template(), "%(levelname)s %(message)s");
        assert_eq!(terse.date_format(), "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn handler_is_cached_with_its_formatter() {
        let (registry, _) = registry(
            r#"
logging:
  handlers:
    h1:
      level: warning
"#,
        );
        let first = registry.handler("h1").unwrap();
        let second = registry.handler("h1").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.kind(), HandlerKind::Console);
        assert_eq!(first.level(), Some(Severity::Warning));
        assert!(Arc::ptr_eq(first.formatter(), &registry.formatter("default").unwrap()));
    }

    #[test]
    fn file_handler_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs").join("app.log");
        let (registry, _) = registry(&format!(
            "logging:\n  handlers:\n    disk:\n      type: file\n      filename: {}\n",
            target.display()
        ));

        assert!(!target.parent().unwrap().exists());
        let handler = registry.handler("disk").unwrap();
        assert_eq!(handler.kind(), HandlerKind::File);
        assert!(target.parent().unwrap().is_dir());
    }

    #[test]
    fn bogus_handler_type_fails_on_first_use() {
        let (registry, _) = registry("logging:\n  handlers:\n    x:\n      type: bogus\n");
        let err = registry.handler("x").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidHandlerType(kind) if kind == "bogus"));
    }

    #[test]
    fn unknown_logger_level_fails() {
        let (registry, _) = registry("logging:\n  loggers:\n    svc:\n      level: loud\n");
        let err = registry.logger("svc").unwrap_err();
        assert!(matches!(err, LoggingError::UnknownSeverity(level) if level == "loud"));
    }

    #[test]
    fn logger_is_built_once_and_first_build_wins() {
        let (registry, capture) = registry("logging:\n  loggers:\n    svc:\n      level: info\n");

        let first = registry.logger("svc").unwrap();
        registry.reload(settings(
            "logging:\n  loggers:\n    svc:\n      level: error\n      propagate: true\n",
        ));
        let second = registry.logger("svc").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.level(), Severity::Info);
        assert!(!second.propagate());
        assert_eq!(capture.count("Logger svc just initialized"), 1);
    }

    #[test]
    fn root_is_configured_before_the_first_logger() {
        let (registry, capture) = registry("logging:\n  loggers:\n    default:\n      level: warning\n");
        assert!(!registry.is_root_configured());

        let svc = registry.logger("svc").unwrap();

        assert!(registry.is_root_configured());
        let root = registry.root().unwrap();
        assert!(Arc::ptr_eq(svc.parent().unwrap(), root));
        assert_eq!(root.name(), ROOT_LOGGER);
        assert_eq!(root.level(), Severity::Warning);
        assert_eq!(root.handlers().len(), 1);
        assert!(capture.lines().is_empty(), "root emits no init record");
    }

    #[test]
    fn concurrent_first_use_configures_root_once() {
        let (registry, capture) = registry("{}");
        let registry = Arc::new(registry);

        let loggers: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || registry.logger(&format!("worker-{i}")).unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let root = registry.root().unwrap();
        for logger in &loggers {
            assert!(Arc::ptr_eq(logger.parent().unwrap(), root));
        }
        let console = registry.handler("console").unwrap();
        assert!(Arc::ptr_eq(&root.handlers()[0], &console));
        for i in 0..8 {
            assert_eq!(capture.count(&format!("Logger worker-{i} just initialized")), 1);
        }
    }

    #[test]
    fn concurrent_first_use_of_one_name_builds_once() {
        let (registry, capture) = registry("{}");
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.logger("svc").unwrap())
            })
            .collect();
        let loggers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(loggers.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(capture.count("Logger svc just initialized"), 1);
    }

    #[test]
    fn propagating_logger_reaches_root_handlers() {
        let (registry, capture) = registry(
            r#"
logging:
  handlers:
    shout:
      formatter: tagged
  formatters:
    tagged:
      format: "[own] %(message)s"
  loggers:
    svc:
      propagate: true
      handlers: [shout]
"#,
        );

        registry.logger("svc").unwrap().log(Severity::Warning, "disk full");

        assert_eq!(capture.count("[own] disk full"), 1);
        assert_eq!(capture.count("disk full"), 2);
    }
}
