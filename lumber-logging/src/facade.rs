//! Deferred logger handles.
//!
//! A facade only remembers a name. The first message call resolves it
//! through its registry (the process-wide one unless bound explicitly) and
//! the resolved logger is kept for every later call.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{Logger, LoggerRegistry, LoggingError, Severity};

enum Binding {
    Global,
    Registry(Arc<LoggerRegistry>),
}

pub struct LoggerFacade {
    name: String,
    binding: Binding,
    logger: OnceCell<Arc<Logger>>,
}

impl LoggerFacade {
    pub fn new(registry: Arc<LoggerRegistry>, name: &str) -> Self {
        Self::with_binding(Binding::Registry(registry), name)
    }

    pub(crate) fn global(name: &str) -> Self {
        Self::with_binding(Binding::Global, name)
    }

    fn with_binding(binding: Binding, name: &str) -> Self {
        Self {
            name: name.to_string(),
            binding,
            logger: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a message call has already resolved the logger.
    pub fn is_resolved(&self) -> bool {
        self.logger.get().is_some()
    }

    pub fn logger(&self) -> Result<&Arc<Logger>, LoggingError> {
        self.logger.get_or_try_init(|| match &self.binding {
            Binding::Global => crate::global()?.logger(&self.name),
            Binding::Registry(registry) => registry.logger(&self.name),
        })
    }

    pub fn log(&self, severity: Severity, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.logger()?.log(severity, message);
        Ok(())
    }

    pub fn debug(&self, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.log(Severity::Debug, message)
    }

    pub fn info(&self, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.log(Severity::Info, message)
    }

    pub fn warning(&self, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.log(Severity::Warning, message)
    }

    pub fn error(&self, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.log(Severity::Error, message)
    }

    pub fn critical(&self, message: impl fmt::Display) -> Result<(), LoggingError> {
        self.log(Severity::Critical, message)
    }

    /// `Error` record carrying `error` and its `source()` chain.
    pub fn exception(
        &self,
        message: impl fmt::Display,
        error: &(dyn StdError + 'static),
    ) -> Result<(), LoggingError> {
        self.logger()?.exception(message, error);
        Ok(())
    }
}

impl fmt::Debug for LoggerFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerFacade")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use lumber_config::Settings;

    use crate::test_support::Capture;

    const APP: &str = r#"
logging:
  handlers:
    h1:
      type: console
      level: info
  loggers:
    app:
      level: debug
      handlers: [h1]
"#;

    fn registry(document: &str) -> (Arc<LoggerRegistry>, Capture) {
        let capture = Capture::default();
        let registry = LoggerRegistry::builder(Settings::from_yaml_str(document).unwrap().logging)
            .console_writer(capture.clone())
            .build();
        (Arc::new(registry), capture)
    }

    #[test]
    fn construction_defers_every_lookup() {
        let (registry, capture) = registry(APP);
        let facade = registry.facade("app");

        assert!(!facade.is_resolved());
        assert!(!registry.is_root_configured());

        facade.info("first").unwrap();

        assert!(facade.is_resolved());
        assert!(registry.is_root_configured());
        assert_eq!(capture.count("first"), 1);
    }

    #[test]
    fn handler_threshold_filters_console_output() {
        let (registry, capture) = registry(APP);
        let facade = registry.facade("app");

        facade.info("hello").unwrap();
        facade.debug("hidden").unwrap();

        assert_eq!(capture.count("hello"), 1);
        assert_eq!(capture.count("hidden"), 0);
    }

    #[test]
    fn every_level_is_routed() {
        let (registry, capture) = registry(APP);
        let facade = registry.facade("app");

        facade.warning("w").unwrap();
        facade.error("e").unwrap();
        facade.critical("c").unwrap();

        assert_eq!(capture.count("WARNING - w"), 1);
        assert_eq!(capture.count("ERROR - e"), 1);
        assert_eq!(capture.count("CRITICAL - c"), 1);
    }

    #[test]
    fn exception_carries_the_error() {
        let (registry, capture) = registry(APP);
        let error = io::Error::new(io::ErrorKind::PermissionDenied, "cannot open socket");

        registry.facade("app").exception("startup failed", &error).unwrap();

        let lines = capture.lines();
        let at = lines.iter().position(|l| l.ends_with("startup failed")).unwrap();
        assert_eq!(lines[at + 1], "Error: cannot open socket");
    }

    #[test]
    fn facades_share_the_registry_entry() {
        let (registry, capture) = registry(APP);

        registry.facade("app").info("one").unwrap();
        registry.facade("app").info("two").unwrap();

        assert_eq!(capture.count("Logger app just initialized"), 1);
        assert!(Arc::ptr_eq(
            registry.facade("app").logger().unwrap(),
            &registry.logger("app").unwrap()
        ));
    }

    #[test]
    fn construction_errors_surface_on_first_call() {
        let (registry, _) = registry("logging:\n  loggers:\n    app:\n      handlers: [x]\n  handlers:\n    x:\n      type: syslog\n");
        let facade = registry.facade("app");

        let err = facade.info("never written").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidHandlerType(kind) if kind == "syslog"));
        assert!(!facade.is_resolved());
    }
}
