use std::error::Error as StdError;
use std::sync::Arc;

use crate::{Handler, LogRecord, Severity};

/// A named logger. Immutable once the registry hands it out.
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: Severity,
    propagate: bool,
    handlers: Vec<Arc<Handler>>,
    parent: Option<Arc<Logger>>,
}

impl Logger {
    pub fn new(
        name: &str,
        level: Severity,
        propagate: bool,
        handlers: Vec<Arc<Handler>>,
        parent: Option<Arc<Logger>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            level,
            propagate,
            handlers,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn propagate(&self) -> bool {
        self.propagate
    }

    pub fn handlers(&self) -> &[Arc<Handler>] {
        &self.handlers
    }

    pub fn parent(&self) -> Option<&Arc<Logger>> {
        self.parent.as_ref()
    }

    /// Own level, or the nearest ancestor's when this one is `NotSet`.
    pub fn effective_level(&self) -> Severity {
        let mut logger = self;
        loop {
            if logger.level != Severity::NotSet {
                return logger.level;
            }
            match &logger.parent {
                Some(parent) => logger = parent.as_ref(),
                None => return Severity::NotSet,
            }
        }
    }

    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        severity >= self.effective_level()
    }

    pub fn log(&self, severity: Severity, message: impl ToString) {
        if self.is_enabled_for(severity) {
            self.dispatch(&LogRecord::new(&self.name, severity, message.to_string()));
        }
    }

    /// Logs at `Error` with the error and its sources attached.
    pub fn exception(&self, message: impl ToString, error: &(dyn StdError + 'static)) {
        if self.is_enabled_for(Severity::Error) {
            let record = LogRecord::new(&self.name, Severity::Error, message.to_string());
            self.dispatch(&record.with_error(error));
        }
    }

    /// Runs this logger's handlers, then each ancestor's while `propagate`
    /// allows. Ancestor levels are not consulted, only their handlers'.
    fn dispatch(&self, record: &LogRecord) {
        let mut logger = Some(self);
        while let Some(current) = logger {
            for handler in &current.handlers {
                handler.handle(record);
            }
            logger = if current.propagate {
                current.parent.as_deref()
            } else {
                None
            };
        }
    }
}
