//! Handlers: a severity threshold, a formatter and a sink.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lumber_config::{ConfigError, HandlerConfig};

use crate::sink::{ConsoleSink, RotatingFileSink, Sink};
use crate::{Formatter, LogRecord, LoggingError, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Console,
    File,
}

impl FromStr for HandlerKind {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(HandlerKind::Console),
            "file" => Ok(HandlerKind::File),
            other => Err(LoggingError::InvalidHandlerType(other.to_string())),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandlerKind::Console => "console",
            HandlerKind::File => "file",
        })
    }
}

#[derive(Debug)]
pub struct Handler {
    name: String,
    kind: HandlerKind,
    level: Option<Severity>,
    formatter: Arc<Formatter>,
    sink: Box<dyn Sink>,
}

impl Handler {
    pub fn new(
        name: &str,
        kind: HandlerKind,
        level: Option<Severity>,
        formatter: Arc<Formatter>,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            level,
            formatter,
            sink,
        }
    }

    /// Builds the sink a merged handler entry describes.
    ///
    /// `file` handlers get their parent directory created when missing.
    pub(crate) fn from_config(
        name: &str,
        config: &HandlerConfig,
        formatter: Arc<Formatter>,
        console: &ConsoleSink,
    ) -> Result<Self, LoggingError> {
        let kind: HandlerKind = config.kind.parse()?;
        let sink: Box<dyn Sink> = match kind {
            HandlerKind::Console => Box::new(console.clone()),
            HandlerKind::File => {
                let path = config.filename.as_deref().ok_or_else(|| ConfigError::MissingKey {
                    section: "handlers",
                    name: name.to_string(),
                    key: "filename",
                })?;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent).map_err(|source| {
                            LoggingError::CreateDir {
                                path: parent.to_path_buf(),
                                source,
                            }
                        })?;
                        tracing::debug!(directory = %parent.display(), "created log directory");
                    }
                }
                Box::new(RotatingFileSink::open(
                    path,
                    config.max_bytes,
                    config.backup_count,
                )?)
            }
        };

        let level = match config.level.as_str() {
            "notset" => None,
            other => Some(Severity::resolve(other)?),
        };

        Ok(Self::new(name, kind, level, formatter, sink))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn level(&self) -> Option<Severity> {
        self.level
    }

    pub fn formatter(&self) -> &Arc<Formatter> {
        &self.formatter
    }

    /// Formats and writes `record` unless it falls below this handler's level.
    ///
    /// Sink failures are reported through `tracing` and otherwise dropped.
    pub fn handle(&self, record: &LogRecord) {
        if self.level.is_some_and(|level| record.severity < level) {
            return;
        }
        let line = self.formatter.format(record);
        if let Err(error) = self.sink.write_line(&line) {
            tracing::warn!(handler = %self.name, %error, "failed to write log record");
        }
    }
}
