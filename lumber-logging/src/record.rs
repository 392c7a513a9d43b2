use std::error::Error as StdError;
use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::Severity;

/// A single message on its way to the handlers.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub logger: String,
    pub severity: Severity,
    pub message: String,
    pub created: DateTime<Local>,
    pub process: u32,
    /// Numeric id of the emitting thread.
    pub thread_id: u64,
    pub thread: String,
    /// Rendered error chain attached by `exception`.
    pub error: Option<String>,
}

impl LogRecord {
    pub fn new(logger: &str, severity: Severity, message: String) -> Self {
        let current = std::thread::current();
        Self {
            logger: logger.to_string(),
            severity,
            message,
            created: Local::now(),
            process: std::process::id(),
            thread_id: thread_number(current.id()),
            thread: current.name().unwrap_or("unnamed").to_string(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: &(dyn StdError + 'static)) -> Self {
        self.error = Some(render_error_chain(error));
        self
    }
}

/// `ThreadId` only exposes its number through `Debug` (`ThreadId(N)`).
fn thread_number(id: std::thread::ThreadId) -> u64 {
    format!("{id:?}")
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// `Error: <top>` followed by one `Caused by:` line per source.
pub(crate) fn render_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = format!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(rendered, "\nCaused by: {cause}");
        source = cause.source();
    }
    rendered
}
