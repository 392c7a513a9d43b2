//! printf-style record templates.
//!
//! Templates use `%(field)s` placeholders with an optional `-` (left
//! alignment) and a minimum width, e.g. `%(levelname)-8s`. `%%` is a literal
//! percent sign. Templates are compiled once when the formatter is built.

use chrono::format::{Item, StrftimeItems};

use crate::{LogRecord, LoggingError};

/// `date_format` used when the configuration leaves it out.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Widest padding a placeholder may ask for.
const MAX_WIDTH: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Asctime,
    Name,
    Levelname,
    Levelno,
    Message,
    Process,
    Thread,
    ThreadName,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "asctime" => Field::Asctime,
            "name" => Field::Name,
            "levelname" => Field::Levelname,
            "levelno" => Field::Levelno,
            "message" => Field::Message,
            "process" => Field::Process,
            "thread" => Field::Thread,
            "threadName" => Field::ThreadName,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: Field,
        left: bool,
        width: usize,
    },
}

/// Compiled message template plus timestamp pattern.
#[derive(Debug)]
pub struct Formatter {
    template: String,
    date_format: String,
    segments: Vec<Segment>,
}

impl Formatter {
    pub fn new(template: &str, date_format: Option<&str>) -> Result<Self, LoggingError> {
        let date_format = date_format.unwrap_or(DEFAULT_DATE_FORMAT);
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(LoggingError::InvalidDateFormat(date_format.to_string()));
        }

        Ok(Self {
            template: template.to_string(),
            date_format: date_format.to_string(),
            segments: compile(template)?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Renders one record; an attached error chain follows on new lines.
    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, left, width } => {
                    let value = self.render(*field, record);
                    let width = *width;
                    if *left {
                        out.push_str(&format!("{value:<width$}"));
                    } else {
                        out.push_str(&format!("{value:>width$}"));
                    }
                }
            }
        }
        if let Some(error) = &record.error {
            out.push('\n');
            out.push_str(error);
        }
        out
    }

    fn render(&self, field: Field, record: &LogRecord) -> String {
        match field {
            Field::Asctime => record.created.format(&self.date_format).to_string(),
            Field::Name => record.logger.clone(),
            Field::Levelname => record.severity.as_str().to_string(),
            Field::Levelno => record.severity.ordinal().to_string(),
            Field::Message => record.message.clone(),
            Field::Process => record.process.to_string(),
            Field::Thread => record.thread_id.to_string(),
            Field::ThreadName => record.thread.clone(),
        }
    }
}

fn compile(template: &str) -> Result<Vec<Segment>, LoggingError> {
    let invalid = |reason: &str| LoggingError::InvalidFormat {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => literal.push('%'),
            Some('(') => {
                let name: String = chars.by_ref().take_while(|c| *c != ')').collect();
                let field = Field::parse(&name)
                    .ok_or_else(|| invalid(&format!("unknown field `{name}`")))?;

                let left = chars.next_if_eq(&'-').is_some();
                let mut width = 0usize;
                while let Some(digit) = chars.next_if(|c| c.is_ascii_digit()) {
                    width = width
                        .checked_mul(10)
                        .and_then(|w| w.checked_add(digit.to_digit(10).unwrap_or(0) as usize))
                        .filter(|w| *w <= MAX_WIDTH)
                        .ok_or_else(|| invalid("placeholder width out of range"))?;
                }
                match chars.next() {
                    Some('s' | 'd') => {}
                    Some(other) => return Err(invalid(&format!("unsupported conversion `{other}`"))),
                    None => return Err(invalid("unterminated placeholder")),
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field { field, left, width });
            }
            _ => return Err(invalid("expected `(` or `%` after `%`")),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
