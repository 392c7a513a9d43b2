//! Typed views over merged section entries.
//!
//! Level names and handler types stay plain strings here; the logging layer
//! resolves them (and reports bad values) when an entry is first built.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Rotation threshold used when a file handler sets no `max_bytes`.
pub const DEFAULT_MAX_BYTES: u64 = 52_428_800;

/// Message template of a formatter entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// printf-style record template, e.g. `%(asctime)s - %(message)s`.
    pub format: String,

    /// strftime pattern for `%(asctime)s`.
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Output sink of a handler entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Sink kind, `console` or `file`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Minimum severity name, `notset` for no threshold.
    pub level: String,

    /// Formatter entry attached to this handler.
    pub formatter: String,

    /// Target path for `file` handlers.
    #[serde(default)]
    pub filename: Option<PathBuf>,

    /// Rotate once the file would grow past this many bytes.
    #[serde(default = "default_max_bytes", deserialize_with = "deserialize_size")]
    pub max_bytes: u64,

    /// Rotated files kept next to the live one.
    #[serde(default = "default_backup_count")]
    pub backup_count: u32,
}

/// Logger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub level: String,
    pub propagate: bool,
    pub handlers: Vec<String>,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_backup_count() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Num(u64),
    Str(String),
}

/// Accepts plain byte counts or human sizes such as `"10MiB"`.
fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Num(n) => Ok(n),
        SizeValue::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

pub(crate) fn parse_size(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let number: f64 = number
        .parse()
        .map_err(|_| format!("invalid size `{input}`"))?;
    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kb" | "kib" => 1 << 10,
        "mb" | "mib" => 1 << 20,
        "gb" | "gib" => 1 << 30,
        other => return Err(format!("unknown size unit `{other}`")),
    };
    Ok((number * multiplier as f64) as u64)
}
