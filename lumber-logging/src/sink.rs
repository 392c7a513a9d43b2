//! Output destinations for formatted lines.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

use crate::LoggingError;

/// Receives one fully formatted line per record.
pub trait Sink: Send + Sync + fmt::Debug {
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Stream sink. Each line asks the shared `MakeWriter` for a fresh writer,
/// standard error unless the registry was built with another one.
#[derive(Clone)]
pub struct ConsoleSink {
    writer: Arc<BoxMakeWriter>,
}

impl ConsoleSink {
    pub fn new(writer: Arc<BoxMakeWriter>) -> Self {
        Self { writer }
    }

    pub fn stderr() -> Self {
        Self::new(Arc::new(BoxMakeWriter::new(io::stderr)))
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.writer.make_writer();
        writer.write_all(buf.as_bytes())?;
        writer.flush()
    }
}

#[derive(Debug)]
struct FileState {
    file: File,
    size: u64,
}

/// Append-mode file that rolls over before a write would reach `max_bytes`.
///
/// With `backup_count > 0` the live file becomes `<path>.1`, older backups
/// shift up by one and the oldest falls off. With `backup_count == 0` the
/// file is truncated in place. `max_bytes == 0` never rotates.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    pub fn open(path: &Path, max_bytes: u64, backup_count: u32) -> Result<Self, LoggingError> {
        let open_error = |source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_error)?;
        let size = file.metadata().map_err(open_error)?.len();

        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backup_count,
            state: Mutex::new(FileState { file, size }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn roll_over(&self, state: &mut FileState) -> io::Result<()> {
        state.file.flush()?;

        if self.backup_count > 0 {
            for index in (1..self.backup_count).rev() {
                let source = self.backup_path(index);
                if source.exists() {
                    fs::rename(&source, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        state.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        state.size = 0;
        tracing::debug!(path = %self.path.display(), "rolled over log file");
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        let len = buf.len() as u64;

        let mut state = self.state.lock();
        if self.max_bytes > 0 && state.size > 0 && state.size + len >= self.max_bytes {
            if let Err(error) = self.roll_over(&mut state) {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "log rollover failed, appending to the current file"
                );
            }
        }
        state.file.write_all(buf.as_bytes())?;
        state.size += len;
        Ok(())
    }
}
