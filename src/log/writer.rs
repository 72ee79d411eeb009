//! Background log writer: durable log files and startup archival.
//!
//! Runs on its own thread with its own queue so file I/O never touches the
//! render thread. Failures are contained here and reported through
//! `tracing`.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::warn;

use super::LogLevel;
use super::fs::LogFileSystem;

/// One entry bound for the on-disk logs.
#[derive(Debug)]
pub(crate) struct LogRecord {
    pub(crate) tab: String,
    pub(crate) level: LogLevel,
    pub(crate) line: String,
}

/// Replaces characters that are not allowed in file names with `_`.
pub(crate) fn sanitize_tab_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '<' | '>' | ':' | '"' | '/' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Appends queued log records to per-tab files under a logs directory.
pub(crate) struct LogWriter<F: LogFileSystem> {
    fs: F,
    dir: PathBuf,
}

impl<F: LogFileSystem> LogWriter<F> {
    pub(crate) fn new(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    /// Thread body: archive leftovers from the previous run, then append
    /// records until the queue disconnects. The engine drops its sender
    /// during `stop`, after the render thread has forwarded everything
    /// still queued, so every record submitted before the stop reaches
    /// disk.
    pub(crate) fn run(&self, rx: Receiver<LogRecord>) {
        if let Err(err) = self.prepare() {
            warn!(
                "log writer could not prepare {}: {}",
                self.dir.display(),
                err
            );
        }

        while let Ok(record) = rx.recv() {
            self.write_record(&record);
        }
    }

    /// Ensures the logs directory exists and bundles any `.log` files a
    /// previous run left behind into a zip archive.
    fn prepare(&self) -> io::Result<()> {
        self.fs.ensure_dir(&self.dir)?;
        if !self.fs.files_with_extension(&self.dir, "log")?.is_empty() {
            self.archive_leftovers()?;
        }
        Ok(())
    }

    fn archive_leftovers(&self) -> io::Result<()> {
        let temp = self.dir.join("temp");
        // A leftover temp directory means an earlier archival was cut short.
        if self.fs.exists(&temp) {
            self.fs.remove_dir_all(&temp)?;
        }
        self.fs.ensure_dir(&temp)?;

        let logs = self.fs.files_with_extension(&self.dir, "log")?;
        let mut oldest: Option<SystemTime> = None;
        for path in &logs {
            let Some(name) = path.file_name() else { continue };
            let created = self.fs.created(path)?;
            if oldest.is_none_or(|current| created < current) {
                oldest = Some(created);
            }
            self.fs.rename(path, &temp.join(name))?;
        }

        if let Some(oldest) = oldest {
            let stamp = DateTime::<Local>::from(oldest)
                .format("%Y-%m-%d_%H-%M")
                .to_string();
            self.fs.zip_dir(&temp, &self.archive_path(&stamp))?;
        }
        self.fs.remove_dir_all(&temp)
    }

    /// First `Log_<stamp>_<n>.zip` that does not collide with an existing
    /// archive.
    fn archive_path(&self, stamp: &str) -> PathBuf {
        let mut n = 0u32;
        loop {
            let candidate = self.dir.join(format!("Log_{stamp}_{n}.zip"));
            if !self.fs.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn write_record(&self, record: &LogRecord) {
        let safe = sanitize_tab_name(&record.tab);

        let latest = self.dir.join(format!("Log_{safe}_latest.log"));
        if let Err(err) = self.fs.append_line(&latest, &record.line) {
            warn!("log writer failed to append to {}: {}", latest.display(), err);
        }

        if record.level >= LogLevel::Warning {
            let errors = self.dir.join(format!("Log_{safe}_error.log"));
            if let Err(err) = self.fs.append_line(&errors, &record.line) {
                warn!("log writer failed to append to {}: {}", errors.display(), err);
            }
        }
    }
}
