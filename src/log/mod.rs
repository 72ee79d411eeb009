//! Log tabs, the logging facade and formatted log entries.

pub mod fs;
pub mod writer;

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};

use crate::engine::Dashboard;
use crate::engine::command::Command;
use crate::engine::render::wrapped_row_count;
use crate::tab::Tab;

/// Severity of a log entry.
///
/// Entries at `Warning` and above are additionally written to the per-tab
/// error file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

/// Formats an entry the way it appears in the tab and in the log files.
fn format_entry(level: LogLevel, message: &dyn Display, at: DateTime<Local>) -> String {
    format!("{} [{}] {}", at.format("%H:%M:%S%.3f"), level.label(), message)
}

/// A tab showing the most recent log entries, newest at the bottom.
///
/// The buffer is unbounded and append-only. Appends happen on the render
/// thread when the queued entry executes, so a line becomes visible on the
/// frame after the `Logger` call that produced it.
#[derive(Debug)]
pub struct LogTab {
    name: String,
    arrow_switch: AtomicBool,
    buffer: Mutex<Vec<String>>,
}

impl LogTab {
    /// Creates a log tab. The name must be non-empty and unique within the
    /// dashboard it is registered with; both are checked at registration.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            arrow_switch: AtomicBool::new(true),
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// Allows or forbids arrow-key switching while this tab is active.
    ///
    /// Should never be left `false` permanently.
    pub fn set_arrow_switch(&self, allow: bool) {
        self.arrow_switch.store(allow, Ordering::Relaxed);
    }

    pub(crate) fn push(&self, line: String) {
        self.buffer.lock().unwrap().push(line);
    }
}

impl Tab for LogTab {
    fn name(&self) -> &str {
        &self.name
    }

    fn arrow_switch(&self) -> bool {
        self.arrow_switch.load(Ordering::Relaxed)
    }

    fn draw(&self, allowed_lines: usize, width: usize) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        let start = buffer.len().saturating_sub(allowed_lines);
        let mut entries = buffer[start..].to_vec();
        drop(buffer);

        // An entry longer than the terminal is wide wraps over several
        // rows; drop the oldest entries until everything fits the budget.
        let mut rows: usize = entries
            .iter()
            .map(|entry| wrapped_row_count(entry, width))
            .sum();
        while rows > allowed_lines && !entries.is_empty() {
            rows -= wrapped_row_count(&entries[0], width);
            entries.remove(0);
        }
        entries
    }
}

/// Logging facade bound to one log tab.
///
/// Cheap to clone; every producer thread can hold its own. Each call
/// captures the timestamp and formats the entry immediately, then queues
/// it for the render thread.
#[derive(Clone)]
pub struct Logger {
    dashboard: Dashboard,
    tab: Arc<LogTab>,
}

impl Logger {
    pub fn new(dashboard: &Dashboard, tab: Arc<LogTab>) -> Self {
        Self {
            dashboard: dashboard.clone(),
            tab,
        }
    }

    pub fn debug(&self, message: impl Display) {
        self.log(LogLevel::Debug, &message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(LogLevel::Info, &message);
    }

    pub fn warning(&self, message: impl Display) {
        self.log(LogLevel::Warning, &message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(LogLevel::Error, &message);
    }

    pub fn fatal(&self, message: impl Display) {
        self.log(LogLevel::Fatal, &message);
    }

    fn log(&self, level: LogLevel, message: &dyn Display) {
        let line = format_entry(level, message, Local::now());
        self.dashboard.submit(Command::Append {
            tab: Arc::clone(&self.tab),
            level,
            line,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_of_len(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn format_entry_includes_time_level_and_message() {
        let at = Local.with_ymd_and_hms(2026, 8, 25, 13, 5, 59).unwrap();
        let line = format_entry(LogLevel::Warning, &"disk almost full", at);
        assert_eq!(line, "13:05:59.000 [WARNING] disk almost full");
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning > LogLevel::Info);
        assert!(LogLevel::Fatal > LogLevel::Error);
    }

    #[test]
    fn draw_returns_newest_entries() {
        let tab = LogTab::new("log");
        for i in 0..10 {
            tab.push(format!("entry {i}"));
        }

        let lines = tab.draw(3, 80);
        assert_eq!(lines, vec!["entry 7", "entry 8", "entry 9"]);
    }

    #[test]
    fn draw_never_exceeds_the_row_budget() {
        let tab = LogTab::new("log");
        // Each entry wraps to 3 rows at width 10.
        for _ in 0..5 {
            tab.push(entry_of_len(25));
        }

        let lines = tab.draw(7, 10);
        // Two entries cost 6 rows; a third would go over 7.
        assert_eq!(lines.len(), 2);

        let rows: usize = lines
            .iter()
            .map(|l| wrapped_row_count(l, 10))
            .sum();
        assert!(rows <= 7);
    }

    #[test]
    fn draw_counts_exact_multiples_without_an_extra_row() {
        let tab = LogTab::new("log");
        // 20 chars at width 10 is exactly 2 rows, so both entries fit in 4.
        tab.push(entry_of_len(20));
        tab.push(entry_of_len(20));

        assert_eq!(tab.draw(4, 10).len(), 2);
    }

    #[test]
    fn draw_drops_everything_when_one_entry_is_too_tall() {
        let tab = LogTab::new("log");
        tab.push(entry_of_len(100));

        assert!(tab.draw(2, 10).is_empty());
    }

    #[test]
    fn arrow_switch_is_togglable() {
        let tab = LogTab::new("log");
        assert!(tab.arrow_switch());
        tab.set_arrow_switch(false);
        assert!(!tab.arrow_switch());
        tab.set_arrow_switch(true);
        assert!(tab.arrow_switch());
    }
}
