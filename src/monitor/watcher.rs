//! Numeric watchers and their display flags.

use std::sync::Mutex;

use super::Watcher;

/// Which aggregates a watcher renders next to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherDisplay {
    pub show_current: bool,
    pub show_min: bool,
    pub show_average: bool,
    pub show_max: bool,
}

impl Default for WatcherDisplay {
    /// Current value only.
    fn default() -> Self {
        Self {
            show_current: true,
            show_min: false,
            show_average: false,
            show_max: false,
        }
    }
}

impl WatcherDisplay {
    /// Every aggregate enabled.
    pub fn all() -> Self {
        Self {
            show_current: true,
            show_min: true,
            show_average: true,
            show_max: true,
        }
    }
}

/// Tracks a numeric value over time.
///
/// `update` may be called from any thread; the history is unbounded and
/// append-only. Aggregates are computed over the full history on demand
/// and default to `0` while the history is empty.
#[derive(Debug)]
pub struct NumWatcher {
    name: String,
    display: WatcherDisplay,
    history: Mutex<Vec<f64>>,
}

impl NumWatcher {
    pub(crate) fn new(name: impl Into<String>, display: WatcherDisplay) -> Self {
        Self {
            name: name.into(),
            display,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Appends a new value to the history.
    pub fn update(&self, value: f64) {
        self.history.lock().unwrap().push(value);
    }

    /// Smallest recorded value.
    pub fn min(&self) -> f64 {
        let history = self.history.lock().unwrap();
        if history.is_empty() {
            return 0.0;
        }
        history.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest recorded value.
    pub fn max(&self) -> f64 {
        let history = self.history.lock().unwrap();
        if history.is_empty() {
            return 0.0;
        }
        history.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Mean over the full history, rounded to two decimals.
    pub fn average(&self) -> f64 {
        let history = self.history.lock().unwrap();
        if history.is_empty() {
            return 0.0;
        }
        let mean = history.iter().sum::<f64>() / history.len() as f64;
        (mean * 100.0).round() / 100.0
    }

    fn current(&self) -> f64 {
        self.history.lock().unwrap().last().copied().unwrap_or(0.0)
    }
}

impl Watcher for NumWatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn construct_line(&self, allowed_width: usize) -> String {
        let mut value = String::new();
        if self.display.show_current {
            value.push_str(&format!("Current: {} ", self.current()));
        }
        if self.display.show_min {
            value.push_str(&format!("Min: {} ", self.min()));
        }
        if self.display.show_average {
            value.push_str(&format!("Avg: {} ", self.average()));
        }
        if self.display.show_max {
            value.push_str(&format!("Max: {} ", self.max()));
        }

        let used = self.name.chars().count() + value.chars().count();
        if used > allowed_width {
            // All or nothing: a clipped value would be misread.
            return " ".repeat(allowed_width);
        }
        format!("{}{}{}", self.name, " ".repeat(allowed_width - used), value)
    }
}
