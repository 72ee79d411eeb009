//! Monitor tabs: live numeric values in a two-column layout.

pub mod watcher;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::tab::Tab;

use watcher::{NumWatcher, WatcherDisplay};

/// Errors from watcher registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherError {
    /// A watcher with this name already exists on the tab.
    DuplicateName(String),
}

impl std::fmt::Display for WatcherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatcherError::DuplicateName(name) => {
                write!(f, "watcher name already in use: {}", name)
            }
        }
    }
}

impl std::error::Error for WatcherError {}

/// A monitored value rendered as one fixed-width column.
///
/// Object-safe so a tab can mix watcher kinds.
pub trait Watcher: Send + Sync {
    /// The name shown next to the value.
    fn name(&self) -> &str;

    /// Renders this watcher into exactly `allowed_width` characters.
    ///
    /// Implementations that cannot fit must return `allowed_width` spaces
    /// rather than an ambiguous truncation.
    fn construct_line(&self, allowed_width: usize) -> String;
}

/// A tab showing watchers side by side, two columns per row.
pub struct MonitorTab {
    name: String,
    arrow_switch: AtomicBool,
    watchers: Mutex<BTreeMap<String, Arc<dyn Watcher>>>,
}

impl MonitorTab {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            arrow_switch: AtomicBool::new(true),
            watchers: Mutex::new(BTreeMap::new()),
        })
    }

    /// Allows or forbids arrow-key switching while this tab is active.
    pub fn set_arrow_switch(&self, allow: bool) {
        self.arrow_switch.store(allow, Ordering::Relaxed);
    }

    /// Creates a numeric watcher and adds it to this tab.
    pub fn num_watcher(
        &self,
        name: impl Into<String>,
        display: WatcherDisplay,
    ) -> Result<Arc<NumWatcher>, WatcherError> {
        let watcher = Arc::new(NumWatcher::new(name, display));
        self.add_watcher(watcher.clone())?;
        Ok(watcher)
    }

    /// Adds a custom watcher. Names are unique within the tab.
    pub fn add_watcher(&self, watcher: Arc<dyn Watcher>) -> Result<(), WatcherError> {
        let name = watcher.name().to_string();
        let mut watchers = self.watchers.lock().unwrap();
        if watchers.contains_key(&name) {
            return Err(WatcherError::DuplicateName(name));
        }
        watchers.insert(name, watcher);
        Ok(())
    }
}

impl Tab for MonitorTab {
    fn name(&self) -> &str {
        &self.name
    }

    fn arrow_switch(&self) -> bool {
        self.arrow_switch.load(Ordering::Relaxed)
    }

    fn draw(&self, allowed_lines: usize, width: usize) -> Vec<String> {
        let column_width = (width / 2).saturating_sub(2);
        let slots = allowed_lines * 2;

        // Watchers render in name order; anything past the visible slots
        // is left out.
        let mut columns: Vec<String> = {
            let watchers = self.watchers.lock().unwrap();
            watchers
                .values()
                .take(slots)
                .map(|w| w.construct_line(column_width))
                .collect()
        };
        columns.resize(slots, " ".repeat(column_width));

        columns
            .chunks(2)
            .map(|pair| format!("{}│{}", pair[0], pair[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWatcher {
        name: String,
    }

    impl Watcher for FixedWatcher {
        fn name(&self) -> &str {
            &self.name
        }

        fn construct_line(&self, allowed_width: usize) -> String {
            let mut line = self.name.clone();
            line.truncate(allowed_width);
            line.push_str(&" ".repeat(allowed_width - line.chars().count()));
            line
        }
    }

    fn fixed(name: &str) -> Arc<dyn Watcher> {
        Arc::new(FixedWatcher {
            name: name.to_string(),
        })
    }

    #[test]
    fn duplicate_watcher_names_are_rejected() {
        let tab = MonitorTab::new("mon");
        tab.num_watcher("cpu", WatcherDisplay::default()).unwrap();

        let err = tab.num_watcher("cpu", WatcherDisplay::default()).unwrap_err();
        assert_eq!(err, WatcherError::DuplicateName("cpu".to_string()));
    }

    #[test]
    fn draw_always_fills_the_allowed_lines() {
        let tab = MonitorTab::new("mon");
        tab.add_watcher(fixed("a")).unwrap();

        let lines = tab.draw(3, 20);
        assert_eq!(lines.len(), 3);
        // Column width is 20 / 2 - 2 = 8, joined by one separator.
        for line in &lines {
            assert_eq!(line.chars().count(), 17);
        }
    }

    #[test]
    fn draw_pairs_watchers_two_per_row_in_name_order() {
        let tab = MonitorTab::new("mon");
        for name in ["delta", "alpha", "charlie"] {
            tab.add_watcher(fixed(name)).unwrap();
        }

        let lines = tab.draw(2, 20);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("alpha"));
        assert!(lines[0].contains("│charlie"));
        assert!(lines[1].starts_with("delta"));
        // The fourth slot has no watcher and stays blank.
        assert!(lines[1].ends_with("│        "));
    }

    #[test]
    fn draw_clips_watchers_beyond_the_visible_slots() {
        let tab = MonitorTab::new("mon");
        for name in ["a", "b", "c", "d", "e"] {
            tab.add_watcher(fixed(name)).unwrap();
        }

        // One line has two slots; only "a" and "b" fit.
        let lines = tab.draw(1, 20);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('a'));
        assert!(lines[0].contains("│b"));
    }
}
