//! Commands executed by the render thread.

use std::sync::Arc;

use crate::log::writer::LogRecord;
use crate::log::{LogLevel, LogTab};
use crate::tab::Tab;
use crate::term::Key;

use super::Shared;

/// A state mutation submitted to the render thread.
///
/// Producers enqueue commands from any thread; the render thread drains the
/// queue in FIFO order before drawing each frame, so everything queued
/// before a frame is visible in that frame.
#[derive(Debug)]
pub enum Command {
    /// A raw key press, tagged with the tab that was active when it
    /// arrived.
    Key { tab: String, key: Key },
    /// A formatted log entry for a log tab's buffer and the durable
    /// writer.
    Append {
        tab: Arc<LogTab>,
        level: LogLevel,
        line: String,
    },
    /// A direct switch to the named tab.
    Switch { target: String },
}

/// Applies one command to the dashboard state. Runs on the render thread
/// only; buffer appends and tab switches happen nowhere else.
pub(crate) fn apply(shared: &Shared, command: Command) {
    match command {
        Command::Key { tab, key } => apply_key(shared, &tab, key),
        Command::Append { tab, level, line } => {
            tab.push(line.clone());
            shared.forward_record(LogRecord {
                tab: tab.name().to_string(),
                level,
                line,
            });
        }
        Command::Switch { target } => {
            if shared.tabs.lock().unwrap().contains_key(&target) {
                shared.set_active(target);
            }
        }
    }
}

fn apply_key(shared: &Shared, tab: &str, key: Key) {
    match key {
        Key::Left | Key::Right => {
            // The tagged tab decides whether arrow switching is allowed,
            // even if the active tab has changed since the press.
            let allowed = shared
                .tabs
                .lock()
                .unwrap()
                .get(tab)
                .is_some_and(|t| t.arrow_switch());
            if allowed {
                rotate(shared, matches!(key, Key::Right));
            }
        }
        // Reserved for per-tab scrolling.
        Key::Up | Key::Down => {}
        Key::Interrupt => shared.request_stop(),
    }
}

/// Moves the active tab forward or back through the sorted name list,
/// wrapping at both ends.
fn rotate(shared: &Shared, forward: bool) {
    let names: Vec<String> = shared.tabs.lock().unwrap().keys().cloned().collect();
    if names.is_empty() {
        return;
    }
    let Some(active) = shared.active_tab() else {
        return;
    };
    let Some(index) = names.iter().position(|name| *name == active) else {
        return;
    };
    let next = if forward {
        (index + 1) % names.len()
    } else {
        (index + names.len() - 1) % names.len()
    };
    shared.set_active(names[next].clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Dashboard;

    fn dashboard_with_tabs(names: &[&str]) -> Dashboard {
        let dashboard = Dashboard::detached();
        for name in names {
            dashboard.register(LogTab::new(*name)).unwrap();
        }
        dashboard
    }

    #[test]
    fn append_reaches_the_tab_buffer() {
        let dashboard = Dashboard::detached();
        let tab = LogTab::new("events");
        dashboard.register(tab.clone()).unwrap();

        apply(
            &dashboard.shared,
            Command::Append {
                tab: tab.clone(),
                level: LogLevel::Info,
                line: "hello".to_string(),
            },
        );

        assert_eq!(tab.draw(10, 80), vec!["hello"]);
    }

    #[test]
    fn switch_ignores_unknown_targets() {
        let dashboard = dashboard_with_tabs(&["a", "b"]);
        dashboard.shared.set_active("a".to_string());

        apply(
            &dashboard.shared,
            Command::Switch {
                target: "missing".to_string(),
            },
        );
        assert_eq!(dashboard.shared.active_tab(), Some("a".to_string()));

        apply(
            &dashboard.shared,
            Command::Switch {
                target: "b".to_string(),
            },
        );
        assert_eq!(dashboard.shared.active_tab(), Some("b".to_string()));
    }

    #[test]
    fn arrows_rotate_through_sorted_names_with_wrap() {
        let dashboard = dashboard_with_tabs(&["A", "B", "C"]);

        dashboard.shared.set_active("B".to_string());
        apply(
            &dashboard.shared,
            Command::Key {
                tab: "B".to_string(),
                key: Key::Right,
            },
        );
        assert_eq!(dashboard.shared.active_tab(), Some("C".to_string()));

        dashboard.shared.set_active("A".to_string());
        apply(
            &dashboard.shared,
            Command::Key {
                tab: "A".to_string(),
                key: Key::Left,
            },
        );
        assert_eq!(dashboard.shared.active_tab(), Some("C".to_string()));
    }

    #[test]
    fn arrow_permission_follows_the_tagged_tab() {
        let dashboard = Dashboard::detached();
        let pinned = LogTab::new("pinned");
        pinned.set_arrow_switch(false);
        dashboard.register(pinned).unwrap();
        dashboard.register(LogTab::new("other")).unwrap();
        dashboard.shared.set_active("other".to_string());

        apply(
            &dashboard.shared,
            Command::Key {
                tab: "pinned".to_string(),
                key: Key::Right,
            },
        );
        assert_eq!(dashboard.shared.active_tab(), Some("other".to_string()));
    }

    #[test]
    fn up_and_down_are_reserved_noops() {
        let dashboard = dashboard_with_tabs(&["a", "b"]);
        dashboard.shared.set_active("a".to_string());

        for key in [Key::Up, Key::Down] {
            apply(
                &dashboard.shared,
                Command::Key {
                    tab: "a".to_string(),
                    key,
                },
            );
        }
        assert_eq!(dashboard.shared.active_tab(), Some("a".to_string()));
    }

    #[test]
    fn interrupt_stops_the_engine() {
        let dashboard = dashboard_with_tabs(&["a"]);
        assert!(dashboard.is_running());

        apply(
            &dashboard.shared,
            Command::Key {
                tab: "a".to_string(),
                key: Key::Interrupt,
            },
        );
        assert!(!dashboard.is_running());
    }

    #[test]
    fn commands_execute_exactly_once_in_per_producer_order() {
        let dashboard = Dashboard::detached();
        let tab = LogTab::new("ordered");
        dashboard.register(tab.clone()).unwrap();

        let mut producers = Vec::new();
        for p in 0..3 {
            let dashboard = dashboard.clone();
            let tab = tab.clone();
            producers.push(std::thread::spawn(move || {
                for i in 0..200 {
                    dashboard.submit(Command::Append {
                        tab: tab.clone(),
                        level: LogLevel::Info,
                        line: format!("p{p}-{i}"),
                    });
                }
            }));
        }
        for producer in producers {
            producer.join().unwrap();
        }

        let rx = dashboard.shared.runtime.lock().unwrap().rx.take().unwrap();
        let mut executed = 0;
        while let Ok(command) = rx.try_recv() {
            apply(&dashboard.shared, command);
            executed += 1;
        }
        assert_eq!(executed, 600);

        let lines = tab.draw(1000, 1000);
        assert_eq!(lines.len(), 600);
        for p in 0..3 {
            let prefix = format!("p{p}-");
            let mine: Vec<&String> =
                lines.iter().filter(|line| line.starts_with(&prefix)).collect();
            assert_eq!(mine.len(), 200);
            for (i, line) in mine.iter().enumerate() {
                assert_eq!(**line, format!("p{p}-{i}"));
            }
        }
    }
}
