//! Render thread: drains the command queue, then draws one frame.
//!
//! Frame layout on a `width x height` surface:
//!
//! ```text
//! ═══ActiveName═══════════   row 0, title bar
//! <content>                  rows 1 ..= height - 5
//! ╔══════════════════════╗   row height - 3
//! ║ TabA  TabB  TabC     ║   row height - 2, active highlighted
//! ╚══════════════════════╝   row height - 1
//! ```

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use std::{io, thread};

use tracing::{debug, warn};

use crate::term::{Color, Surface};

use super::command::{self, Command};
use super::Shared;

/// One colored run of text within a frame line.
struct Segment {
    text: String,
    bg: Color,
    fg: Color,
}

impl Segment {
    fn new(text: impl Into<String>, bg: Color, fg: Color) -> Self {
        Self {
            text: text.into(),
            bg,
            fg,
        }
    }
}

/// Title bar: a short rule, the active tab's name, and a rule out to the
/// right edge.
fn header_segments(active: &str, width: usize) -> Vec<Segment> {
    let used = active.chars().count() + 3;
    vec![
        Segment::new("═══", Color::DarkBlue, Color::White),
        Segment::new(active, Color::Yellow, Color::Black),
        Segment::new(
            "═".repeat(width.saturating_sub(used)),
            Color::DarkBlue,
            Color::White,
        ),
    ]
}

/// Bottom bar: a three row box listing every tab, the active one
/// highlighted. Returns the segments for each of the three lines.
fn footer_segments(names: &[String], active: &str, width: usize) -> Vec<Vec<Segment>> {
    let horizontal = "═".repeat(width.saturating_sub(2));
    let top = vec![Segment::new(
        format!("\u{2554}{horizontal}\u{2557}"),
        Color::DarkBlue,
        Color::White,
    )];
    let bottom = vec![Segment::new(
        format!("\u{255a}{horizontal}\u{255d}"),
        Color::DarkBlue,
        Color::White,
    )];

    let mut middle = vec![Segment::new("\u{2551}", Color::DarkBlue, Color::White)];
    let mut used = 1;
    for name in names {
        let (bg, fg) = if name == active {
            (Color::Yellow, Color::Black)
        } else {
            (Color::DarkBlue, Color::White)
        };
        middle.push(Segment::new(format!(" {name} "), bg, fg));
        used += name.chars().count() + 2;
    }
    let filler = " ".repeat(width.saturating_sub(used + 1));
    middle.push(Segment::new(
        format!("{filler}\u{2551}"),
        Color::DarkBlue,
        Color::White,
    ));

    vec![top, middle, bottom]
}

/// Narrowest surface on which the bottom bar still fits every tab name.
fn footer_min_width(names: &[String]) -> usize {
    4 + names
        .iter()
        .map(|name| name.chars().count() + 2)
        .sum::<usize>()
}

/// Splits a logical line into physical rows, each padded to exactly
/// `width` characters so stale cells from the previous frame are
/// overwritten.
fn wrap_rows(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![" ".repeat(width)];
    }
    chars
        .chunks(width)
        .map(|chunk| {
            let mut row: String = chunk.iter().collect();
            row.push_str(&" ".repeat(width - chunk.len()));
            row
        })
        .collect()
}

/// Number of physical rows `wrap_rows` produces, without building them.
pub(crate) fn wrapped_row_count(line: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    line.chars().count().div_ceil(width).max(1)
}

/// What the previous frame looked like. A change in size or active tab
/// means leftover cells may survive outside the rows we repaint, so the
/// screen is cleared first.
#[derive(Default)]
struct Frame {
    width: u16,
    height: u16,
    active: Option<String>,
}

/// A panicking render thread must still release the input and writer
/// threads, which only exit once the stop flag is set.
struct StopOnExit(Arc<Shared>);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        self.0.request_stop();
    }
}

pub(crate) fn run(shared: Arc<Shared>, rx: Receiver<Command>, mut surface: Box<dyn Surface>) {
    if let Err(err) = surface.init() {
        warn!("render thread could not prepare the terminal: {}", err);
        shared.request_stop();
        return;
    }
    let _stop_on_exit = StopOnExit(Arc::clone(&shared));
    debug!("render thread started");

    wait_for_first_tab(&shared);

    let mut frame = Frame::default();
    while !shared.stopped() {
        while let Ok(command) = rx.try_recv() {
            command::apply(&shared, command);
        }
        // A drained command may have been an interrupt.
        if shared.stopped() {
            break;
        }
        if let Err(err) = draw_frame(&shared, &mut frame, surface.as_mut()) {
            warn!("render thread lost the terminal: {}", err);
            shared.request_stop();
            break;
        }
        thread::sleep(shared.config.frame_interval);
    }

    // Producers may have queued commands between the last drain and the
    // stop; execute them so their log entries still reach the writer.
    while let Ok(command) = rx.try_recv() {
        command::apply(&shared, command);
    }

    if let Err(err) = surface.restore() {
        warn!("could not restore the terminal: {}", err);
    }
    debug!("render thread stopped");
}

/// Parks the render thread until the first tab is registered, then makes
/// that tab active. Released early when the engine stops before any
/// registration.
fn wait_for_first_tab(shared: &Shared) {
    let mut tabs = shared.tabs.lock().unwrap();
    while tabs.is_empty() && !shared.stopped() {
        let (guard, _) = shared
            .tabs_ready
            .wait_timeout(tabs, Duration::from_millis(200))
            .unwrap();
        tabs = guard;
    }
    let first = tabs.keys().next().cloned();
    drop(tabs);

    if let Some(first) = first {
        let mut active = shared.active.lock().unwrap();
        if active.is_none() {
            *active = Some(first);
        }
    }
}

fn draw_frame(shared: &Shared, frame: &mut Frame, surface: &mut dyn Surface) -> io::Result<()> {
    let Some(active_name) = shared.active_tab() else {
        return Ok(());
    };
    let Some(active) = shared.tab(&active_name) else {
        return Ok(());
    };
    let names: Vec<String> = shared.tabs.lock().unwrap().keys().cloned().collect();

    let (mut width, mut height) = surface.size()?;
    let min_width = footer_min_width(&names) as u16;
    if width < min_width || height < shared.config.min_height {
        width = width.max(min_width);
        height = height.max(shared.config.min_height);
        surface.set_size(width, height)?;
    }

    if width != frame.width
        || height != frame.height
        || frame.active.as_deref() != Some(active_name.as_str())
    {
        frame.width = width;
        frame.height = height;
        frame.active = Some(active_name.clone());
        surface.clear()?;
    }

    let columns = width as usize;
    let content_rows = height.saturating_sub(4) as usize;

    surface.move_to(0, 0)?;
    for segment in header_segments(&active_name, columns) {
        surface.write_colored(&segment.text, segment.bg, segment.fg)?;
    }

    let lines = active.draw(content_rows, columns);
    if lines.len() > content_rows {
        panic!(
            "tab '{}' drew {} lines, allowed {}",
            active_name,
            lines.len(),
            content_rows
        );
    }
    let rows: Vec<String> = lines
        .iter()
        .flat_map(|line| wrap_rows(line, columns))
        .take(content_rows)
        .collect();
    for (i, row) in rows.iter().enumerate() {
        surface.move_to(0, (i + 1) as u16)?;
        surface.write(row)?;
    }

    let footer_top = height.saturating_sub(3);
    for (i, segments) in footer_segments(&names, &active_name, columns)
        .into_iter()
        .enumerate()
    {
        surface.move_to(0, footer_top + i as u16)?;
        for segment in segments {
            surface.write_colored(&segment.text, segment.bg, segment.fg)?;
        }
    }

    surface.move_to(0, 0)?;
    surface.flush()
}
