//! crossterm-backed terminal implementations.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetSize,
    disable_raw_mode, enable_raw_mode,
};
use crossterm::{execute, queue};

use super::{Color, Key, KeySource, Surface};

/// Terminal surface writing to stdout.
///
/// All drawing calls are queued and reach the terminal on `flush`, so one
/// frame arrives as a single write.
pub struct Console {
    out: Stdout,
}

impl Console {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn style_color(color: Color) -> crossterm::style::Color {
    use crossterm::style::Color as C;
    match color {
        Color::Reset => C::Reset,
        Color::Black => C::Black,
        Color::DarkGrey => C::DarkGrey,
        Color::Red => C::Red,
        Color::DarkRed => C::DarkRed,
        Color::Green => C::Green,
        Color::DarkGreen => C::DarkGreen,
        Color::Yellow => C::Yellow,
        Color::DarkYellow => C::DarkYellow,
        Color::Blue => C::Blue,
        Color::DarkBlue => C::DarkBlue,
        Color::Magenta => C::Magenta,
        Color::DarkMagenta => C::DarkMagenta,
        Color::Cyan => C::Cyan,
        Color::DarkCyan => C::DarkCyan,
        Color::White => C::White,
        Color::Grey => C::Grey,
    }
}

impl Surface for Console {
    fn init(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide)
    }

    fn restore(&mut self) -> io::Result<()> {
        let restored = execute!(self.out, Show, LeaveAlternateScreen);
        disable_raw_mode()?;
        restored
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn set_size(&mut self, width: u16, height: u16) -> io::Result<()> {
        queue!(self.out, SetSize(width, height))
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))
    }

    fn move_to(&mut self, col: u16, row: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(col, row))
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))
    }

    fn write_colored(&mut self, text: &str, bg: Color, fg: Color) -> io::Result<()> {
        queue!(
            self.out,
            SetBackgroundColor(style_color(bg)),
            SetForegroundColor(style_color(fg)),
            Print(text),
            ResetColor
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Key source reading crossterm terminal events.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleKeys;

impl ConsoleKeys {
    pub fn new() -> Self {
        Self
    }
}

/// Maps a crossterm key event onto the keys the engine understands.
fn map_key(key: KeyEvent) -> Option<Key> {
    // Windows terminals report press and release as separate events; only
    // the press counts as a keystroke.
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Interrupt)
        }
        _ => None,
    }
}

impl KeySource for ConsoleKeys {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(map_key(key)),
            _ => Ok(None),
        }
    }
}
