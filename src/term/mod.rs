//! Abstractions for terminal access to enable testing and mocking.
//!
//! The `Surface` and `KeySource` traits isolate the crossterm dependency:
//! the engine draws frames and reads keys through them, so tests can run
//! against an in-memory terminal instead of a real one.

pub mod console;

use std::io;
use std::time::Duration;

/// The 16-color terminal palette plus the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// The terminal's default color.
    Reset,
    Black,
    DarkGrey,
    Red,
    DarkRed,
    Green,
    DarkGreen,
    Yellow,
    DarkYellow,
    Blue,
    DarkBlue,
    Magenta,
    DarkMagenta,
    Cyan,
    DarkCyan,
    White,
    Grey,
}

/// Key presses the engine reacts to.
///
/// Everything else a key source reads is dropped before it reaches the
/// command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Ctrl-C. In raw mode it arrives as a key press, not a signal.
    Interrupt,
}

/// Abstraction for the terminal the render thread draws to.
///
/// Writes may be buffered; nothing has to reach the screen before `flush`.
pub trait Surface: Send {
    /// Prepares the terminal for drawing: raw mode, alternate screen,
    /// hidden cursor.
    fn init(&mut self) -> io::Result<()>;

    /// Restores the terminal to the state before `init`.
    fn restore(&mut self) -> io::Result<()>;

    /// Current size as `(width, height)` in cells.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Asks the terminal to resize itself. The engine only ever grows a
    /// window, never shrinks it.
    fn set_size(&mut self, width: u16, height: u16) -> io::Result<()>;

    /// Clears the whole screen.
    fn clear(&mut self) -> io::Result<()>;

    /// Moves the cursor to `(col, row)`, zero-based from the top left.
    fn move_to(&mut self, col: u16, row: u16) -> io::Result<()>;

    /// Writes text at the cursor in the terminal's default colors.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Writes text at the cursor with the given background and foreground.
    fn write_colored(&mut self, text: &str, bg: Color, fg: Color) -> io::Result<()>;

    /// Pushes buffered writes out to the terminal.
    fn flush(&mut self) -> io::Result<()>;
}

/// Abstraction for raw keyboard input.
pub trait KeySource: Send {
    /// Waits up to `timeout` for a key press.
    ///
    /// Returns `Ok(None)` when the timeout elapses or when the event read
    /// is not a key the engine cares about.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory terminal doubles shared by the engine tests.

    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{Color, Key, KeySource, Surface};

    /// One recorded surface call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        Init,
        Restore,
        SetSize(u16, u16),
        Clear,
        MoveTo(u16, u16),
        Write(String),
        Colored(String, Color, Color),
        Flush,
    }

    /// Surface that records every call so tests can assert on the frame
    /// layout. Clones share the same recording.
    #[derive(Clone)]
    pub(crate) struct TestSurface {
        size: Arc<Mutex<(u16, u16)>>,
        ops: Arc<Mutex<Vec<Op>>>,
    }

    impl TestSurface {
        pub(crate) fn new(width: u16, height: u16) -> Self {
            Self {
                size: Arc::new(Mutex::new((width, height))),
                ops: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }

        fn push(&self, op: Op) {
            self.ops.lock().unwrap().push(op);
        }
    }

    impl Surface for TestSurface {
        fn init(&mut self) -> io::Result<()> {
            self.push(Op::Init);
            Ok(())
        }

        fn restore(&mut self) -> io::Result<()> {
            self.push(Op::Restore);
            Ok(())
        }

        fn size(&self) -> io::Result<(u16, u16)> {
            Ok(*self.size.lock().unwrap())
        }

        fn set_size(&mut self, width: u16, height: u16) -> io::Result<()> {
            *self.size.lock().unwrap() = (width, height);
            self.push(Op::SetSize(width, height));
            Ok(())
        }

        fn clear(&mut self) -> io::Result<()> {
            self.push(Op::Clear);
            Ok(())
        }

        fn move_to(&mut self, col: u16, row: u16) -> io::Result<()> {
            self.push(Op::MoveTo(col, row));
            Ok(())
        }

        fn write(&mut self, text: &str) -> io::Result<()> {
            self.push(Op::Write(text.to_string()));
            Ok(())
        }

        fn write_colored(&mut self, text: &str, bg: Color, fg: Color) -> io::Result<()> {
            self.push(Op::Colored(text.to_string(), bg, fg));
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.push(Op::Flush);
            Ok(())
        }
    }

    /// Key source that replays a fixed script, then reports timeouts.
    pub(crate) struct ScriptedKeys {
        keys: Mutex<VecDeque<Key>>,
    }

    impl ScriptedKeys {
        pub(crate) fn new(keys: impl IntoIterator<Item = Key>) -> Self {
            Self {
                keys: Mutex::new(keys.into_iter().collect()),
            }
        }
    }

    impl KeySource for ScriptedKeys {
        fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
            let next = self.keys.lock().unwrap().pop_front();
            if next.is_none() {
                // Behave like an idle keyboard instead of spinning.
                std::thread::sleep(timeout);
            }
            Ok(next)
        }
    }
}
