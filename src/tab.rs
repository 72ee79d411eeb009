//! The capability trait every dashboard panel implements.

/// A panel that can be registered with a `Dashboard` and drawn into the
/// shared terminal.
///
/// Tabs are identified by name. Names are unique within a dashboard and a
/// registration lasts for the lifetime of the process.
pub trait Tab: Send + Sync {
    /// The unique name shown in the header and the footer tab list.
    fn name(&self) -> &str;

    /// Whether the left/right arrow keys may switch away from this tab.
    ///
    /// Should never be permanently `false`.
    fn arrow_switch(&self) -> bool {
        true
    }

    /// Returns the lines to draw on the current frame.
    ///
    /// Called on the render thread once per frame while this tab is active.
    /// Implementations must not block and must not have engine-visible side
    /// effects. The returned lines may be any width; the engine wraps them
    /// to `width` columns and clips rows past the content area. Returning
    /// more than `allowed_lines` lines is a contract violation and panics
    /// the render thread.
    fn draw(&self, allowed_lines: usize, width: usize) -> Vec<String>;
}
