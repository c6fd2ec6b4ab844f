//! Backend-agnostic native window events.
//!
//! Every backend maps its windowing events to this enum. The core never
//! sees raw platform events.

/// A native window event delivered to the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// Part of the window needs repainting. `count` is the number of expose
    /// events still queued behind this one; only `count == 0` redraws.
    Expose { count: u32 },
    /// A pointer button went down at window-relative coordinates.
    /// Buttons are numbered 1 (left) through 5 (wheel down).
    ButtonPress { button: u8, x: i32, y: i32 },
    /// The window system asked the bar to quit.
    Quit,
    /// Anything the bar does not react to.
    Other,
}

/// Highest pointer button number with a `b<n>press` file.
pub const MAX_BUTTON: u8 = 5;
