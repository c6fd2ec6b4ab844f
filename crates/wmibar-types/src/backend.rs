//! Backend trait definitions.
//!
//! The bar core never calls windowing or drawing APIs directly. It sequences
//! calls against [`BarBackend`], which owns the window, the off-screen buffer
//! the labels are drawn into, and the font machinery.

use crate::color::Color;
use crate::error::Result;
use crate::font::Font;
use crate::geometry::Rect;

/// Text prefix that turns an item into a meter.
pub const METER_MARKER: &str = "%m:";

/// Whether an item text selects the meter primitive.
pub fn is_meter(text: &str) -> bool {
    text.as_bytes().starts_with(METER_MARKER.as_bytes())
}

/// Fill percentage of a meter text (`%m:<0-100>`). Unparseable values read
/// as zero and larger values clamp to 100.
pub fn meter_value(text: &str) -> u8 {
    text.strip_prefix(METER_MARKER)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map_or(0, |v| v.min(100) as u8)
}

/// Render descriptor for one bar segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Position inside the off-screen buffer.
    pub rect: Rect,
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
    pub font: Font,
    pub text: String,
}

/// Window + drawing backend for the bar.
///
/// All draw calls target the off-screen buffer; nothing becomes visible
/// until [`BarBackend::blit`].
pub trait BarBackend {
    /// Size of the screen the bar lives on.
    fn screen_size(&self) -> (u32, u32);

    /// Map the window and raise it above its siblings.
    fn map_raised(&mut self) -> Result<()>;

    /// Unmap the window and flush the request.
    fn unmap(&mut self) -> Result<()>;

    /// Move and resize the window. The off-screen buffer is dropped before
    /// a new one with the new dimensions is created.
    fn move_resize(&mut self, rect: Rect) -> Result<()>;

    /// Width in pixels of `text` rendered with `font`.
    fn measure_text(&self, font: &Font, text: &str) -> u32;

    /// Resolve a color spec. Unparseable specs resolve to black.
    fn load_color(&self, spec: &str) -> Color {
        Color::parse(spec).unwrap_or_else(|| {
            log::debug!("unparseable color spec {spec:?}, using black");
            Color::BLACK
        })
    }

    /// Draw a label with a one pixel border.
    fn draw_label(&mut self, label: &Label) -> Result<()>;

    /// Draw a label without a border.
    fn draw_label_noborder(&mut self, label: &Label) -> Result<()>;

    /// Draw a meter; the fill level comes from [`meter_value`].
    fn draw_meter(&mut self, label: &Label) -> Result<()>;

    /// Copy the off-screen buffer onto the window and flush.
    fn blit(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_marker_detection() {
        assert!(is_meter("%m:50"));
        assert!(is_meter("%m:"));
        assert!(!is_meter("%m"));
        assert!(!is_meter(" %m:50"));
        assert!(!is_meter("cpu 50%"));
    }

    #[test]
    fn meter_values() {
        assert_eq!(meter_value("%m:42"), 42);
        assert_eq!(meter_value("%m:42\n"), 42);
        assert_eq!(meter_value("%m:250"), 100);
        assert_eq!(meter_value("%m:half"), 0);
        assert_eq!(meter_value("42"), 0);
    }
}
