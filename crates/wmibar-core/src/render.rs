//! Render pipeline: positioned items to backend draw calls.

use wmibar_types::backend::{BarBackend, Label, is_meter};
use wmibar_types::error::Result;
use wmibar_types::geometry::Rect;

use crate::item::{Item, Style};
use crate::layout::{self, Mode};

/// Assign rectangles to `items` for a bar of `bar_w` x `bar_h` pixels.
///
/// `expandable` is the 0-based position resolved from `/expandable`.
pub fn place(
    items: &mut [Item],
    bar_w: u32,
    bar_h: u32,
    expandable: Option<usize>,
    backend: &impl BarBackend,
) -> Mode {
    let precalc: Vec<u32> = match expandable {
        Some(_) => items
            .iter()
            .map(|i| layout::precalc_width(&i.label.text, bar_h, |t| backend.measure_text(&i.label.font, t)))
            .collect(),
        None => vec![0; items.len()],
    };
    let (widths, mode) = layout::compute_widths(bar_w, &precalc, expandable);
    for ((item, w), x) in items.iter_mut().zip(&widths).zip(layout::offsets(&widths)) {
        item.label.rect = Rect::new(x, 0, *w, bar_h);
    }
    mode
}

/// Draw every item into the off-screen buffer, then blit.
pub fn draw_items(backend: &mut impl BarBackend, items: &[Item]) -> Result<()> {
    for item in items {
        if is_meter(&item.label.text) {
            backend.draw_meter(&item.label)?;
        } else {
            backend.draw_label(&item.label)?;
        }
    }
    backend.blit()
}

/// Draw the full-width borderless placeholder shown when there are no
/// items, then blit.
pub fn draw_empty(backend: &mut impl BarBackend, bar_w: u32, bar_h: u32, style: &Style) -> Result<()> {
    let label = Label {
        rect: Rect::new(0, 0, bar_w, bar_h),
        fg: style.fg,
        bg: style.bg,
        border: style.border,
        font: style.font.clone(),
        text: String::new(),
    };
    backend.draw_label_noborder(&label)?;
    backend.blit()
}
