//! Shared test utilities for wmibar-core tests.
//!
//! Provides a [`MockBackend`] that records all draw and window calls for
//! assertion, and a [`MockSpawner`] that records launched commands.

use wmibar_types::backend::{BarBackend, Label, meter_value};
use wmibar_types::color::Color;
use wmibar_types::error::{BarError, Result};
use wmibar_types::font::{DEFAULT_FONT_SIZE, Font};
use wmibar_types::geometry::Rect;

use crate::spawn::Spawner;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Label {
        rect: Rect,
        text: String,
        fg: Color,
        bg: Color,
        border: Color,
    },
    LabelNoBorder {
        rect: Rect,
        text: String,
        bg: Color,
    },
    Meter {
        rect: Rect,
        value: u8,
    },
    Blit,
    Map,
    Unmap,
    MoveResize(Rect),
}

/// A mock backend that records every call for test assertions.
pub struct MockBackend {
    pub calls: Vec<DrawCall>,
    pub screen: (u32, u32),
    /// Make every draw primitive fail.
    pub fail_draws: bool,
}

impl MockBackend {
    pub fn new(screen_w: u32, screen_h: u32) -> Self {
        Self {
            calls: Vec::new(),
            screen: (screen_w, screen_h),
            fail_draws: false,
        }
    }

    /// Number of completed frames.
    pub fn blit_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Blit)).count()
    }

    /// Bordered label calls as `(text, rect)`.
    pub fn labels(&self) -> Vec<(&str, Rect)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Label { text, rect, .. } => Some((text.as_str(), *rect)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn draw(&mut self, call: DrawCall) -> Result<()> {
        if self.fail_draws {
            return Err(BarError::Backend("mock draw failure".to_string()));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl BarBackend for MockBackend {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn map_raised(&mut self) -> Result<()> {
        self.calls.push(DrawCall::Map);
        Ok(())
    }

    fn unmap(&mut self) -> Result<()> {
        self.calls.push(DrawCall::Unmap);
        Ok(())
    }

    fn move_resize(&mut self, rect: Rect) -> Result<()> {
        self.calls.push(DrawCall::MoveResize(rect));
        Ok(())
    }

    fn measure_text(&self, font: &Font, text: &str) -> u32 {
        let scale = u32::from((font.size / DEFAULT_FONT_SIZE).max(1));
        text.chars().count() as u32 * 8 * scale
    }

    fn draw_label(&mut self, label: &Label) -> Result<()> {
        self.draw(DrawCall::Label {
            rect: label.rect,
            text: label.text.clone(),
            fg: label.fg,
            bg: label.bg,
            border: label.border,
        })
    }

    fn draw_label_noborder(&mut self, label: &Label) -> Result<()> {
        self.draw(DrawCall::LabelNoBorder {
            rect: label.rect,
            text: label.text.clone(),
            bg: label.bg,
        })
    }

    fn draw_meter(&mut self, label: &Label) -> Result<()> {
        self.draw(DrawCall::Meter {
            rect: label.rect,
            value: meter_value(&label.text),
        })
    }

    fn blit(&mut self) -> Result<()> {
        self.draw(DrawCall::Blit)
    }
}

/// Records commands instead of running them.
#[derive(Default)]
pub struct MockSpawner {
    pub commands: Vec<String>,
}

impl Spawner for MockSpawner {
    fn spawn(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }
}
