//! SDL2 backend for wmibar.
//!
//! Implements [`BarBackend`] with a borderless SDL2 window and an
//! off-screen target texture the labels are drawn into. Text uses an 8x8
//! bitmap font scaled by whole multiples.
//!
//! The backend also owns the main thread's only blocking wait: socket
//! requests are pushed into the SDL event queue as custom events, so a
//! single [`SdlBar::wait_event`] call multiplexes them with native window
//! events.

mod font;

use std::sync::Mutex;

use sdl2::event::{Event, EventSender, WindowEvent};
use sdl2::mouse::{MouseButton, MouseWheelDirection};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext, WindowPos};
use sdl2::{EventPump, EventSubsystem, Sdl, VideoSubsystem};

use wmibar_net::{Exchange, RequestSink};
use wmibar_types::backend::{BarBackend, Label, meter_value};
use wmibar_types::color::Color;
use wmibar_types::error::{BarError, Result};
use wmibar_types::font::Font;
use wmibar_types::geometry::Rect;
use wmibar_types::input::NativeEvent;

/// One wake-up of the event loop.
#[derive(Debug)]
pub enum LoopEvent {
    /// A namespace request from a socket connection.
    Request(Exchange),
    /// A window system event.
    Native(NativeEvent),
}

/// SDL2 window and drawing backend.
///
/// # Safety
///
/// `buffer` is declared before `texture_creator` so that Rust's drop order
/// (declaration order) destroys the off-screen texture before the creator
/// it borrows from. The `Texture<'static>` lifetime is erased via transmute
/// in `move_resize()`; this is sound because the `TextureCreator` always
/// outlives the texture.
pub struct SdlBar {
    buffer: Option<Texture<'static>>,
    texture_creator: TextureCreator<WindowContext>,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    events: EventSubsystem,
    _video: VideoSubsystem,
    _sdl: Sdl,
    screen: (u32, u32),
}

impl SdlBar {
    /// Open the display and create a hidden, borderless bar window.
    ///
    /// The window gets its real geometry from the first
    /// [`BarBackend::move_resize`].
    pub fn new(title: &str) -> Result<Self> {
        // Keep the window manager's hands off the bar on X11.
        sdl2::hint::set("SDL_X11_FORCE_OVERRIDE_REDIRECT", "1");

        let sdl = sdl2::init().map_err(BarError::Backend)?;
        let video = sdl.video().map_err(BarError::Backend)?;
        let events = sdl.event().map_err(BarError::Backend)?;
        events
            .register_custom_event::<Exchange>()
            .map_err(BarError::Backend)?;

        let mode = video.current_display_mode(0).map_err(BarError::Backend)?;
        let screen = (mode.w.max(1) as u32, mode.h.max(1) as u32);

        let window = video
            .window(title, 1, 1)
            .borderless()
            .hidden()
            .build()
            .map_err(|e| BarError::Backend(e.to_string()))?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .target_texture()
            .build()
            .map_err(|e| BarError::Backend(e.to_string()))?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump().map_err(BarError::Backend)?;

        log::info!("SDL2 backend initialized, screen {}x{}", screen.0, screen.1);

        Ok(Self {
            buffer: None,
            texture_creator,
            canvas,
            event_pump,
            events,
            _video: video,
            _sdl: sdl,
            screen,
        })
    }

    /// A sink that feeds socket requests into this backend's event queue.
    pub fn request_sink(&self) -> SdlRequestSink {
        SdlRequestSink {
            sender: Mutex::new(self.events.event_sender()),
        }
    }

    /// Block until the next request or window event.
    pub fn wait_event(&mut self) -> LoopEvent {
        let event = self.event_pump.wait_event();
        self.loop_event(event)
    }

    /// Next already-queued event, if any.
    pub fn poll_event(&mut self) -> Option<LoopEvent> {
        let event = self.event_pump.poll_event()?;
        Some(self.loop_event(event))
    }

    fn loop_event(&self, event: Event) -> LoopEvent {
        if event.is_user_event() {
            if let Some(exchange) = event.as_user_event_type::<Exchange>() {
                return LoopEvent::Request(exchange);
            }
            return LoopEvent::Native(NativeEvent::Other);
        }
        let mouse = self.event_pump.mouse_state();
        LoopEvent::Native(native_event(&event, (mouse.x(), mouse.y())))
    }

    /// Run `paint` against the off-screen buffer.
    fn paint(
        &mut self,
        paint: impl FnOnce(&mut Canvas<Window>) -> std::result::Result<(), String>,
    ) -> Result<()> {
        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| BarError::Backend("no off-screen buffer".to_string()))?;
        let mut result = Ok(());
        self.canvas
            .with_texture_canvas(buffer, |c| result = paint(c))
            .map_err(|e| BarError::Backend(e.to_string()))?;
        result.map_err(BarError::Backend)
    }
}

impl BarBackend for SdlBar {
    fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    fn map_raised(&mut self) -> Result<()> {
        let window = self.canvas.window_mut();
        window.show();
        window.raise();
        Ok(())
    }

    fn unmap(&mut self) -> Result<()> {
        self.canvas.window_mut().hide();
        Ok(())
    }

    fn move_resize(&mut self, rect: Rect) -> Result<()> {
        let (w, h) = (rect.w.max(1), rect.h.max(1));
        let window = self.canvas.window_mut();
        window.set_position(WindowPos::Positioned(rect.x), WindowPos::Positioned(rect.y));
        window
            .set_size(w, h)
            .map_err(|e| BarError::Backend(e.to_string()))?;

        // The old buffer goes before the new one is created.
        self.buffer = None;
        let texture = self
            .texture_creator
            .create_texture_target(PixelFormatEnum::RGBA8888, w, h)
            .map_err(|e| BarError::Backend(e.to_string()))?;

        // SAFETY: The texture borrows from self.texture_creator which lives in the
        // same struct. `buffer` is declared before `texture_creator`, so Rust drops
        // the texture first. The erased lifetime is therefore always valid.
        let texture: Texture<'static> = unsafe { std::mem::transmute(texture) };
        self.buffer = Some(texture);
        log::debug!("bar moved to {}", rect.to_spec());
        Ok(())
    }

    fn measure_text(&self, face: &Font, text: &str) -> u32 {
        font::text_width(text, face.size)
    }

    fn draw_label(&mut self, label: &Label) -> Result<()> {
        self.paint(|c| paint_label(c, label, true))
    }

    fn draw_label_noborder(&mut self, label: &Label) -> Result<()> {
        self.paint(|c| paint_label(c, label, false))
    }

    fn draw_meter(&mut self, label: &Label) -> Result<()> {
        self.paint(|c| paint_meter(c, label))
    }

    fn blit(&mut self) -> Result<()> {
        let buffer = self
            .buffer
            .as_ref()
            .ok_or_else(|| BarError::Backend("no off-screen buffer".to_string()))?;
        self.canvas.copy(buffer, None, None).map_err(BarError::Backend)?;
        self.canvas.present();
        Ok(())
    }
}

/// Feeds [`Exchange`]s into the SDL event queue from any thread.
pub struct SdlRequestSink {
    sender: Mutex<EventSender>,
}

impl RequestSink for SdlRequestSink {
    fn submit(&self, exchange: Exchange) -> Result<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| BarError::Backend("event sender lock poisoned".to_string()))?;
        sender.push_custom_event(exchange).map_err(BarError::Protocol)
    }
}

/// Map an SDL2 event to a bar event. `pointer` is the current pointer
/// position, used for wheel events which carry none.
fn native_event(event: &Event, pointer: (i32, i32)) -> NativeEvent {
    match *event {
        Event::Quit { .. } => NativeEvent::Quit,
        Event::Window {
            win_event: WindowEvent::Exposed,
            ..
        }
        | Event::RenderTargetsReset { .. } => NativeEvent::Expose { count: 0 },
        Event::MouseButtonDown { mouse_btn, x, y, .. } => match mouse_button(mouse_btn) {
            Some(button) => NativeEvent::ButtonPress { button, x, y },
            None => NativeEvent::Other,
        },
        Event::MouseWheel { y, direction, .. } => {
            let y = if direction == MouseWheelDirection::Flipped { -y } else { y };
            let button = match y.signum() {
                1 => 4,
                -1 => 5,
                _ => return NativeEvent::Other,
            };
            NativeEvent::ButtonPress {
                button,
                x: pointer.0,
                y: pointer.1,
            }
        },
        _ => NativeEvent::Other,
    }
}

fn mouse_button(button: MouseButton) -> Option<u8> {
    match button {
        MouseButton::Left => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::Right => Some(3),
        _ => None,
    }
}

fn sdl_rect(rect: Rect) -> sdl2::rect::Rect {
    sdl2::rect::Rect::new(rect.x, rect.y, rect.w, rect.h)
}

/// Set the SDL draw color, blending only translucent colors.
fn set_color(canvas: &mut Canvas<Window>, color: Color) {
    if color.a < 255 {
        canvas.set_blend_mode(BlendMode::Blend);
    } else {
        canvas.set_blend_mode(BlendMode::None);
    }
    canvas.set_draw_color(sdl2::pixels::Color::RGBA(color.r, color.g, color.b, color.a));
}

fn paint_label(canvas: &mut Canvas<Window>, label: &Label, border: bool) -> std::result::Result<(), String> {
    if label.rect.w == 0 || label.rect.h == 0 {
        return Ok(());
    }
    set_color(canvas, label.bg);
    canvas.fill_rect(sdl_rect(label.rect))?;
    if border {
        set_color(canvas, label.border);
        canvas.draw_rect(sdl_rect(label.rect))?;
    }
    let (text, x, y) = fit_text(&label.text, label.rect, label.font.size);
    paint_text(canvas, text, x, y, font::scale(label.font.size), label.fg)
}

fn paint_meter(canvas: &mut Canvas<Window>, label: &Label) -> std::result::Result<(), String> {
    if label.rect.w == 0 || label.rect.h == 0 {
        return Ok(());
    }
    set_color(canvas, label.bg);
    canvas.fill_rect(sdl_rect(label.rect))?;
    set_color(canvas, label.border);
    canvas.draw_rect(sdl_rect(label.rect))?;
    if let Some(fill) = meter_fill(label.rect, meter_value(&label.text)) {
        set_color(canvas, label.fg);
        canvas.fill_rect(sdl_rect(fill))?;
    }
    Ok(())
}

fn paint_text(
    canvas: &mut Canvas<Window>,
    text: &str,
    x: i32,
    y: i32,
    scale: u32,
    color: Color,
) -> std::result::Result<(), String> {
    set_color(canvas, color);
    let step = (font::GLYPH_WIDTH * scale) as i32;
    let s = scale as i32;
    let mut cx = x;
    for ch in text.chars() {
        let rows = font::glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..font::GLYPH_WIDTH as i32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = cx + col * s;
                let py = y + row as i32 * s;
                if scale == 1 {
                    canvas.draw_point(sdl2::rect::Point::new(px, py))?;
                } else {
                    canvas.fill_rect(sdl2::rect::Rect::new(px, py, scale, scale))?;
                }
            }
        }
        cx += step;
    }
    Ok(())
}

/// The part of `text` that fits inside `rect` (one pixel border on each
/// side) and its centered origin.
fn fit_text(text: &str, rect: Rect, size: u16) -> (&str, i32, i32) {
    let scale = font::scale(size);
    let glyph_w = font::GLYPH_WIDTH * scale;
    let max_chars = (rect.w.saturating_sub(2) / glyph_w) as usize;
    let fitted = match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    };
    let width = fitted.chars().count() as u32 * glyph_w;
    let x = rect.x + (rect.w.saturating_sub(width) / 2) as i32;
    let y = rect.y + (rect.h.saturating_sub(font::GLYPH_HEIGHT * scale) / 2) as i32;
    (fitted, x, y)
}

/// Bottom-up fill of a meter: `value` percent of the inner height.
fn meter_fill(rect: Rect, value: u8) -> Option<Rect> {
    let inner_w = rect.w.saturating_sub(2);
    let inner_h = rect.h.saturating_sub(2);
    let fill_h = inner_h * u32::from(value.min(100)) / 100;
    if inner_w == 0 || fill_h == 0 {
        return None;
    }
    Some(Rect::new(
        rect.x + 1,
        rect.y + 1 + (inner_h - fill_h) as i32,
        inner_w,
        fill_h,
    ))
}
