//! Bar geometry: rectangles, hit testing, and the `x,y,width,height` format.

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Point-in-rectangle test. The right and bottom edges are exclusive.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (px, py) = (i64::from(px), i64::from(py));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x && py >= y && px < x + i64::from(self.w) && py < y + i64::from(self.h)
    }

    /// Format as `x,y,width,height`.
    pub fn to_spec(&self) -> String {
        format!("{},{},{},{}", self.x, self.y, self.w, self.h)
    }
}

/// Parse an `x,y,width,height` geometry string.
///
/// Missing or unparseable fields read as zero; negative sizes clamp to zero.
/// A zero width is replaced by `screen_w` and a zero height by `default_h`.
pub fn parse_geometry(spec: &str, screen_w: u32, default_h: u32) -> Rect {
    let mut fields = spec.trim().split(',').map(|f| f.trim().parse::<i64>().unwrap_or(0));
    let mut next = || fields.next().unwrap_or(0);
    let x = clamp_i32(next());
    let y = clamp_i32(next());
    let w = clamp_u32(next());
    let h = clamp_u32(next());
    Rect {
        x,
        y,
        w: if w == 0 { screen_w } else { w },
        h: if h == 0 { default_h } else { h },
    }
}

/// Whether a geometry write should trigger a resize.
pub fn is_geometry_spec(spec: &str) -> bool {
    spec.contains(',')
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn clamp_u32(v: i64) -> u32 {
    v.clamp(0, i64::from(u32::MAX)) as u32
}
