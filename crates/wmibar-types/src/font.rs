//! Font specs as stored in the `/font` file.

/// Default pixel size when a spec carries none.
pub const DEFAULT_FONT_SIZE: u16 = 8;

/// A parsed `name[:size]` font spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub name: String,
    pub size: u16,
}

impl Font {
    /// Parse a font spec. An empty or unparseable size falls back to
    /// [`DEFAULT_FONT_SIZE`].
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let (name, size) = match spec.rsplit_once(':') {
            Some((name, size)) => (name, size.trim().parse::<u16>().ok()),
            None => (spec, None),
        };
        let name = if name.is_empty() { "fixed" } else { name };
        Self {
            name: name.to_string(),
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_FONT_SIZE),
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "fixed".to_string(),
            size: DEFAULT_FONT_SIZE,
        }
    }
}
