//! Item registry: snapshots of the item subtrees under the namespace root.
//!
//! The registry is rebuilt from scratch on every redraw. Items only hold a
//! handle to their backing directory plus the render descriptor read from
//! its files.

use wmibar_types::backend::{BarBackend, Label};
use wmibar_types::color::Color;
use wmibar_types::font::Font;
use wmibar_types::geometry::Rect;
use wmibar_vfs::{Namespace, NodeId};

/// Files every allocated item carries, besides the `b<n>press` commands.
pub const ITEM_DATA: &str = "data";
pub const ITEM_COLOR_FILES: [&str; 3] = ["fgcolor", "bgcolor", "bordercolor"];

/// Whether `name` is a decimal item name.
pub fn is_item_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Global drawing defaults resolved from `/font` and the global color files.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font: Font,
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
}

/// One positioned bar segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Backing directory in the namespace.
    pub root: NodeId,
    pub name: String,
    pub label: Label,
}

impl Item {
    /// Read the render descriptor of item `name`.
    ///
    /// Missing color files fall back to the global style; a missing `data`
    /// file reads as empty text. The rectangle is left for the layout pass.
    pub fn load<H: Copy>(
        ns: &Namespace<H>,
        backend: &impl BarBackend,
        root: NodeId,
        name: &str,
        style: &Style,
    ) -> Self {
        let file = |file: &str| {
            ns.children(root)
                .find(|&c| ns.name(c) == Some(file))
                .map(|c| ns.text(c))
        };
        let color = |name: &str, fallback: Color| match file(name) {
            Some(spec) => backend.load_color(spec.trim()),
            None => fallback,
        };
        let text = file(ITEM_DATA).unwrap_or_default();
        Self {
            root,
            name: name.to_string(),
            label: Label {
                rect: Rect::default(),
                fg: color("fgcolor", style.fg),
                bg: color("bgcolor", style.bg),
                border: color("bordercolor", style.border),
                font: style.font.clone(),
                text: text.trim_end_matches(['\n', '\r']).to_string(),
            },
        }
    }
}

/// Names of the current items, sorted byte-lexicographically.
///
/// Discovery starts at the first root child with a decimal name and walks
/// its sibling chain, keeping only decimal names.
pub fn discover<H: Copy>(ns: &Namespace<H>) -> Vec<(String, NodeId)> {
    let root = ns.root();
    let Some(first) = ns
        .children(root)
        .find(|&c| ns.name(c).is_some_and(is_item_name))
    else {
        return Vec::new();
    };
    let mut found: Vec<(String, NodeId)> = ns
        .siblings(first)
        .filter_map(|id| {
            let name = ns.name(id)?;
            is_item_name(name).then(|| (name.to_string(), id))
        })
        .collect();
    found.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    found
}

/// Rebuild the full item sequence in layout order.
pub fn build<H: Copy>(ns: &Namespace<H>, backend: &impl BarBackend, style: &Style) -> Vec<Item> {
    discover(ns)
        .into_iter()
        .map(|(name, root)| Item::load(ns, backend, root, &name, style))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBackend;

    fn style() -> Style {
        Style {
            font: Font::default(),
            fg: Color::WHITE,
            bg: Color::BLACK,
            border: Color::rgb(1, 2, 3),
        }
    }

    fn item(ns: &mut Namespace<()>, name: &str, data: &str) {
        ns.create(&format!("/{name}")).unwrap();
        ns.create_file(&format!("/{name}/data"), data.as_bytes()).unwrap();
    }

    #[test]
    fn item_names() {
        assert!(is_item_name("1"));
        assert!(is_item_name("042"));
        assert!(!is_item_name(""));
        assert!(!is_item_name("ctl"));
        assert!(!is_item_name("1a"));
        assert!(!is_item_name("-1"));
    }

    #[test]
    fn discover_sorts_bytewise() {
        let mut ns = Namespace::new();
        ns.create("/ctl").unwrap();
        for name in ["2", "10", "1"] {
            item(&mut ns, name, "");
        }
        let names: Vec<String> = discover(&ns).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["1", "10", "2"]);
    }

    #[test]
    fn discover_skips_global_files_in_chain() {
        let mut ns = Namespace::new();
        item(&mut ns, "3", "");
        ns.create("/expandable").unwrap();
        item(&mut ns, "4", "");
        let names: Vec<String> = discover(&ns).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["3", "4"]);
    }

    #[test]
    fn discover_empty() {
        let mut ns: Namespace<()> = Namespace::new();
        ns.create("/ctl").unwrap();
        assert!(discover(&ns).is_empty());
    }

    #[test]
    fn load_reads_files() {
        let mut ns = Namespace::new();
        item(&mut ns, "1", "cpu 12%\n");
        ns.create_file("/1/fgcolor", b"#FF0000").unwrap();
        let backend = MockBackend::new(100, 20);
        let items = build(&ns, &backend, &style());
        assert_eq!(items.len(), 1);
        let label = &items[0].label;
        assert_eq!(label.text, "cpu 12%");
        assert_eq!(label.fg, Color::rgb(255, 0, 0));
        assert_eq!(label.bg, Color::BLACK);
        assert_eq!(label.border, Color::rgb(1, 2, 3));
    }

    #[test]
    fn unparseable_item_color_is_black() {
        let mut ns = Namespace::new();
        item(&mut ns, "1", "x");
        ns.create_file("/1/bgcolor", b"plaid").unwrap();
        let backend = MockBackend::new(100, 20);
        let items = build(&ns, &backend, &style());
        assert_eq!(items[0].label.bg, Color::BLACK);
    }

    #[test]
    fn missing_data_is_empty_text() {
        let mut ns: Namespace<()> = Namespace::new();
        ns.create("/5").unwrap();
        let backend = MockBackend::new(100, 20);
        let items = build(&ns, &backend, &style());
        assert_eq!(items[0].label.text, "");
        assert_eq!(items[0].name, "5");
    }
}
