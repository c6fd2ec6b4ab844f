//! Routing of native window events.

use wmibar_types::input::{MAX_BUTTON, NativeEvent};

use crate::item::Item;

/// What the bar should do in response to a native event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Rebuild and repaint the bar.
    Redraw,
    /// Run the `b<button>press` command of the item at this position.
    Press { item: usize, button: u8 },
    /// Stop the event loop.
    Quit,
    Ignore,
}

/// Decide how to react to `event` given the items of the last redraw.
///
/// Only the final expose of a batch (`count == 0`) repaints. Presses are
/// hit-tested in layout order and the first hit wins.
pub fn route(event: &NativeEvent, items: &[Item]) -> Reaction {
    match *event {
        NativeEvent::Expose { count: 0 } => Reaction::Redraw,
        NativeEvent::Expose { .. } => Reaction::Ignore,
        NativeEvent::ButtonPress { button, x, y } => {
            if !(1..=MAX_BUTTON).contains(&button) {
                return Reaction::Ignore;
            }
            items
                .iter()
                .position(|i| i.label.rect.contains(x, y))
                .map_or(Reaction::Ignore, |item| Reaction::Press { item, button })
        },
        NativeEvent::Quit => Reaction::Quit,
        NativeEvent::Other => Reaction::Ignore,
    }
}

/// Name of the command file for `button`.
pub fn press_file(button: u8) -> String {
    format!("b{button}press")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmibar_types::backend::Label;
    use wmibar_types::color::Color;
    use wmibar_types::font::Font;
    use wmibar_types::geometry::Rect;
    use wmibar_vfs::Namespace;

    fn items(rects: &[Rect]) -> Vec<Item> {
        let ns: Namespace<()> = Namespace::new();
        rects
            .iter()
            .enumerate()
            .map(|(i, rect)| Item {
                root: ns.root(),
                name: (i + 1).to_string(),
                label: Label {
                    rect: *rect,
                    fg: Color::WHITE,
                    bg: Color::BLACK,
                    border: Color::WHITE,
                    font: Font::default(),
                    text: String::new(),
                },
            })
            .collect()
    }

    #[test]
    fn expose_redraws_only_on_last() {
        assert_eq!(route(&NativeEvent::Expose { count: 0 }, &[]), Reaction::Redraw);
        assert_eq!(route(&NativeEvent::Expose { count: 2 }, &[]), Reaction::Ignore);
    }

    #[test]
    fn press_hits_item() {
        let list = items(&[Rect::new(0, 0, 100, 20), Rect::new(100, 0, 100, 20)]);
        let ev = NativeEvent::ButtonPress { button: 3, x: 150, y: 5 };
        assert_eq!(route(&ev, &list), Reaction::Press { item: 1, button: 3 });
    }

    #[test]
    fn right_edge_is_exclusive() {
        let list = items(&[Rect::new(0, 0, 100, 20), Rect::new(100, 0, 100, 20)]);
        let ev = NativeEvent::ButtonPress { button: 1, x: 100, y: 0 };
        assert_eq!(route(&ev, &list), Reaction::Press { item: 1, button: 1 });
    }

    #[test]
    fn first_hit_wins() {
        let list = items(&[Rect::new(0, 0, 100, 20), Rect::new(50, 0, 100, 20)]);
        let ev = NativeEvent::ButtonPress { button: 1, x: 75, y: 10 };
        assert_eq!(route(&ev, &list), Reaction::Press { item: 0, button: 1 });
    }

    #[test]
    fn press_outside_is_ignored() {
        let list = items(&[Rect::new(0, 0, 100, 20)]);
        let ev = NativeEvent::ButtonPress { button: 1, x: 10, y: 40 };
        assert_eq!(route(&ev, &list), Reaction::Ignore);
    }

    #[test]
    fn unknown_buttons_are_ignored() {
        let list = items(&[Rect::new(0, 0, 100, 20)]);
        for button in [0, 6, 9] {
            let ev = NativeEvent::ButtonPress { button, x: 1, y: 1 };
            assert_eq!(route(&ev, &list), Reaction::Ignore);
        }
    }

    #[test]
    fn quit_and_other() {
        assert_eq!(route(&NativeEvent::Quit, &[]), Reaction::Quit);
        assert_eq!(route(&NativeEvent::Other, &[]), Reaction::Ignore);
    }

    #[test]
    fn press_file_names() {
        assert_eq!(press_file(1), "b1press");
        assert_eq!(press_file(5), "b5press");
    }
}
