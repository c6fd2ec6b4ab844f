//! Horizontal layout of bar items.
//!
//! Items are laid out left to right in registry order. Either every item
//! gets an equal share of the bar (failsafe mode), or one expandable item
//! absorbs whatever the others leave over.

use wmibar_types::backend::is_meter;

/// How the widths of a layout pass were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Equal shares; the last item takes the rounding remainder.
    Failsafe,
    /// The item at this position absorbs the leftover width.
    Expandable(usize),
}

/// Natural width of an item: half the bar height for meters, otherwise
/// the bar height plus the measured text width.
pub fn precalc_width(text: &str, bar_h: u32, measure: impl Fn(&str) -> u32) -> u32 {
    if is_meter(text) {
        bar_h / 2
    } else if text.is_empty() {
        bar_h
    } else {
        bar_h.saturating_add(measure(text))
    }
}

/// Resolve the content of `/expandable` to a 0-based position.
///
/// The value must be an integer in `[1, counter]`, an item with that name
/// must exist, and the value must be a valid 1-based position among the
/// `names`. The position, not the named item, receives the leftover.
pub fn resolve_expandable(content: &str, counter: u32, names: &[&str]) -> Option<usize> {
    let value: u32 = content.trim().parse().ok()?;
    if value == 0 || value > counter {
        return None;
    }
    let wanted = value.to_string();
    if !names.iter().any(|n| *n == wanted) {
        return None;
    }
    let pos = value as usize - 1;
    (pos < names.len()).then_some(pos)
}

/// Compute item widths for a bar of width `bar_w`.
///
/// `precalc` holds the natural width of every item; it is only consulted
/// when `expandable` is set. Returns the widths and the mode used.
pub fn compute_widths(bar_w: u32, precalc: &[u32], expandable: Option<usize>) -> (Vec<u32>, Mode) {
    let n = precalc.len();
    if n == 0 {
        return (Vec::new(), Mode::Failsafe);
    }

    if let Some(e) = expandable.filter(|&e| e < n) {
        let others: u64 = precalc
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != e)
            .map(|(_, &w)| u64::from(w))
            .sum();
        if others <= u64::from(bar_w) {
            let mut widths = precalc.to_vec();
            widths[e] = bar_w - others as u32;
            return (widths, Mode::Expandable(e));
        }
        log::debug!("items need {others}px of {bar_w}px, falling back to equal widths");
    }

    (failsafe_widths(bar_w, n), Mode::Failsafe)
}

/// `n` equal shares of `bar_w`; the last share absorbs the remainder.
pub fn failsafe_widths(bar_w: u32, n: usize) -> Vec<u32> {
    if n == 0 {
        return Vec::new();
    }
    let share = bar_w / n as u32;
    let mut widths = vec![share; n];
    widths[n - 1] = bar_w - share * (n as u32 - 1);
    widths
}

/// Left offsets for consecutive `widths` starting at x = 0.
pub fn offsets(widths: &[u32]) -> Vec<i32> {
    widths
        .iter()
        .scan(0i64, |x, &w| {
            let at = *x;
            *x += i64::from(w);
            Some(at.clamp(0, i64::from(i32::MAX)) as i32)
        })
        .collect()
}
