//! Pointer and keyboard gestures that move focus and change selection.
//!
//! ```text
//! click ──────────────► toggle row, focus row, drop click anchor
//! ctrl/meta+click ────► toggle row, focus row, drop click anchor
//! shift+click ────────► anchor = click anchor or focus
//!                       range(anchor..=row) = !selected(anchor)
//!                       focus row
//!
//! shift+arrow (first) ► anchor = focus, mode = !selected(anchor)
//! shift+arrow (next)  ► range(anchor..=focus) = mode, rest = baseline
//! shift released ─────► forget anchor
//! ```

use crate::item::Modifiers;
use crate::pane::Pane;

/// Vertical movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Pointer click flavour, derived from held modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Plain,
    Toggle,
    Range,
}

impl ClickKind {
    /// Ctrl/Meta wins over Shift.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.ctrl_or_meta() {
            ClickKind::Toggle
        } else if modifiers.shift {
            ClickKind::Range
        } else {
            ClickKind::Plain
        }
    }
}

/// What a Shift+Arrow gesture applies to its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    Select,
    Deselect,
}

#[derive(Debug, Clone)]
struct ShiftRange {
    anchor: usize,
    mode: RangeMode,
    /// Selection state of every row when the gesture started.
    baseline: Vec<bool>,
}

/// Gesture state for one pane.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    /// Anchor of a shift-click chain.
    click_anchor: Option<usize>,
    /// Live Shift+Arrow gesture.
    range: Option<ShiftRange>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all gesture state. Called on reload and pane switch.
    pub fn reset(&mut self) {
        self.click_anchor = None;
        self.range = None;
    }

    /// Anchor of the running shift-click chain.
    pub fn click_anchor(&self) -> Option<usize> {
        self.click_anchor
    }

    /// Check if a Shift+Arrow gesture is live.
    pub fn range_active(&self) -> bool {
        self.range.is_some()
    }

    /// Apply a click on row `index`.
    pub fn click(&mut self, pane: &mut Pane, index: usize, kind: ClickKind) {
        if index >= pane.len() {
            return;
        }
        self.range = None;

        match kind {
            ClickKind::Plain | ClickKind::Toggle => {
                self.click_anchor = None;
                pane.toggle_selected(index);
            }
            ClickKind::Range => {
                let anchor = self
                    .click_anchor
                    .or(pane.focused())
                    .filter(|&a| a < pane.len());
                match anchor {
                    Some(anchor) => {
                        let target = !pane.is_selected(anchor);
                        let (lo, hi) = ordered(anchor, index);
                        for row in lo..=hi {
                            pane.set_selected(row, target);
                        }
                        self.click_anchor = Some(anchor);
                    }
                    None => {
                        pane.set_selected(index, true);
                        self.click_anchor = Some(index);
                    }
                }
            }
        }

        pane.set_focus(index);
    }

    /// Extend or shrink the Shift+Arrow range by one row.
    ///
    /// Returns false when focus cannot move (no focus, edge of the list, or
    /// the parent marker is next).
    pub fn shift_arrow(&mut self, pane: &mut Pane, direction: Direction) -> bool {
        let Some(current) = pane.focused() else {
            return false;
        };
        let Some(next) = step(current, direction, pane.len()) else {
            return false;
        };
        if pane.item(next).is_some_and(|item| item.is_parent_marker()) {
            return false;
        }

        let range = self.range.get_or_insert_with(|| ShiftRange {
            anchor: current,
            mode: if pane.is_selected(current) {
                RangeMode::Deselect
            } else {
                RangeMode::Select
            },
            baseline: (0..pane.len()).map(|i| pane.is_selected(i)).collect(),
        });

        pane.set_focus(next);
        let (lo, hi) = ordered(range.anchor, next);
        let apply = range.mode == RangeMode::Select;
        for row in 0..pane.len() {
            let selected = if (lo..=hi).contains(&row) {
                apply
            } else {
                range.baseline.get(row).copied().unwrap_or(false)
            };
            pane.set_selected(row, selected);
        }
        self.click_anchor = None;
        true
    }

    /// Shift was released; the next Shift+Arrow starts a new gesture.
    pub fn release_shift(&mut self) {
        self.range = None;
    }
}

/// Move focus one row without touching the selection.
///
/// With nothing focused, the first row receives focus.
pub fn move_focus(pane: &mut Pane, direction: Direction) -> Option<usize> {
    let next = match pane.focused() {
        Some(current) => step(current, direction, pane.len())?,
        None if !pane.is_empty() => 0,
        None => return None,
    };
    pane.set_focus(next);
    Some(next)
}

fn step(current: usize, direction: Direction, len: usize) -> Option<usize> {
    match direction {
        Direction::Up => current.checked_sub(1),
        Direction::Down => (current + 1 < len).then_some(current + 1),
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, PaneId};

    fn pane_with(names: &[&str]) -> Pane {
        let mut pane = Pane::new(PaneId::Left, "/d");
        let items = names
            .iter()
            .map(|&n| {
                if n == ".." {
                    Item::parent_marker("/")
                } else {
                    Item::file(n, format!("/d/{n}"))
                }
            })
            .collect();
        let ticket = pane.begin_load();
        pane.apply_listing(ticket, "/d", items);
        pane
    }

    fn selected(pane: &Pane) -> Vec<usize> {
        pane.selected_indices().collect()
    }

    #[test]
    fn test_plain_click_toggles_and_focuses() {
        let mut pane = pane_with(&["a", "b", "c"]);
        let mut ctl = SelectionController::new();

        ctl.click(&mut pane, 1, ClickKind::Plain);
        assert_eq!(selected(&pane), vec![1]);
        assert_eq!(pane.focused(), Some(1));

        ctl.click(&mut pane, 1, ClickKind::Plain);
        assert!(selected(&pane).is_empty());
        assert_eq!(pane.focused(), Some(1));
    }

    #[test]
    fn test_toggle_click_keeps_other_rows() {
        let mut pane = pane_with(&["a", "b", "c"]);
        let mut ctl = SelectionController::new();

        ctl.click(&mut pane, 0, ClickKind::Toggle);
        ctl.click(&mut pane, 2, ClickKind::Toggle);
        assert_eq!(selected(&pane), vec![0, 2]);
        assert_eq!(pane.focused(), Some(2));
    }

    #[test]
    fn test_shift_click_twice_restores_range() {
        let mut pane = pane_with(&["a", "b", "c", "d", "e"]);
        let mut ctl = SelectionController::new();
        pane.set_focus(1);

        ctl.click(&mut pane, 3, ClickKind::Range);
        assert_eq!(selected(&pane), vec![1, 2, 3]);
        assert_eq!(pane.focused(), Some(3));

        ctl.click(&mut pane, 3, ClickKind::Range);
        assert!(selected(&pane).is_empty());
    }

    #[test]
    fn test_shift_click_uses_opposite_of_anchor() {
        let mut pane = pane_with(&["a", "b", "c", "d"]);
        let mut ctl = SelectionController::new();
        pane.select_all();
        pane.set_focus(0);

        ctl.click(&mut pane, 2, ClickKind::Range);
        assert_eq!(selected(&pane), vec![3]);
    }

    #[test]
    fn test_shift_click_without_focus_selects_row() {
        let mut pane = pane_with(&["a", "b"]);
        pane.clear_focus();
        let mut ctl = SelectionController::new();

        ctl.click(&mut pane, 1, ClickKind::Range);
        assert_eq!(selected(&pane), vec![1]);
        assert_eq!(pane.focused(), Some(1));
    }

    #[test]
    fn test_shift_arrow_extends_and_shrinks() {
        let mut pane = pane_with(&["a", "b", "c", "d"]);
        let mut ctl = SelectionController::new();
        pane.set_focus(1);

        assert!(ctl.shift_arrow(&mut pane, Direction::Down));
        assert!(ctl.shift_arrow(&mut pane, Direction::Down));
        assert_eq!(selected(&pane), vec![1, 2, 3]);

        assert!(ctl.shift_arrow(&mut pane, Direction::Up));
        assert_eq!(selected(&pane), vec![1, 2]);

        ctl.release_shift();
        assert!(!ctl.range_active());
    }

    #[test]
    fn test_shift_arrow_deselect_mode() {
        let mut pane = pane_with(&["a", "b", "c"]);
        pane.select_all();
        pane.set_focus(0);
        let mut ctl = SelectionController::new();

        ctl.shift_arrow(&mut pane, Direction::Down);
        assert_eq!(selected(&pane), vec![2]);
    }

    #[test]
    fn test_shift_arrow_stops_at_parent_marker() {
        let mut pane = pane_with(&["..", "a", "b"]);
        pane.set_focus(1);
        let mut ctl = SelectionController::new();

        assert!(!ctl.shift_arrow(&mut pane, Direction::Up));
        assert_eq!(pane.focused(), Some(1));
    }

    #[test]
    fn test_move_focus_bounds() {
        let mut pane = pane_with(&["a", "b"]);
        assert_eq!(move_focus(&mut pane, Direction::Up), None);
        assert_eq!(move_focus(&mut pane, Direction::Down), Some(1));
        assert_eq!(move_focus(&mut pane, Direction::Down), None);
        assert_eq!(pane.focused(), Some(1));

        let mut empty = pane_with(&[]);
        assert_eq!(move_focus(&mut empty, Direction::Down), None);
    }

    #[test]
    fn test_click_out_of_range_is_ignored() {
        let mut pane = pane_with(&["a"]);
        let mut ctl = SelectionController::new();
        ctl.click(&mut pane, 5, ClickKind::Plain);
        assert!(selected(&pane).is_empty());
        assert_eq!(pane.focused(), Some(0));
    }
}
