//! Pointer gestures: row clicks, drag and drop, header sorting and column
//! resizing, tab clicks.

use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use twinpane_core::{
    move_focus, ClickKind, ColumnResize, Direction, DragOutcome, Item, Modifiers, PaneId, Point,
    PointerButton, SortKey,
};

use super::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX, DOUBLE_CLICK_MS};
use super::{modifiers_of, Workbench};
use crate::ui::{HitMap, HitRegion};

/// Pixel position of the top-left corner of a cell.
pub(crate) fn cell_to_point(column: u16, row: u16) -> Point {
    Point::new(
        f64::from(column) * CELL_WIDTH_PX,
        f64::from(row) * CELL_HEIGHT_PX,
    )
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

fn is_double(last: Option<(PaneId, usize, Instant)>, pane: PaneId, index: usize, now: Instant) -> bool {
    last.is_some_and(|(p, i, at)| {
        p == pane && i == index && now.duration_since(at) < Duration::from_millis(DOUBLE_CLICK_MS)
    })
}

impl Workbench {
    /// Handle a mouse event against the last rendered layout.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, hit: &HitMap) {
        self.handle_mouse_at(mouse, hit, Instant::now());
    }

    /// Handle a mouse event at time `now`.
    pub fn handle_mouse_at(&mut self, mouse: MouseEvent, hit: &HitMap, now: Instant) {
        let modifiers = modifiers_of(mouse.modifiers);
        self.drag.set_modifiers(modifiers);

        // The overlay covers the panes
        if self.overlay.is_open() {
            return;
        }

        let point = cell_to_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(button) => {
                let Some(region) = hit.region_at(mouse.column, mouse.row) else {
                    return;
                };
                if self.path_input.is_some() && !matches!(region, HitRegion::Path { .. }) {
                    self.path_input = None;
                }
                self.pointer_down(region, button, point, modifiers, hit, now);
            }
            MouseEventKind::Drag(_) => {
                if let Some((_, resize)) = self.column_resize.as_mut() {
                    resize.drag_to(point.x);
                    return;
                }
                self.drag.motion(point, hit);
            }
            MouseEventKind::Up(_) => self.pointer_up(point, hit, now),
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let Some(pane) = hit.pane_at(mouse.column, mouse.row) else {
                    return;
                };
                let direction = if mouse.kind == MouseEventKind::ScrollUp {
                    Direction::Up
                } else {
                    Direction::Down
                };
                move_focus(&mut self.panes[pane.index()], direction);
            }
            _ => {}
        }
    }

    fn pointer_down(
        &mut self,
        region: HitRegion,
        button: MouseButton,
        point: Point,
        modifiers: Modifiers,
        hit: &HitMap,
        now: Instant,
    ) {
        match region {
            HitRegion::Row { pane, index } => {
                self.activate_pane(pane);
                let p = &self.panes[pane.index()];
                let selected = p.selected_items();
                let dragged: Vec<Item> = if selected.is_empty() {
                    p.item(index).into_iter().cloned().collect()
                } else {
                    selected.into_iter().cloned().collect()
                };
                let dragged = dragged
                    .into_iter()
                    .filter(|i| !i.is_parent_marker())
                    .collect();
                let source_dir = p.current_path().to_string();
                self.drag
                    .press(pointer_button(button), point, pane, &source_dir, dragged);
                if button == MouseButton::Left {
                    self.pending_click = Some((pane, index, modifiers));
                }
            }
            HitRegion::List { pane } => self.activate_pane(pane),
            HitRegion::Header {
                pane,
                column,
                boundary,
            } => {
                if button != MouseButton::Left {
                    return;
                }
                if boundary {
                    let widths_px = hit
                        .column_cells(pane)
                        .iter()
                        .map(|&cells| f64::from(cells) * CELL_WIDTH_PX)
                        .collect();
                    self.column_resize =
                        ColumnResize::begin(widths_px, column, point.x, self.config.min_column_px)
                            .map(|resize| (pane, resize));
                    if self.column_resize.is_some() {
                        return;
                    }
                }
                if let Some(key) = SortKey::from_repr(column) {
                    self.sort_by_column(pane, key);
                }
            }
            HitRegion::Tab { pane, index } => {
                if button != MouseButton::Left {
                    return;
                }
                let double = is_double(self.last_tab_click, pane, index, now);
                if modifiers.ctrl_or_meta() || double {
                    self.last_tab_click = None;
                    self.close_tab(pane, index);
                } else {
                    self.last_tab_click = Some((pane, index, now));
                    self.activate_tab(pane, index);
                }
            }
            HitRegion::Path { pane } => {
                if self.path_input.as_ref().map(|(p, _)| *p) != Some(pane) {
                    self.edit_path(pane);
                }
            }
        }
    }

    fn pointer_up(&mut self, point: Point, hit: &HitMap, now: Instant) {
        if let Some((pane, resize)) = self.column_resize.take() {
            let bar_width = f64::from(hit.list_width(pane)) * CELL_WIDTH_PX;
            let idx = pane.index();
            let widths = resize.finish(bar_width, &self.column_widths[idx]);
            self.column_widths[idx] = self.prefs.set_column_widths(pane, widths.as_slice());
            tracing::debug!(pane = pane.key(), widths = ?self.column_widths[idx].as_slice(), "columns resized");
            return;
        }

        let pending = self.pending_click.take();
        match self.drag.release(point, hit) {
            DragOutcome::Drop(request) => {
                self.transfer(request.action, &request.items, request.target.path());
            }
            DragOutcome::Cancelled => {}
            DragOutcome::Click | DragOutcome::None => {
                if let Some((pane, index, modifiers)) = pending {
                    self.click_row(pane, index, modifiers, now);
                }
            }
        }
    }

    /// A completed click on a row; a second click within the double-click
    /// window opens the row instead.
    fn click_row(&mut self, pane: PaneId, index: usize, modifiers: Modifiers, now: Instant) {
        let idx = pane.index();
        if is_double(self.last_click, pane, index, now) && modifiers.is_empty() {
            self.last_click = None;
            let Some(item) = self.panes[idx].item(index) else {
                return;
            };
            if item.is_parent_marker() {
                self.go_to_parent(pane);
            } else if item.is_dir() {
                let target = item.path.clone();
                self.navigate(pane, &target);
            } else {
                self.panes[idx].set_focus(index);
                self.preview_focused();
            }
            return;
        }

        self.selection[idx].click(
            &mut self.panes[idx],
            index,
            ClickKind::from_modifiers(modifiers),
        );
        self.last_click = Some((pane, index, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_point() {
        let point = cell_to_point(3, 2);
        assert_eq!(point.x, 3.0 * CELL_WIDTH_PX);
        assert_eq!(point.y, 2.0 * CELL_HEIGHT_PX);
    }

    #[test]
    fn test_double_click_window() {
        let start = Instant::now();
        let last = Some((PaneId::Left, 2, start));
        assert!(is_double(last, PaneId::Left, 2, start + Duration::from_millis(100)));
        assert!(!is_double(last, PaneId::Left, 3, start + Duration::from_millis(100)));
        assert!(!is_double(last, PaneId::Right, 2, start + Duration::from_millis(100)));
        assert!(!is_double(
            last,
            PaneId::Left,
            2,
            start + Duration::from_millis(DOUBLE_CLICK_MS + 1)
        ));
    }
}
