//! Clickable regions of the last rendered frame.
//!
//! The hit map is computed from the same layout the renderer uses, before
//! each draw, and doubles as the drag engine's [`HitTest`].

use ratatui::layout::{Position, Rect};
use unicode_width::UnicodeWidthStr;

use twinpane_core::{DropTarget, HitTest, PaneId, PaneStatus, PaneTabs, Point};

use super::{AppLayout, PaneLayout};
use crate::app::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::app::Workbench;

/// What lies under a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// A listed row.
    Row { pane: PaneId, index: usize },
    /// Listing space below the last row.
    List { pane: PaneId },
    /// A column header cell; `boundary` when on the column's right edge.
    Header {
        pane: PaneId,
        column: usize,
        boundary: bool,
    },
    Tab { pane: PaneId, index: usize },
    Path { pane: PaneId },
}

/// One tab label in a tab bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabHit {
    pub index: usize,
    pub area: Rect,
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Default)]
struct PaneHits {
    layout: PaneLayout,
    /// First visible row.
    scroll: usize,
    /// Directory path of each visible row, `None` for files.
    rows: Vec<Option<String>>,
    current_path: String,
    droppable: bool,
    columns: Vec<u16>,
    tabs: Vec<TabHit>,
}

/// Regions of the last frame.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    panes: [PaneHits; 2],
}

impl HitMap {
    /// Compute regions for a frame of size `area`.
    ///
    /// Scroll offsets continue from `previous` so the list only scrolls
    /// when focus leaves the visible rows.
    pub fn compute(area: Rect, workbench: &Workbench, previous: &HitMap) -> Self {
        let layout = AppLayout::new(area);
        let panes = PaneId::ALL.map(|id| {
            let pane_layout = *layout.pane(id);
            let pane = workbench.pane(id);
            let height = usize::from(pane_layout.list.height);
            let scroll = scroll_offset(
                previous.panes[id.index()].scroll,
                pane.focused(),
                pane.len(),
                height,
            );
            let end = (scroll + height).min(pane.len());
            let rows = (scroll..end)
                .map(|i| {
                    pane.item(i)
                        .filter(|item| item.is_dir())
                        .map(|item| item.path.clone())
                })
                .collect();

            PaneHits {
                layout: pane_layout,
                scroll,
                rows,
                current_path: pane.current_path().to_string(),
                droppable: matches!(pane.status(), PaneStatus::Ready),
                columns: column_cells(workbench, id, pane_layout.list.width),
                tabs: workbench
                    .tabs(id)
                    .map(|tabs| tab_hits(tabs, pane_layout.tabs))
                    .unwrap_or_default(),
            }
        });
        Self { panes }
    }

    /// First visible row of a pane.
    pub fn scroll(&self, pane: PaneId) -> usize {
        self.panes[pane.index()].scroll
    }

    /// Column widths in cells, as drawn.
    pub fn column_cells(&self, pane: PaneId) -> &[u16] {
        &self.panes[pane.index()].columns
    }

    /// Width of a pane's listing in cells.
    pub fn list_width(&self, pane: PaneId) -> u16 {
        self.panes[pane.index()].layout.list.width
    }

    pub fn tabs(&self, pane: PaneId) -> &[TabHit] {
        &self.panes[pane.index()].tabs
    }

    /// Pane whose border box contains the cell.
    pub fn pane_at(&self, column: u16, row: u16) -> Option<PaneId> {
        let position = Position::new(column, row);
        PaneId::ALL
            .into_iter()
            .find(|id| self.panes[id.index()].layout.outer.contains(position))
    }

    /// Region under a cell.
    pub fn region_at(&self, column: u16, row: u16) -> Option<HitRegion> {
        let position = Position::new(column, row);
        let pane = self.pane_at(column, row)?;
        let hits = &self.panes[pane.index()];
        let layout = &hits.layout;

        if layout.tabs.contains(position) {
            return hits
                .tabs
                .iter()
                .find(|tab| tab.area.contains(position))
                .map(|tab| HitRegion::Tab {
                    pane,
                    index: tab.index,
                });
        }
        if layout.path.contains(position) {
            return Some(HitRegion::Path { pane });
        }
        if layout.header.contains(position) {
            let offset = column - layout.header.x;
            let mut right = 0u16;
            for (i, &width) in hits.columns.iter().enumerate() {
                right += width;
                if offset < right {
                    let boundary = offset + 1 == right && i + 1 < hits.columns.len();
                    return Some(HitRegion::Header {
                        pane,
                        column: i,
                        boundary,
                    });
                }
            }
            return None;
        }
        if layout.list.contains(position) {
            let visible = usize::from(row - layout.list.y);
            if visible < hits.rows.len() {
                return Some(HitRegion::Row {
                    pane,
                    index: hits.scroll + visible,
                });
            }
            return Some(HitRegion::List { pane });
        }
        None
    }
}

impl HitTest for HitMap {
    fn droppable_at(&self, point: Point) -> Option<DropTarget> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (point.x / CELL_WIDTH_PX) as u16;
        let row = (point.y / CELL_HEIGHT_PX) as u16;
        let region = self.region_at(column, row)?;

        match region {
            HitRegion::Tab { pane, index } => {
                let hits = &self.panes[pane.index()];
                hits.tabs
                    .iter()
                    .find(|t| t.index == index)
                    .map(|tab| DropTarget::Tab {
                        pane,
                        index,
                        path: tab.path.clone(),
                    })
            }
            HitRegion::Row { pane, index } => {
                let hits = &self.panes[pane.index()];
                let dir = hits
                    .rows
                    .get(index - hits.scroll)
                    .and_then(|path| path.clone());
                match dir {
                    Some(path) => Some(DropTarget::Directory { pane, path }),
                    // A file row drops into the listing around it
                    None => hits.pane_list(pane),
                }
            }
            HitRegion::List { pane } => self.panes[pane.index()].pane_list(pane),
            HitRegion::Header { .. } | HitRegion::Path { .. } => None,
        }
    }
}

impl PaneHits {
    fn pane_list(&self, pane: PaneId) -> Option<DropTarget> {
        self.droppable.then(|| DropTarget::PaneList {
            pane,
            path: self.current_path.clone(),
        })
    }
}

/// Keep `focused` within the `height` rows starting at the returned offset.
pub(crate) fn scroll_offset(previous: usize, focused: Option<usize>, len: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    let mut scroll = previous.min(len.saturating_sub(height));
    if let Some(focused) = focused {
        if focused < scroll {
            scroll = focused;
        } else if focused >= scroll + height {
            scroll = focused + 1 - height;
        }
    }
    scroll
}

/// Column widths in cells; follows a live resize.
pub(crate) fn column_cells(workbench: &Workbench, pane: PaneId, width: u16) -> Vec<u16> {
    match workbench.column_resize(pane) {
        Some(resize) => resize
            .widths_px()
            .iter()
            .map(|px| (px / CELL_WIDTH_PX).round().max(0.0) as u16)
            .collect(),
        None => workbench.column_widths(pane).to_cells(width),
    }
}

/// Lay tab labels left to right, dropping those that do not fit.
pub(crate) fn tab_hits(tabs: &PaneTabs, area: Rect) -> Vec<TabHit> {
    let mut x = area.x;
    let right = area.x + area.width;
    let mut hits = Vec::new();
    for (index, tab) in tabs.tabs.iter().enumerate() {
        let label = format!(" {} ", tab.name);
        let width = label.width() as u16;
        if x + width > right {
            break;
        }
        hits.push(TabHit {
            index,
            area: Rect::new(x, area.y, width, 1),
            label,
            path: tab.path.clone(),
        });
        x += width + 1;
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_follows_focus() {
        assert_eq!(scroll_offset(0, Some(3), 100, 10), 0);
        assert_eq!(scroll_offset(0, Some(12), 100, 10), 3);
        assert_eq!(scroll_offset(5, Some(2), 100, 10), 2);
        assert_eq!(scroll_offset(50, None, 20, 10), 10);
        assert_eq!(scroll_offset(4, Some(0), 3, 0), 0);
    }

    #[test]
    fn test_tab_hits_stop_at_edge() {
        let tabs = PaneTabs {
            active: 0,
            tabs: vec![
                twinpane_core::Tab::new("/alpha"),
                twinpane_core::Tab::new("/beta"),
                twinpane_core::Tab::new("/gamma"),
            ],
        };
        let hits = tab_hits(&tabs, Rect::new(0, 0, 16, 1));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].label, " alpha ");
        assert_eq!(hits[1].area.x, 8);
        assert_eq!(hits[1].path, "/beta");
    }
}
