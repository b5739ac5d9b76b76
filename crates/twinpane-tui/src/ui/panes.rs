//! Pane rendering: tab bar, path line, column header and listing.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use twinpane_core::{DropTarget, Item, ItemKind, PaneId, PaneStatus, SortKey, SortOrder};

use super::hit::column_cells;
use super::{input_spans, truncate, HitMap, PaneLayout};
use crate::app::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::app::Workbench;
use crate::theme::Theme;

/// State needed to render one pane.
struct PaneContext<'a> {
    workbench: &'a Workbench,
    hit_map: &'a HitMap,
    theme: &'a Theme,
    id: PaneId,
    is_active: bool,
    /// Drop target inside this pane, if any.
    target: Option<&'a DropTarget>,
}

pub(super) fn render_pane(
    workbench: &Workbench,
    hit_map: &HitMap,
    theme: &Theme,
    id: PaneId,
    layout: &PaneLayout,
    buf: &mut Buffer,
) {
    let is_active = workbench.active() == id;
    let target = workbench.drag().target().filter(|t| t.pane() == id);
    let list_targeted = matches!(target, Some(DropTarget::PaneList { .. }));
    let ctx = PaneContext {
        workbench,
        hit_map,
        theme,
        id,
        is_active,
        target,
    };

    let border_style = if list_targeted {
        theme.drop_target
    } else if is_active {
        theme.border_active
    } else {
        theme.border
    };
    let title = match id {
        PaneId::Left => " Left ",
        PaneId::Right => " Right ",
    };
    Block::default()
        .title(title)
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(border_style)
        .render(layout.outer, buf);

    render_tabs(&ctx, layout.tabs, buf);
    render_path(&ctx, layout.path, buf);
    render_column_header(&ctx, layout.header, buf);

    let pane = workbench.pane(id);
    match pane.status() {
        PaneStatus::Error(message) => {
            Paragraph::new(Line::styled(
                message.clone(),
                Style::default().fg(theme.error),
            ))
            .wrap(Wrap { trim: true })
            .render(layout.list, buf);
        }
        PaneStatus::IsFile => {
            Paragraph::new(Line::styled(
                format!("{} is a file.", pane.current_path()),
                Style::default().fg(theme.warning),
            ))
            .render(layout.list, buf);
        }
        PaneStatus::Loading if pane.is_empty() => {
            Paragraph::new(Line::styled("Loading…", Style::default().fg(theme.muted)))
                .render(layout.list, buf);
        }
        _ => render_rows(&ctx, layout.list, buf),
    }
}

fn render_tabs(ctx: &PaneContext, area: Rect, buf: &mut Buffer) {
    let PaneContext {
        workbench,
        hit_map,
        theme,
        id,
        target,
        ..
    } = *ctx;
    let active = workbench.tabs(id).map(|t| t.active);
    for tab in hit_map.tabs(id) {
        let targeted = matches!(target, Some(DropTarget::Tab { index, .. }) if *index == tab.index);
        let style = if targeted {
            theme.drop_target
        } else if Some(tab.index) == active {
            theme.tab_active
        } else {
            theme.tab_inactive
        };
        if tab.area.y == area.y {
            buf.set_stringn(tab.area.x, tab.area.y, &tab.label, usize::from(tab.area.width), style);
        }
    }
}

fn render_path(ctx: &PaneContext, area: Rect, buf: &mut Buffer) {
    let (workbench, theme, id) = (ctx.workbench, ctx.theme, ctx.id);
    let line = match workbench.path_input() {
        Some((pane, input)) if pane == id => {
            let mut spans = input_spans(input, usize::from(area.width), theme.input);
            if let Some(error) = input.error() {
                spans.push(Span::styled(format!("  {error}"), Style::default().fg(theme.error)));
            }
            Line::from(spans)
        }
        _ => {
            let path = workbench.pane(id).current_path();
            Line::styled(truncate(path, usize::from(area.width)), theme.header)
        }
    };
    buf.set_line(area.x, area.y, &line, area.width);
}

fn render_column_header(ctx: &PaneContext, area: Rect, buf: &mut Buffer) {
    let (workbench, theme, id) = (ctx.workbench, ctx.theme, ctx.id);
    let hit_map = ctx.hit_map;
    let pane = workbench.pane(id);
    let cells = hit_map.column_cells(id);
    let resizing = workbench.column_resize(id).map(|r| r.left_column());
    let mut x = area.x;
    for (column, &width) in cells.iter().enumerate() {
        let Some(key) = SortKey::from_repr(column) else {
            break;
        };
        let arrow = if pane.sort_by() == key {
            match pane.sort_order() {
                SortOrder::Asc => " ▲",
                SortOrder::Desc => " ▼",
            }
        } else {
            ""
        };
        let label = truncate(&format!("{}{arrow}", key.label()), usize::from(width.saturating_sub(1)));
        let style = if resizing == Some(column) {
            theme.column_header.add_modifier(Modifier::REVERSED)
        } else {
            theme.column_header
        };
        if x < area.x + area.width {
            let available = usize::from((area.x + area.width - x).min(width));
            buf.set_stringn(x, area.y, label, available, style);
        }
        x = x.saturating_add(width);
    }
}

fn render_rows(ctx: &PaneContext, area: Rect, buf: &mut Buffer) {
    let PaneContext {
        workbench,
        hit_map,
        theme,
        id,
        is_active,
        target,
    } = *ctx;
    let pane = workbench.pane(id);
    let cells = column_cells(workbench, id, area.width);
    let scroll = hit_map.scroll(id);
    let focused = pane.focused();

    for (row, index) in (scroll..pane.len()).take(usize::from(area.height)).enumerate() {
        let Some(item) = pane.item(index) else {
            break;
        };
        let y = area.y + row as u16;

        let targeted = matches!(target, Some(DropTarget::Directory { path, .. }) if *path == item.path);
        let mut style = match item.kind {
            ItemKind::ParentMarker => theme.parent,
            ItemKind::Directory => theme.directory,
            ItemKind::File => theme.file,
        };
        if pane.is_selected(index) {
            style = style.patch(theme.selected);
        }
        if focused == Some(index) {
            style = style.patch(if is_active {
                theme.focused
            } else {
                theme.focused_inactive
            });
        }
        if targeted {
            style = style.patch(theme.drop_target);
        }

        buf.set_style(Rect::new(area.x, y, area.width, 1), style);
        let mut x = area.x;
        for (column, &width) in cells.iter().enumerate() {
            if x >= area.x + area.width {
                break;
            }
            let text = cell_text(workbench, item, column);
            let available = (area.x + area.width - x).min(width);
            let text = truncate(&text, usize::from(available.saturating_sub(1)));
            buf.set_stringn(x, y, text, usize::from(available), style);
            x = x.saturating_add(width);
        }
    }
}

fn cell_text(workbench: &Workbench, item: &Item, column: usize) -> String {
    match SortKey::from_repr(column) {
        Some(SortKey::Name) => match item.kind {
            ItemKind::Directory => format!("{}/", item.name),
            _ => item.name.to_string(),
        },
        Some(SortKey::Extension) => item.extension.clone(),
        Some(SortKey::Size) => match item.kind {
            ItemKind::Directory => workbench
                .folder_size(&item.path)
                .map(str::to_string)
                .unwrap_or_else(|| item.size.clone()),
            _ => item.size.clone(),
        },
        Some(SortKey::Modified) => item.modified.clone(),
        Some(SortKey::Created) => item.created.clone(),
        None => String::new(),
    }
}

/// Floating drag label next to the pointer.
pub(super) fn render_drag_label(workbench: &Workbench, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let Some(label) = workbench.drag().label() else {
        return;
    };
    let x = (label.position.x / CELL_WIDTH_PX).max(0.0) as u16;
    let y = (label.position.y / CELL_HEIGHT_PX).max(0.0) as u16;
    if x >= area.x + area.width || y >= area.y + area.height {
        return;
    }
    let available = usize::from(area.x + area.width - x);
    buf.set_stringn(x, y, format!(" {} ", label.text), available, theme.drag_label);
}
