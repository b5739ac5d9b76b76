//! UI components and widgets.

mod hit;
mod overlays;
mod panes;

pub use hit::{HitMap, HitRegion};

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use twinpane_core::PaneId;

use crate::app::input::InputState;
use crate::app::Workbench;
use crate::theme::Theme;

/// Layout areas for the application.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub panes: [PaneLayout; 2],
    pub footer: Rect,
}

/// Areas inside one pane.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaneLayout {
    /// Whole pane including the border.
    pub outer: Rect,
    pub tabs: Rect,
    pub path: Rect,
    pub header: Rect,
    pub list: Rect,
}

impl AppLayout {
    /// Compute layout from terminal area.
    pub fn new(area: Rect) -> Self {
        let [header, content, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(area);

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(content);

        Self {
            header,
            panes: [PaneLayout::new(left), PaneLayout::new(right)],
            footer,
        }
    }

    pub fn pane(&self, id: PaneId) -> &PaneLayout {
        &self.panes[id.index()]
    }
}

impl PaneLayout {
    fn new(outer: Rect) -> Self {
        // Border of one cell on every side
        let inner = Rect {
            x: outer.x.saturating_add(1),
            y: outer.y.saturating_add(1),
            width: outer.width.saturating_sub(2),
            height: outer.height.saturating_sub(2),
        };
        let [tabs, path, header, list] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);
        Self {
            outer,
            tabs,
            path,
            header,
            list,
        }
    }
}

/// Render the whole application.
///
/// `hit_map` must come from [`HitMap::compute`] on the same area so rows,
/// scroll offsets and clickable regions agree.
pub fn render(frame: &mut Frame, workbench: &Workbench, hit_map: &HitMap, theme: &Theme) {
    let area = frame.area();
    render_app(workbench, hit_map, theme, area, frame.buffer_mut());
}

fn render_app(workbench: &Workbench, hit_map: &HitMap, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let base_style = Style::default().bg(theme.background).fg(theme.foreground);
    buf.set_style(area, base_style);

    let layout = AppLayout::new(area);
    render_header(workbench, theme, layout.header, buf);
    for id in PaneId::ALL {
        panes::render_pane(workbench, hit_map, theme, id, layout.pane(id), buf);
    }
    render_footer(workbench, theme, layout.footer, buf);

    if workbench.overlay().is_open() {
        if let Some(content) = workbench.overlay().content() {
            overlays::render_overlay(workbench, content, theme, area, buf);
        }
    }

    panes::render_drag_label(workbench, theme, area, buf);
}

fn render_header(workbench: &Workbench, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let active = workbench.pane(workbench.active());
    let line = Line::from(vec![
        Span::styled(" twinpane ", theme.title.add_modifier(Modifier::BOLD)),
        Span::styled(active.current_path().to_string(), theme.header),
    ]);
    Paragraph::new(line).style(theme.header).render(area, buf);
}

fn render_footer(workbench: &Workbench, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let mut spans = Vec::new();
    if let Some(status) = workbench.status() {
        spans.push(Span::styled(format!(" {status} "), Style::default().fg(theme.warning)));
    }
    let buffer = workbench.typeahead_buffer();
    if !buffer.is_empty() {
        spans.push(Span::styled(format!(" find: {buffer} "), Style::default().fg(theme.info)));
    }

    let keys = [
        ("Tab", "Pane"),
        ("Spc", match workbench.space_mode() {
            twinpane_core::SpaceMode::Select => "Select",
            twinpane_core::SpaceMode::Preview => "Preview",
        }),
        ("F2", "Menu"),
        ("F1", "Help"),
    ];
    for (key, desc) in keys {
        spans.push(Span::styled(format!(" {key} "), theme.help_key));
        spans.push(Span::styled(format!("{desc} "), theme.help_desc));
    }
    if workbench.show_dotfiles() {
        spans.push(Span::styled(" .dot ", theme.help_desc));
    }

    Paragraph::new(Line::from(spans))
        .style(theme.footer)
        .render(area, buf);
}

/// Centered popup area.
pub(crate) fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(width)) / 2 + area.x;
    let y = (area.height.saturating_sub(height)) / 2 + area.y;
    Rect::new(x, y, width, height)
}

/// Truncate to a display width, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Spans for a single-line text input with a block cursor, scrolled so the
/// cursor stays within `width` cells.
pub(crate) fn input_spans(input: &InputState, width: usize, style: Style) -> Vec<Span<'static>> {
    let chars: Vec<char> = input.buffer().chars().collect();
    let cursor = input.cursor().min(chars.len());
    let visible = width.saturating_sub(1).max(1);
    let start = cursor.saturating_sub(visible.saturating_sub(1));

    let before: String = chars[start..cursor].iter().collect();
    let at = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = chars
        .iter()
        .skip(cursor + 1)
        .take(visible.saturating_sub(cursor - start + 1))
        .collect();

    vec![
        Span::styled(before, style),
        Span::styled(at, style.add_modifier(Modifier::REVERSED)),
        Span::styled(after, style),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_layout_splits_panes() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.panes[0].outer.width, 50);
        assert_eq!(layout.panes[1].outer.x, 50);
        assert_eq!(layout.panes[0].tabs.y, 2);
        assert_eq!(layout.panes[0].list.y, 5);
        assert_eq!(layout.panes[0].list.height, 30 - 2 - 2 - 3);
    }

    #[test]
    fn test_input_spans_keep_cursor_visible() {
        let input = InputState::with_initial("abcdefghij");
        let spans = input_spans(&input, 5, Style::default());
        let before = spans[0].content.as_ref();
        assert!(before.ends_with('j'));
        assert_eq!(spans[1].content.as_ref(), " ");
    }
}
