//! Overlay widgets drawn over both panes.

use itertools::Itertools;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use twinpane_ops::{PreviewBody, PreviewContent};

use super::{input_spans, popup_area, truncate};
use crate::app::input::InputState;
use crate::app::{
    MenuOverlay, MessageOverlay, OverlayContent, PreviewOverlay, PromptKind, TerminalOverlay,
    UploadOverlay, Workbench,
};
use crate::event::{get_help_sections, HelpSection};
use crate::theme::Theme;

pub(super) fn render_overlay(
    workbench: &Workbench,
    content: &OverlayContent,
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    match content {
        OverlayContent::Message(message) => render_message(message, theme, area, buf),
        OverlayContent::Help => HelpOverlay::new(theme).render(area, buf),
        OverlayContent::Menu(menu) => render_menu(menu, theme, area, buf),
        OverlayContent::Preview(preview) => render_preview(preview, theme, area, buf),
        OverlayContent::Terminal(terminal) => render_terminal(terminal, theme, area, buf),
        OverlayContent::Editor { path } => {
            let inner = framed(theme, " Editor ", popup_area(area, 60, 5), theme.border, buf);
            Paragraph::new(vec![
                Line::styled(format!("Editing {path}"), theme.help_desc),
                Line::styled("The editor runs in the terminal.", Style::default().fg(theme.muted)),
            ])
            .render(inner, buf);
        }
        OverlayContent::Upload(upload) => render_upload(workbench, upload, theme, area, buf),
    }
}

/// Clear `popup`, draw a titled border and return the inner area.
fn framed(theme: &Theme, title: &str, popup: Rect, border: Style, buf: &mut Buffer) -> Rect {
    Clear.render(popup, buf);
    let block = Block::default()
        .title(title.to_string())
        .title_style(theme.title)
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(popup);
    block.render(popup, buf);
    inner
}

fn input_line(input: &InputState, width: u16, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    spans.extend(input_spans(input, usize::from(width.saturating_sub(4)), theme.input));
    Line::from(spans)
}

fn render_message(message: &MessageOverlay, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let Some(prompt) = &message.prompt else {
        let (title, border) = if message.is_error {
            (" Error ", Style::default().fg(theme.error))
        } else {
            (" Message ", theme.border)
        };
        let lines = message.text.lines().count() as u16;
        let inner = framed(theme, title, popup_area(area, 60, lines + 4), border, buf);
        Paragraph::new(message.text.as_str())
            .style(if message.is_error {
                Style::default().fg(theme.error)
            } else {
                theme.help_desc
            })
            .wrap(Wrap { trim: false })
            .render(inner, buf);
        return;
    };

    let title = match &prompt.kind {
        PromptKind::Rename { .. } => " Rename ",
        PromptKind::Duplicate { .. } => " Duplicate ",
        PromptKind::NewItem { .. } => " New ",
    };
    let height = if prompt.input.error().is_some() { 8 } else { 7 };
    let inner = framed(theme, title, popup_area(area, 50, height), theme.border, buf);

    let mut lines = vec![
        Line::styled(message.text.clone(), theme.help_desc),
        Line::raw(""),
        input_line(&prompt.input, inner.width, theme),
        Line::raw(""),
    ];
    if let Some(error) = prompt.input.error() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(theme.error)));
    }
    let hint = match &prompt.kind {
        PromptKind::NewItem { as_file: true, .. } => "Enter create file · Tab folder · Esc cancel",
        PromptKind::NewItem { as_file: false, .. } => "Enter create folder · Tab file · Esc cancel",
        _ => "Enter confirm · Esc cancel",
    };
    lines.push(Line::styled(hint, Style::default().fg(theme.muted)));
    Paragraph::new(lines).render(inner, buf);
}

/// Help overlay showing key bindings organized by section.
struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn render_sections(&self, sections: &[&HelpSection], area: Rect, buf: &mut Buffer) {
        let bottom = area.y + area.height;
        let mut y = area.y;
        for section in sections {
            if y >= bottom {
                break;
            }
            let title = Line::from(Span::styled(
                section.title,
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::BOLD),
            ));
            buf.set_line(area.x, y, &title, area.width);
            y += 1;

            for binding in &section.bindings {
                if y >= bottom {
                    break;
                }
                let line = Line::from(vec![
                    Span::styled(format!("{:>14}", binding.keys), self.theme.help_key),
                    Span::styled(format!(" {}", binding.description), self.theme.help_desc),
                ]);
                buf.set_line(area.x, y, &line, area.width);
                y += 1;
            }
            y += 1;
        }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = popup_area(area, 84, 28);
        let inner = framed(self.theme, " Help - Esc to close ", popup, self.theme.border, buf);

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);

        let sections = get_help_sections();
        let refs: Vec<&HelpSection> = sections.iter().collect();
        let (first, second) = refs.split_at(refs.len().div_ceil(2));
        self.render_sections(first, left, buf);
        self.render_sections(second, right, buf);
    }
}

fn render_menu(menu: &MenuOverlay, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let groups = menu.entries.iter().chunk_by(|e| e.menu.as_str());
    let group_count = menu.entries.iter().map(|e| &e.menu).dedup().count() as u16;
    let height = menu.entries.len() as u16 + group_count * 2 + 2;
    let inner = framed(theme, " Menu ", popup_area(area, 40, height), theme.border, buf);

    let mut lines = Vec::new();
    let mut index = 0;
    for (menu_name, entries) in &groups {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(
            menu_name.to_uppercase(),
            Style::default()
                .fg(theme.info)
                .add_modifier(Modifier::BOLD),
        ));
        for entry in entries {
            let style = if index == menu.cursor {
                theme.focused
            } else {
                theme.help_desc
            };
            lines.push(Line::styled(format!("  {}", entry.label), style));
            index += 1;
        }
    }
    Paragraph::new(lines).render(inner, buf);
}

fn preview_lines(content: &PreviewContent, width: u16, style: Style) -> Vec<Line<'static>> {
    match &content.body {
        PreviewBody::Text { text, truncated } => {
            let mut lines: Vec<Line> = text
                .lines()
                .map(|l| Line::styled(l.replace('\t', "    "), style))
                .collect();
            if *truncated {
                lines.push(Line::styled("…", style));
            }
            lines
        }
        PreviewBody::Directory { entries } => entries
            .iter()
            .map(|e| {
                let name = if e.is_dir {
                    format!("{}/", e.name)
                } else {
                    e.name.clone()
                };
                Line::styled(truncate(&name, usize::from(width)), style)
            })
            .collect(),
        PreviewBody::Summary(text) | PreviewBody::Unavailable(text) => {
            vec![Line::styled(text.clone(), style)]
        }
    }
}

fn render_preview(preview: &PreviewOverlay, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let width = area.width.saturating_sub(8).max(20);
    let height = area.height.saturating_sub(4).max(6);
    let title = format!(" {} · {} ", preview.item.name, preview.kind);
    let inner = framed(theme, &title, popup_area(area, width, height), theme.border_active, buf);

    let mut lines = Vec::new();
    if let Some(size) = &preview.folder_size {
        lines.push(Line::styled(format!("Size: {size}"), theme.help_key));
        lines.push(Line::raw(""));
    }
    match &preview.content {
        Some(content) => {
            let style = if preview.text_selected {
                theme.help_desc.add_modifier(Modifier::REVERSED)
            } else {
                theme.help_desc
            };
            lines.extend(preview_lines(content, inner.width, style));
        }
        None => lines.push(Line::styled("Loading…", Style::default().fg(theme.muted))),
    }
    if preview.player_active {
        lines.push(Line::raw(""));
        lines.push(Line::styled("▶ playing", Style::default().fg(theme.success)));
    }
    Paragraph::new(lines).render(inner, buf);
}

fn render_terminal(terminal: &TerminalOverlay, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let width = area.width.saturating_sub(4).max(20);
    let height = area.height.saturating_sub(2).max(6);
    let title = format!(" {} ", terminal.title);
    let inner = framed(theme, &title, popup_area(area, width, height), theme.border_active, buf);

    let [output_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let mut lines: Vec<&str> = terminal.output.lines().collect();
    if !terminal.command.is_empty() && lines.is_empty() {
        lines.push(terminal.command.as_str());
    }
    let visible = usize::from(output_area.height);
    let tail: Vec<Line> = lines
        .iter()
        .skip(lines.len().saturating_sub(visible))
        .map(|l| Line::raw(l.to_string()))
        .collect();
    Paragraph::new(tail)
        .style(theme.help_desc)
        .render(output_area, buf);

    let input = match terminal.exited {
        Some(code) => Line::styled(
            match code {
                Some(code) => format!("exited ({code}) · Esc to close"),
                None => "exited · Esc to close".to_string(),
            },
            Style::default().fg(theme.muted),
        ),
        None => {
            let mut spans = vec![Span::styled("$ ", theme.help_key)];
            spans.extend(input_spans(
                &terminal.input,
                usize::from(input_area.width.saturating_sub(2)),
                theme.input,
            ));
            Line::from(spans)
        }
    };
    buf.set_line(input_area.x, input_area.y, &input, input_area.width);
}

fn render_upload(
    workbench: &Workbench,
    upload: &UploadOverlay,
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    let height = upload.queued.len() as u16 + 9;
    let inner = framed(theme, " Upload ", popup_area(area, 64, height), theme.border, buf);

    let target_pane = workbench.pane(upload.pane).current_path();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Into: ", theme.help_key),
            Span::styled(upload.target.clone(), theme.help_desc),
        ]),
        Line::raw(""),
    ];
    for path in &upload.queued {
        lines.push(Line::styled(
            format!("  {}", truncate(&path.display().to_string(), usize::from(inner.width))),
            theme.help_desc,
        ));
    }
    if upload.uploading {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("Uploading {} files…", upload.queued.len()),
            Style::default().fg(theme.info),
        ));
    } else {
        lines.push(Line::raw(""));
        lines.push(input_line(&upload.input, inner.width, theme));
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Enter add path · Enter on empty starts · Esc cancel",
            Style::default().fg(theme.muted),
        ));
    }
    if upload.target != target_pane {
        lines.push(Line::styled(
            format!("Pane now shows {target_pane}"),
            Style::default().fg(theme.warning),
        ));
    }
    Paragraph::new(lines).render(inner, buf);
}
