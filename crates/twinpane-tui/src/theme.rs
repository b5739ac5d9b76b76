//! Color theme for the TUI.
//!
//! Two variants share one semantic palette: rows, panes, overlays, and the
//! drag indicator each get their own style so the renderer never picks raw
//! colors.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Theme variant (dark or light).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Current theme variant.
    pub variant: ThemeVariant,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Rows
    pub focused: Style,
    pub focused_inactive: Style,
    pub selected: Style,
    pub directory: Style,
    pub file: Style,
    pub parent: Style,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Pane chrome
    pub border: Style,
    pub border_active: Style,
    pub title: Style,
    pub column_header: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,

    // Help
    pub help_key: Style,
    pub help_desc: Style,

    // Drag and drop
    pub drop_target: Style,
    pub drag_label: Style,

    // Header/Footer
    pub header: Style,
    pub footer: Style,

    // Text inputs
    pub input: Style,
    pub input_cursor: Style,
}

impl Theme {
    /// Dark theme using a slate-based palette.
    pub fn dark() -> Self {
        // Slate palette (Tailwind CSS)
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_300 = Color::Rgb(203, 213, 225);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        // Accent colors (Tailwind CSS)
        let blue_400 = Color::Rgb(96, 165, 250);
        let blue_500 = Color::Rgb(59, 130, 246);
        let green_500 = Color::Rgb(34, 197, 94);
        let yellow_500 = Color::Rgb(234, 179, 8);
        let red_500 = Color::Rgb(239, 68, 68);
        let amber_500 = Color::Rgb(245, 158, 11);
        let emerald_700 = Color::Rgb(4, 120, 87);

        Self {
            variant: ThemeVariant::Dark,
            background: slate_900,
            foreground: slate_100,
            muted: slate_500,

            focused: Style::new().bg(slate_700).fg(slate_50).add_modifier(Modifier::BOLD),
            focused_inactive: Style::new().bg(slate_800),
            selected: Style::new().fg(amber_500).add_modifier(Modifier::BOLD),
            directory: Style::new().fg(blue_500).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_300),
            parent: Style::new().fg(slate_400),

            success: green_500,
            warning: yellow_500,
            error: red_500,
            info: blue_400,

            border: Style::new().fg(slate_600),
            border_active: Style::new().fg(blue_400),
            title: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            column_header: Style::new().fg(slate_400).add_modifier(Modifier::UNDERLINED),
            tab_active: Style::new().bg(slate_700).fg(slate_50).add_modifier(Modifier::BOLD),
            tab_inactive: Style::new().fg(slate_400),

            help_key: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_400),

            drop_target: Style::new().bg(emerald_700).fg(slate_50),
            drag_label: Style::new().bg(blue_500).fg(slate_50).add_modifier(Modifier::BOLD),

            header: Style::new().bg(slate_800).fg(slate_100),
            footer: Style::new().bg(slate_800).fg(slate_400),

            input: Style::new().fg(slate_100),
            input_cursor: Style::new().add_modifier(Modifier::REVERSED),
        }
    }

    /// Light theme using a slate-based palette.
    pub fn light() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_200 = Color::Rgb(226, 232, 240);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        // Darker accents for contrast on a light background
        let blue_600 = Color::Rgb(37, 99, 235);
        let blue_700 = Color::Rgb(29, 78, 216);
        let green_600 = Color::Rgb(22, 163, 74);
        let yellow_600 = Color::Rgb(202, 138, 4);
        let red_600 = Color::Rgb(220, 38, 38);
        let amber_600 = Color::Rgb(217, 119, 6);
        let emerald_200 = Color::Rgb(167, 243, 208);

        Self {
            variant: ThemeVariant::Light,
            background: slate_50,
            foreground: slate_900,
            muted: slate_500,

            focused: Style::new().bg(slate_200).fg(slate_900).add_modifier(Modifier::BOLD),
            focused_inactive: Style::new().bg(slate_100),
            selected: Style::new().fg(amber_600).add_modifier(Modifier::BOLD),
            directory: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_700),
            parent: Style::new().fg(slate_500),

            success: green_600,
            warning: yellow_600,
            error: red_600,
            info: blue_600,

            border: Style::new().fg(slate_400),
            border_active: Style::new().fg(blue_600),
            title: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            column_header: Style::new().fg(slate_600).add_modifier(Modifier::UNDERLINED),
            tab_active: Style::new().bg(slate_200).fg(slate_900).add_modifier(Modifier::BOLD),
            tab_inactive: Style::new().fg(slate_500),

            help_key: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_600),

            drop_target: Style::new().bg(emerald_200).fg(slate_900),
            drag_label: Style::new().bg(blue_600).fg(slate_50).add_modifier(Modifier::BOLD),

            header: Style::new().bg(slate_100).fg(slate_800),
            footer: Style::new().bg(slate_100).fg(slate_600),

            input: Style::new().fg(slate_900),
            input_cursor: Style::new().add_modifier(Modifier::REVERSED),
        }
    }

    /// Create theme from variant.
    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
