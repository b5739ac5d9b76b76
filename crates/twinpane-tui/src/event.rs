//! Key bindings for the file list.
//!
//! Bindings are a static, ordered table of `(key, exact modifiers, action)`.
//! Character keys are compared case-insensitively so `Shift+Z` matches
//! whether the terminal reports `Z` or `z`. Every matching row fires, in
//! table order.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::Display;

/// Action bound to a key on the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum KeyAction {
    // Panes and navigation
    SwitchPane,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ExtendUp,
    ExtendDown,
    EditPath,

    // Selection
    SpaceAction,
    ToggleSpaceMode,
    ToggleSelection,
    SelectAll,
    Deselect,

    // Overlays
    Enter,
    Preview,
    OpenShell,
    Help,
    Menu,

    // File operations
    Rename,
    Duplicate,
    NewItem,
    Copy,
    Move,
    Delete,
    Open,
    RunInTerminal,
    Archive,
    Upload,
    Download,

    // Listing
    ToggleDotfiles,
    NewTab,
    CloseTab,

    Quit,
}

const NONE: KeyModifiers = KeyModifiers::NONE;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const CTRL_SHIFT: KeyModifiers = KeyModifiers::CONTROL.union(KeyModifiers::SHIFT);

/// One row of the binding table: key, exact modifiers, action.
pub type Binding = (KeyCode, KeyModifiers, KeyAction);

/// The binding table.
pub const BINDINGS: &[Binding] = &[
    (KeyCode::Tab, NONE, KeyAction::SwitchPane),
    (KeyCode::Delete, NONE, KeyAction::Delete),
    (KeyCode::Backspace, CTRL, KeyAction::Delete),
    (KeyCode::Enter, NONE, KeyAction::Enter),
    (KeyCode::Enter, SHIFT, KeyAction::Rename),
    (KeyCode::Char(' '), NONE, KeyAction::SpaceAction),
    (KeyCode::Char(' '), CTRL, KeyAction::ToggleSpaceMode),
    (KeyCode::Char(' '), SHIFT, KeyAction::ToggleSelection),
    (KeyCode::Char('d'), CTRL, KeyAction::Deselect),
    (KeyCode::Char('a'), CTRL, KeyAction::SelectAll),
    (KeyCode::Char('o'), CTRL, KeyAction::Open),
    (KeyCode::Char('n'), CTRL, KeyAction::NewItem),
    (KeyCode::Char('z'), SHIFT, KeyAction::ToggleSelection),
    (KeyCode::Char('x'), SHIFT, KeyAction::Preview),
    (KeyCode::Char('c'), SHIFT, KeyAction::Rename),
    (KeyCode::Char('v'), SHIFT, KeyAction::Copy),
    (KeyCode::Char('b'), SHIFT, KeyAction::Move),
    (KeyCode::Char('n'), SHIFT, KeyAction::NewItem),
    (KeyCode::Char('m'), SHIFT, KeyAction::Delete),
    (KeyCode::Char(':'), SHIFT, KeyAction::RunInTerminal),
    (KeyCode::Char(':'), NONE, KeyAction::RunInTerminal),
    (KeyCode::Up, NONE, KeyAction::MoveUp),
    (KeyCode::Down, NONE, KeyAction::MoveDown),
    (KeyCode::Left, NONE, KeyAction::MoveLeft),
    (KeyCode::Right, NONE, KeyAction::MoveRight),
    (KeyCode::Up, SHIFT, KeyAction::ExtendUp),
    (KeyCode::Down, SHIFT, KeyAction::ExtendDown),
    (KeyCode::Char('h'), CTRL, KeyAction::ToggleDotfiles),
    (KeyCode::Char('t'), CTRL, KeyAction::NewTab),
    (KeyCode::Char('w'), CTRL, KeyAction::CloseTab),
    (KeyCode::Char('a'), CTRL_SHIFT, KeyAction::Archive),
    (KeyCode::Char('e'), CTRL_SHIFT, KeyAction::Open),
    (KeyCode::Char('u'), CTRL_SHIFT, KeyAction::Upload),
    (KeyCode::Char('s'), CTRL_SHIFT, KeyAction::Download),
    (KeyCode::Char('d'), CTRL_SHIFT, KeyAction::Duplicate),
    (KeyCode::Char('t'), CTRL_SHIFT, KeyAction::OpenShell),
    (KeyCode::Char('g'), CTRL, KeyAction::EditPath),
    (KeyCode::F(1), NONE, KeyAction::Help),
    (KeyCode::Char('?'), NONE, KeyAction::Help),
    (KeyCode::Char('?'), SHIFT, KeyAction::Help),
    (KeyCode::F(2), NONE, KeyAction::Menu),
    (KeyCode::Char('q'), CTRL, KeyAction::Quit),
];

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// All actions bound to `event`, in table order.
pub fn actions_for(event: KeyEvent) -> impl Iterator<Item = KeyAction> {
    matching(BINDINGS, event)
}

/// Every row of `table` bound to `event`, in table order.
fn matching(table: &[Binding], event: KeyEvent) -> impl Iterator<Item = KeyAction> + '_ {
    let code = normalize(event.code);
    let modifiers = event.modifiers;
    table
        .iter()
        .filter(move |(key, mods, _)| *key == code && *mods == modifiers)
        .map(|(_, _, action)| *action)
}

/// A section of key bindings for the help display.
pub struct HelpSection {
    pub title: &'static str,
    pub bindings: Vec<KeyBinding>,
}

/// Key binding for display in help.
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Key bindings organized by section for the help overlay.
pub fn get_help_sections() -> Vec<HelpSection> {
    vec![
        HelpSection {
            title: "Navigation",
            bindings: vec![
                KeyBinding { keys: "↑/↓", description: "Move focus" },
                KeyBinding { keys: "→", description: "Enter directory" },
                KeyBinding { keys: "←", description: "Parent directory" },
                KeyBinding { keys: "Tab", description: "Switch pane" },
                KeyBinding { keys: "Ctrl-g", description: "Edit path" },
                KeyBinding { keys: "a-z 0-9", description: "Jump to name" },
            ],
        },
        HelpSection {
            title: "Selection",
            bindings: vec![
                KeyBinding { keys: "Space", description: "Select or preview" },
                KeyBinding { keys: "Ctrl-Space", description: "Toggle space mode" },
                KeyBinding { keys: "S-Space/Z", description: "Toggle selection" },
                KeyBinding { keys: "S-↑/↓", description: "Extend selection" },
                KeyBinding { keys: "Ctrl-a/d", description: "Select all/none" },
            ],
        },
        HelpSection {
            title: "File Operations",
            bindings: vec![
                KeyBinding { keys: "S-V / S-B", description: "Copy/move to other pane" },
                KeyBinding { keys: "Del / S-M", description: "Delete" },
                KeyBinding { keys: "S-C S-Enter", description: "Rename" },
                KeyBinding { keys: "Ctrl-S-d", description: "Duplicate" },
                KeyBinding { keys: "Ctrl-n / S-N", description: "New folder or file" },
                KeyBinding { keys: "Ctrl-o", description: "Open or extract" },
                KeyBinding { keys: "Ctrl-S-a", description: "Zip selection" },
                KeyBinding { keys: ":", description: "Run in terminal" },
            ],
        },
        HelpSection {
            title: "Views & Transfers",
            bindings: vec![
                KeyBinding { keys: "Enter / S-X", description: "Preview" },
                KeyBinding { keys: "Ctrl-S-t", description: "Open shell" },
                KeyBinding { keys: "Ctrl-S-u", description: "Upload" },
                KeyBinding { keys: "Ctrl-S-s", description: "Download" },
                KeyBinding { keys: "Ctrl-h", description: "Toggle dotfiles" },
                KeyBinding { keys: "Ctrl-t/w", description: "New/close tab" },
                KeyBinding { keys: "F2", description: "Menu" },
                KeyBinding { keys: "Ctrl-q", description: "Quit" },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn actions(code: KeyCode, modifiers: KeyModifiers) -> Vec<KeyAction> {
        actions_for(key_event(code, modifiers)).collect()
    }

    #[test]
    fn test_exact_modifier_match() {
        assert_eq!(actions(KeyCode::Char('a'), CTRL), vec![KeyAction::SelectAll]);
        assert_eq!(actions(KeyCode::Char('a'), CTRL_SHIFT), vec![KeyAction::Archive]);
        assert!(actions(KeyCode::Char('a'), CTRL | KeyModifiers::ALT).is_empty());
        assert!(actions(KeyCode::Char('a'), NONE).is_empty());
    }

    #[test]
    fn test_shifted_letters_match_either_case() {
        assert_eq!(actions(KeyCode::Char('V'), SHIFT), vec![KeyAction::Copy]);
        assert_eq!(actions(KeyCode::Char('v'), SHIFT), vec![KeyAction::Copy]);
        assert!(actions(KeyCode::Char('v'), NONE).is_empty());
    }

    #[test]
    fn test_space_variants() {
        assert_eq!(actions(KeyCode::Char(' '), NONE), vec![KeyAction::SpaceAction]);
        assert_eq!(actions(KeyCode::Char(' '), CTRL), vec![KeyAction::ToggleSpaceMode]);
        assert_eq!(actions(KeyCode::Char(' '), SHIFT), vec![KeyAction::ToggleSelection]);
    }

    #[test]
    fn test_enter_variants() {
        assert_eq!(actions(KeyCode::Enter, NONE), vec![KeyAction::Enter]);
        assert_eq!(actions(KeyCode::Enter, SHIFT), vec![KeyAction::Rename]);
    }

    #[test]
    fn test_repeated_binding_fires_every_row_in_order() {
        const TABLE: &[Binding] = &[
            (KeyCode::Char('d'), CTRL, KeyAction::Deselect),
            (KeyCode::Char('x'), CTRL, KeyAction::Delete),
            (KeyCode::Char('d'), CTRL, KeyAction::Duplicate),
            (KeyCode::Char('d'), SHIFT, KeyAction::Download),
        ];
        let fired: Vec<_> = matching(TABLE, key_event(KeyCode::Char('D'), CTRL)).collect();
        assert_eq!(fired, vec![KeyAction::Deselect, KeyAction::Duplicate]);
        assert!(matching(TABLE, key_event(KeyCode::Char('d'), NONE)).next().is_none());
    }

    #[test]
    fn test_help_sections_not_empty() {
        let sections = get_help_sections();
        assert!(sections.iter().all(|s| !s.bindings.is_empty()));
    }
}
