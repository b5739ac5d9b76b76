//! Overlay content and overlay key handling.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use twinpane_core::{Direction, Item, OverlayKind, PaneId, SpaceMode};
use twinpane_ops::{CompletionDetector, PreviewContent, PreviewKind};

use super::constants::TERMINAL_SCROLLBACK;
use super::effects::{AfterClose, Effect, SessionId, Teardown};
use super::input::{InputResult, InputState};
use super::registry::MenuEntry;
use super::Workbench;

/// What an open overlay shows.
#[derive(Debug)]
pub enum OverlayContent {
    Message(MessageOverlay),
    Help,
    Menu(MenuOverlay),
    Preview(PreviewOverlay),
    Terminal(TerminalOverlay),
    Editor { path: String },
    Upload(UploadOverlay),
}

impl OverlayContent {
    /// Whether keys go to a text input or list inside the overlay.
    fn captures_keys(&self) -> bool {
        match self {
            OverlayContent::Message(m) => m.prompt.is_some(),
            OverlayContent::Menu(_) | OverlayContent::Terminal(_) | OverlayContent::Upload(_) => {
                true
            }
            OverlayContent::Help | OverlayContent::Preview(_) | OverlayContent::Editor { .. } => {
                false
            }
        }
    }
}

/// A message, optionally with a name prompt.
#[derive(Debug)]
pub struct MessageOverlay {
    pub text: String,
    pub is_error: bool,
    pub prompt: Option<Prompt>,
}

/// Name prompt shown inside a message overlay.
#[derive(Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: InputState,
}

/// What a submitted prompt does.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    Rename { pane: PaneId, source: Item },
    Duplicate { pane: PaneId, source: Item },
    NewItem { pane: PaneId, base: String, as_file: bool },
}

/// Menu of registered actions.
#[derive(Debug)]
pub struct MenuOverlay {
    pub entries: Vec<MenuEntry>,
    pub cursor: usize,
}

/// Preview of one item.
#[derive(Debug)]
pub struct PreviewOverlay {
    pub item: Item,
    pub kind: PreviewKind,
    /// Rendered content; `None` while loading.
    pub content: Option<PreviewContent>,
    /// Ctrl+A selected the text.
    pub text_selected: bool,
    /// Directory size, once computed.
    pub folder_size: Option<String>,
    /// A media player is attached and must be disposed on close.
    pub player_active: bool,
}

/// A terminal session.
#[derive(Debug)]
pub struct TerminalOverlay {
    pub session: SessionId,
    pub title: String,
    pub command: String,
    pub output: String,
    /// Close when the completion marker shows up.
    pub exit_when_done: bool,
    pub(crate) detector: Option<CompletionDetector>,
    /// Run after the marker closed the overlay.
    pub(crate) on_exit: Option<AfterClose>,
    /// Exit code once the process ended.
    pub exited: Option<Option<i32>>,
    pub input: InputState,
}

impl TerminalOverlay {
    /// Append output, dropping the oldest text past the scrollback limit.
    pub fn push_output(&mut self, text: &str) {
        self.output.push_str(text);
        if self.output.len() > TERMINAL_SCROLLBACK {
            let mut cut = self.output.len() - TERMINAL_SCROLLBACK;
            while !self.output.is_char_boundary(cut) {
                cut += 1;
            }
            self.output.drain(..cut);
        }
    }
}

/// Upload queue.
#[derive(Debug)]
pub struct UploadOverlay {
    pub pane: PaneId,
    pub target: String,
    pub input: InputState,
    pub queued: Vec<PathBuf>,
    pub uploading: bool,
}

impl Workbench {
    /// Open an overlay, reporting a busy slot in the status line.
    pub(crate) fn open_overlay(&mut self, kind: OverlayKind, content: OverlayContent) -> Option<u64> {
        match self.overlay.open(kind, content) {
            Ok(generation) => Some(generation),
            Err(e) => {
                self.status = Some(e.to_string());
                None
            }
        }
    }

    /// Show a message.
    ///
    /// An open message is replaced. While another overlay is open the text
    /// goes to the status line instead.
    pub fn show_message(&mut self, text: impl Into<String>, is_error: bool) {
        let text = text.into();
        if is_error {
            tracing::warn!(message = %text, "error shown");
        }
        match self.overlay.active() {
            Some(OverlayKind::Message) => {
                if let Some(content) = self.overlay.content_mut() {
                    *content = OverlayContent::Message(MessageOverlay {
                        text,
                        is_error,
                        prompt: None,
                    });
                }
            }
            Some(_) => self.status = Some(text),
            None => {
                self.open_overlay(
                    OverlayKind::Message,
                    OverlayContent::Message(MessageOverlay {
                        text,
                        is_error,
                        prompt: None,
                    }),
                );
            }
        }
    }

    pub(crate) fn open_prompt(&mut self, title: &str, kind: PromptKind, initial: &str) {
        self.open_overlay(
            OverlayKind::Message,
            OverlayContent::Message(MessageOverlay {
                text: title.to_string(),
                is_error: false,
                prompt: Some(Prompt {
                    kind,
                    input: InputState::with_initial(initial),
                }),
            }),
        );
    }

    /// Close the open overlay.
    ///
    /// Runs the teardown hook, schedules the content clear, then the
    /// opener's closed callback.
    pub fn close_overlay(&mut self) {
        let mut effects = Vec::new();
        let closed = self.overlay.close(|hook, content| match hook {
            Teardown::ReleaseTerminal { session } => {
                effects.push(Effect::StopTerminal { session });
            }
            Teardown::DisposePlayer => {
                if let Some(OverlayContent::Preview(preview)) = content {
                    preview.player_active = false;
                }
            }
        });
        self.effects.extend(effects);

        let Some(closed) = closed else {
            return;
        };
        self.effects.push(Effect::ClearOverlay {
            generation: closed.generation,
            after: self.config.overlay_grace(),
        });
        if let Some(after) = closed.on_closed {
            self.run_after_close(after);
        }
    }

    pub(crate) fn run_after_close(&mut self, after: AfterClose) {
        match after {
            AfterClose::ReplayArrow(direction) => {
                self.move_focus(direction);
                self.preview_focused();
            }
            AfterClose::Refresh { pane, retain } => self.refresh(pane, retain),
        }
    }

    pub(crate) fn handle_overlay_key(&mut self, key: KeyEvent) {
        let captures = self
            .overlay
            .content()
            .is_some_and(OverlayContent::captures_keys);
        if captures {
            self.handle_overlay_input(key);
            return;
        }

        let ctrl_or_meta = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META);
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.close_overlay(),
            KeyCode::Char(' ')
                if key.modifiers.is_empty() && self.space_mode == SpaceMode::Preview =>
            {
                self.close_overlay();
            }
            KeyCode::Up | KeyCode::Down if key.modifiers.is_empty() => {
                let direction = if key.code == KeyCode::Up {
                    Direction::Up
                } else {
                    Direction::Down
                };
                self.overlay.set_on_closed(AfterClose::ReplayArrow(direction));
                self.close_overlay();
            }
            KeyCode::Char('a') | KeyCode::Char('A')
                if ctrl_or_meta && self.overlay.is_visible(OverlayKind::Preview) =>
            {
                if let Some(OverlayContent::Preview(preview)) = self.overlay.content_mut() {
                    preview.text_selected = true;
                }
            }
            _ => {}
        }
    }

    fn handle_overlay_input(&mut self, key: KeyEvent) {
        let Some(content) = self.overlay.content_mut() else {
            return;
        };
        match content {
            OverlayContent::Message(message) => {
                let Some(prompt) = message.prompt.as_mut() else {
                    return;
                };
                if key.code == KeyCode::Tab {
                    if let PromptKind::NewItem { as_file, .. } = &mut prompt.kind {
                        *as_file = !*as_file;
                    }
                    return;
                }
                match prompt.input.handle_key(key) {
                    InputResult::Continue => {}
                    InputResult::Cancel => self.close_overlay(),
                    InputResult::Submit(value) => self.submit_prompt(value),
                }
            }
            OverlayContent::Menu(menu) => match key.code {
                KeyCode::Up => menu.cursor = menu.cursor.saturating_sub(1),
                KeyCode::Down => {
                    if menu.cursor + 1 < menu.entries.len() {
                        menu.cursor += 1;
                    }
                }
                KeyCode::Enter => {
                    let id = menu.entries.get(menu.cursor).map(|e| e.id.clone());
                    self.close_overlay();
                    if let Some(id) = id {
                        self.run_registered(&id);
                    }
                }
                KeyCode::Esc => self.close_overlay(),
                _ => {}
            },
            OverlayContent::Terminal(terminal) => match terminal.input.handle_key(key) {
                InputResult::Continue => {}
                InputResult::Cancel => self.close_overlay(),
                InputResult::Submit(line) => {
                    let session = terminal.session;
                    terminal.push_output(&format!("$ {line}\n"));
                    terminal.input.clear();
                    if terminal.exited.is_none() {
                        self.effects.push(Effect::TerminalInput {
                            session,
                            data: format!("{line}\n"),
                        });
                    }
                }
            },
            OverlayContent::Upload(upload) => {
                if upload.uploading {
                    if key.code == KeyCode::Esc {
                        self.close_overlay();
                    }
                    return;
                }
                match upload.input.handle_key(key) {
                    InputResult::Continue => {}
                    InputResult::Cancel => self.close_overlay(),
                    InputResult::Submit(value) => {
                        let value = value.trim();
                        if !value.is_empty() {
                            upload.queued.push(expand_home(value));
                            upload.input.clear();
                        } else if !upload.queued.is_empty() {
                            upload.uploading = true;
                            let pane = upload.pane;
                            let target = upload.target.clone();
                            let sources = upload.queued.clone();
                            let focused = self.panes[pane.index()]
                                .focused_item()
                                .map(|i| i.path.clone());
                            self.effects.push(Effect::Upload {
                                pane,
                                target,
                                sources,
                                focused,
                            });
                        }
                    }
                }
            }
            OverlayContent::Help
            | OverlayContent::Preview(_)
            | OverlayContent::Editor { .. } => {}
        }
    }

    /// Open the help overlay.
    pub(crate) fn open_help(&mut self) {
        self.open_overlay(OverlayKind::Message, OverlayContent::Help);
    }

    /// Open the action menu.
    pub(crate) fn open_menu(&mut self) {
        let entries = self.registry.menu_entries();
        if entries.is_empty() {
            self.show_message("No actions registered.", false);
            return;
        }
        self.open_overlay(
            OverlayKind::Message,
            OverlayContent::Menu(MenuOverlay { entries, cursor: 0 }),
        );
    }
}

fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    }
}
