//! Application state and logic.
//!
//! [`Workbench`] is the synchronous state machine: it owns both panes, the
//! gesture controllers and the overlay slot, turns input into state changes
//! and [`Effect`]s, and folds [`Completion`]s back in. [`App`] drives it
//! from the terminal event loop.

mod commands;
pub(crate) mod constants;
mod effects;
pub mod input;
mod mouse;
mod navigation;
mod overlay;
mod registry;
mod runtime;
pub mod state;

use std::collections::HashMap;
use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, ModifierKeyCode, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::supports_keyboard_enhancement;
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use twinpane_core::{
    ColumnResize, ColumnWidths, Direction, DragEngine, DropAction, FileStore, LoadTicket,
    Modifiers, OverlayStack, Pane, PaneId, PaneTabs, Preferences, RetainedSelection,
    SelectionController, SessionConfig, SpaceMode, TabRegistry, TypeAhead,
};
use twinpane_ops::{discover_userscripts, CommandBuilder, HostPrefix, HostRoot, ShellCommand};

use crate::event::{actions_for, KeyAction};
use crate::theme::Theme;
use crate::ui::{self, HitMap};

use self::constants::TICK_INTERVAL_MS;
use self::input::{InputResult, InputState};
pub use self::effects::{AfterClose, AfterLoad, Completion, Effect, SessionId, Teardown};
pub use self::overlay::{
    MenuOverlay, MessageOverlay, OverlayContent, PreviewOverlay, Prompt, PromptKind,
    TerminalOverlay, UploadOverlay,
};
pub use self::registry::{ActionRegistry, MenuAction, MenuEntry, RegisteredAction};
pub use self::runtime::{Collaborators, EffectRuntime};
pub use self::state::Settings;

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// The dual-pane interaction state machine.
pub struct Workbench {
    panes: [Pane; 2],
    selection: [SelectionController; 2],
    active: PaneId,
    tabs: TabRegistry,
    prefs: Preferences,
    config: SessionConfig,
    commands: CommandBuilder,
    overlay: OverlayStack<OverlayContent, Teardown, AfterClose>,
    drag: DragEngine,
    typeahead: TypeAhead,
    /// Follow-ups per load; only the latest ticket of a pane has an entry.
    follow_ups: HashMap<LoadTicket, Vec<AfterLoad>>,
    /// Selections captured when a terminal operation started.
    retained: [Option<RetainedSelection>; 2],
    /// Path editor, when focused.
    path_input: Option<(PaneId, InputState)>,
    column_widths: [ColumnWidths; 2],
    column_resize: Option<(PaneId, ColumnResize)>,
    space_mode: SpaceMode,
    show_dotfiles: bool,
    /// Computed directory sizes by path.
    folder_sizes: HashMap<String, String>,
    registry: ActionRegistry,
    next_session: SessionId,
    /// Row pressed by the pointer, applied as a click on release.
    pending_click: Option<(PaneId, usize, Modifiers)>,
    last_click: Option<(PaneId, usize, Instant)>,
    last_tab_click: Option<(PaneId, usize, Instant)>,
    status: Option<String>,
    effects: Vec<Effect>,
    quit: bool,
}

impl Workbench {
    /// Create a workbench from persisted preferences.
    ///
    /// Each pane starts at the active tab of its stored tab list, creating
    /// one at the pane's last path when none exists.
    pub fn new(mut prefs: Preferences, config: SessionConfig, commands: CommandBuilder) -> Self {
        let mut tabs = prefs.tab_registry();
        let panes = PaneId::ALL.map(|id| {
            let last = prefs.last_path(id).unwrap_or_else(|| "/".to_string());
            let pane_tabs: &mut PaneTabs = tabs.pane_mut(id);
            pane_tabs.ensure_initialized(&last);
            let path = pane_tabs
                .active_tab()
                .map(|t| t.path.clone())
                .unwrap_or(last);
            let mut pane = Pane::new(id, path);
            let (key, order) = prefs.sort(id);
            pane.set_sort(key, order);
            pane
        });
        let column_widths = PaneId::ALL.map(|id| prefs.column_widths(id));
        let space_mode = prefs.space_mode();
        let show_dotfiles = prefs.show_dotfiles();
        prefs.set_tab_registry(&tabs);

        Self {
            panes,
            selection: [SelectionController::new(), SelectionController::new()],
            active: PaneId::Left,
            tabs,
            prefs,
            drag: DragEngine::new(config.drag_threshold_px),
            typeahead: TypeAhead::new(config.typeahead_timeout()),
            config,
            commands,
            overlay: OverlayStack::new(),
            follow_ups: HashMap::new(),
            retained: [None, None],
            path_input: None,
            column_widths,
            column_resize: None,
            space_mode,
            show_dotfiles,
            folder_sizes: HashMap::new(),
            registry: ActionRegistry::with_defaults(),
            next_session: 1,
            pending_click: None,
            last_click: None,
            last_tab_click: None,
            status: None,
            effects: Vec::new(),
            quit: false,
        }
    }

    /// Load both panes, restoring each active tab's snapshot.
    ///
    /// `initial` overrides the left pane's directory.
    pub fn start(&mut self, initial: Option<&str>) {
        for id in PaneId::ALL {
            let snapshot = self
                .tabs
                .pane(id)
                .and_then(PaneTabs::active_tab)
                .map(|t| t.snapshot.clone())
                .unwrap_or_default();
            self.reload_with(id, vec![AfterLoad::Restore(snapshot)]);
        }
        if let Some(path) = initial {
            self.navigate(PaneId::Left, path);
        }
    }

    /// Effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    // Accessors for the renderer and tests

    pub fn pane(&self, id: PaneId) -> &Pane {
        &self.panes[id.index()]
    }

    pub fn active(&self) -> PaneId {
        self.active
    }

    pub fn tabs(&self, id: PaneId) -> Option<&PaneTabs> {
        self.tabs.pane(id)
    }

    pub fn overlay(&self) -> &OverlayStack<OverlayContent, Teardown, AfterClose> {
        &self.overlay
    }

    pub fn drag(&self) -> &DragEngine {
        &self.drag
    }

    pub fn path_input(&self) -> Option<(PaneId, &InputState)> {
        self.path_input.as_ref().map(|(pane, input)| (*pane, input))
    }

    /// Column widths in percent, following a live resize.
    pub fn column_widths(&self, id: PaneId) -> &ColumnWidths {
        &self.column_widths[id.index()]
    }

    pub fn column_resize(&self, id: PaneId) -> Option<&ColumnResize> {
        match &self.column_resize {
            Some((pane, resize)) if *pane == id => Some(resize),
            _ => None,
        }
    }

    pub fn space_mode(&self) -> SpaceMode {
        self.space_mode
    }

    pub fn show_dotfiles(&self) -> bool {
        self.show_dotfiles
    }

    pub fn folder_size(&self, path: &str) -> Option<&str> {
        self.folder_sizes.get(path).map(String::as_str)
    }

    pub fn typeahead_buffer(&self) -> &str {
        self.typeahead.buffer()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.handle_key_at(key, Instant::now());
    }

    /// Handle a key press at time `now`.
    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) {
        self.drag.set_modifiers(modifiers_of(key.modifiers));
        if key.kind == KeyEventKind::Release {
            if matches!(
                key.code,
                KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift)
            ) {
                self.selection[self.active.index()].release_shift();
            }
            return;
        }
        self.status = None;

        if self.overlay.is_open() {
            self.handle_overlay_key(key);
            return;
        }
        if self.path_input.is_some() {
            self.handle_path_input(key);
            return;
        }
        if let KeyCode::Char(c) = key.code {
            if key.modifiers.is_empty() && TypeAhead::accepts(c) {
                self.type_ahead(c, now);
                return;
            }
        }

        let actions: Vec<KeyAction> = actions_for(key).collect();
        let extends = actions
            .iter()
            .any(|a| matches!(a, KeyAction::ExtendUp | KeyAction::ExtendDown));
        if !extends {
            self.selection[self.active.index()].release_shift();
        }
        for action in actions {
            tracing::trace!(%action, "key action");
            self.dispatch(action);
        }
    }

    fn handle_path_input(&mut self, key: KeyEvent) {
        let Some((pane, input)) = self.path_input.as_mut() else {
            return;
        };
        let pane = *pane;
        match input.handle_key(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.path_input = None,
            InputResult::Submit(value) => {
                self.path_input = None;
                let value = value.trim();
                if value.is_empty() {
                    self.reload(pane);
                } else {
                    self.navigate(pane, value);
                }
            }
        }
    }

    /// Focus the path editor of `pane`.
    pub fn edit_path(&mut self, pane: PaneId) {
        let current = self.panes[pane.index()].current_path().to_string();
        self.activate_pane(pane);
        self.path_input = Some((pane, InputState::with_initial(&current)));
    }

    /// Run one bound action.
    pub fn dispatch(&mut self, action: KeyAction) {
        match action {
            KeyAction::SwitchPane => self.switch_pane(),
            KeyAction::MoveUp => self.move_focus(Direction::Up),
            KeyAction::MoveDown => self.move_focus(Direction::Down),
            KeyAction::MoveLeft => self.go_to_parent(self.active),
            KeyAction::MoveRight => self.enter_focused_directory(),
            KeyAction::ExtendUp => self.extend_selection(Direction::Up),
            KeyAction::ExtendDown => self.extend_selection(Direction::Down),
            KeyAction::EditPath => self.edit_path(self.active),
            KeyAction::SpaceAction => match self.space_mode {
                SpaceMode::Select => self.toggle_focused_selection(),
                SpaceMode::Preview => self.preview_focused(),
            },
            KeyAction::ToggleSpaceMode => {
                self.space_mode = self.space_mode.toggled();
                self.prefs.set_space_mode(self.space_mode);
                self.status = Some(format!("Space: {}", self.space_mode));
            }
            KeyAction::ToggleSelection => self.toggle_focused_selection(),
            KeyAction::SelectAll => self.panes[self.active.index()].select_all(),
            KeyAction::Deselect => self.panes[self.active.index()].deselect_all(),
            KeyAction::Enter | KeyAction::Preview => self.preview_focused(),
            KeyAction::OpenShell => self.open_shell(),
            KeyAction::Help => self.open_help(),
            KeyAction::Menu => self.open_menu(),
            KeyAction::Rename => self.start_rename(),
            KeyAction::Duplicate => self.start_duplicate(),
            KeyAction::NewItem => self.start_new_item(),
            KeyAction::Copy => self.transfer_to_other(DropAction::Copy),
            KeyAction::Move => self.transfer_to_other(DropAction::Move),
            KeyAction::Delete => self.delete(),
            KeyAction::Open => self.open_focused(),
            KeyAction::RunInTerminal => self.run_in_terminal(),
            KeyAction::Archive => self.archive(),
            KeyAction::Upload => self.start_upload(),
            KeyAction::Download => self.download(),
            KeyAction::ToggleDotfiles => self.toggle_dotfiles(),
            KeyAction::NewTab => self.new_tab(),
            KeyAction::CloseTab => self.close_active_tab(),
            KeyAction::Quit => self.quit = true,
        }
    }

    fn toggle_focused_selection(&mut self) {
        let p = &mut self.panes[self.active.index()];
        if let Some(index) = p.focused() {
            p.toggle_selected(index);
        }
    }

    /// Fold a collaborator result back into the state.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Listing { ticket, result } => self.handle_listing(ticket, result),
            Completion::Mutation {
                pane,
                request,
                result,
            } => self.handle_mutation(pane, request, result),
            Completion::Terminal { session, event } => self.handle_terminal_event(session, event),
            Completion::TerminalFailed { session, message } => {
                self.handle_terminal_failure(session, &message)
            }
            Completion::Preview {
                generation,
                content,
            } => self.handle_preview(generation, content),
            Completion::FolderSize(size) => self.handle_folder_size(size),
            Completion::Upload {
                pane,
                target,
                focused,
                outcome,
            } => self.handle_upload(pane, &target, focused, outcome),
            Completion::Download(result) => self.handle_download(result),
            Completion::OverlayGraceElapsed { generation } => {
                self.overlay.clear_content(generation);
            }
            Completion::EditorExited(result) => self.handle_editor_exit(result),
        }
    }
}

fn modifiers_of(modifiers: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        meta: modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        alt: modifiers.contains(KeyModifiers::ALT),
    }
}

/// Main application: the workbench plus the terminal event loop.
pub struct App {
    workbench: Workbench,
    runtime: EffectRuntime,
    completions: mpsc::Receiver<Completion>,
    theme: Theme,
    hit_map: HitMap,
    needs_redraw: bool,
    /// Interactive command to run with the TUI suspended.
    pending_suspend_command: Option<ShellCommand>,
    /// Whether keyboard enhancement flags were pushed.
    keyboard_enhanced: bool,
}

/// Capture the mouse and, where the terminal supports it, ask for
/// disambiguated keys and release events. Returns whether the keyboard
/// flags were pushed.
fn enable_input_modes() -> std::io::Result<bool> {
    crossterm::execute!(stdout(), EnableMouseCapture)?;
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        crossterm::execute!(
            stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }
    tracing::debug!(keyboard_enhanced = enhanced, "input modes enabled");
    Ok(enhanced)
}

fn disable_input_modes(keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = crossterm::execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = crossterm::execute!(stdout(), DisableMouseCapture);
}

impl App {
    /// Build the application from settings. Must run inside a tokio runtime.
    pub fn new(settings: &Settings, initial: Option<String>) -> AppResult<Self> {
        let prefs = match FileStore::default_path().map(FileStore::open) {
            Some(Ok(store)) => Preferences::new(store),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "preferences unavailable, keeping them in memory");
                Preferences::in_memory()
            }
            None => Preferences::in_memory(),
        };

        let root = HostRoot::new(&settings.root);
        let prefix = if settings.host_prefix.is_empty() {
            HostPrefix::new(settings.root.to_string_lossy())
        } else {
            HostPrefix::new(settings.host_prefix.clone())
        };

        let mut workbench = Workbench::new(
            prefs,
            settings.to_session_config(),
            CommandBuilder::new(prefix),
        );
        if let Some(dir) = &settings.userscripts_dir {
            let scripts = discover_userscripts(dir);
            tracing::info!(count = scripts.len(), dir = %dir.display(), "userscripts discovered");
            workbench.registry_mut().register_userscripts(scripts);
        }
        workbench.start(initial.as_deref());

        let collaborators = Collaborators::local(root.clone(), settings.download_dir_or_default());
        let (runtime, completions) = EffectRuntime::new(collaborators, root);

        Ok(Self {
            workbench,
            runtime,
            completions,
            theme: Theme::from_variant(settings.theme),
            hit_map: HitMap::default(),
            needs_redraw: true,
            pending_suspend_command: None,
            keyboard_enhanced: false,
        })
    }

    /// Run the application with async event loop.
    ///
    /// Input modes are enabled for the duration of the loop and always
    /// released on the way out.
    pub async fn run(mut self, terminal: DefaultTerminal) -> AppResult<()> {
        self.keyboard_enhanced = enable_input_modes()?;
        let result = self.event_loop(terminal).await;
        disable_input_modes(self.keyboard_enhanced);
        self.runtime.shutdown();
        result
    }

    async fn event_loop(&mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();

        self.flush_effects();

        while !self.workbench.should_quit() {
            if self.needs_redraw {
                let workbench = &self.workbench;
                let theme = &self.theme;
                let previous = &self.hit_map;
                let mut hit_map = HitMap::default();
                terminal.draw(|frame| {
                    hit_map = HitMap::compute(frame.area(), workbench, previous);
                    ui::render(frame, workbench, &hit_map, theme);
                })?;
                self.hit_map = hit_map;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    self.handle_event(event);
                    self.needs_redraw = true;
                }

                Some(completion) = self.completions.recv() => {
                    self.workbench.apply(completion);
                    self.needs_redraw = true;
                }

                _ = interval.tick() => {}
            }

            self.flush_effects();

            // Interactive commands need the real terminal
            if let Some(command) = self.pending_suspend_command.take() {
                disable_input_modes(self.keyboard_enhanced);
                ratatui::restore();

                let mut cmd = std::process::Command::new("sh");
                cmd.arg("-c").arg(&command.command);
                if let Some(cwd) = &command.cwd {
                    cmd.current_dir(cwd);
                }
                let result = cmd.status().map(|s| s.code()).map_err(|e| e.to_string());

                terminal = ratatui::init();
                self.keyboard_enhanced = enable_input_modes().unwrap_or(false);
                self.workbench.apply(Completion::EditorExited(result));
                self.flush_effects();
                self.needs_redraw = true;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.workbench.handle_key(key),
            Event::Mouse(mouse) => self.workbench.handle_mouse(mouse, &self.hit_map),
            _ => {}
        }
    }

    fn flush_effects(&mut self) {
        for effect in self.workbench.take_effects() {
            match effect {
                Effect::RunEditor { command } => self.pending_suspend_command = Some(command),
                other => self.runtime.execute(other),
            }
        }
    }
}
