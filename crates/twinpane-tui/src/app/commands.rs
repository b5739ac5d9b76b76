//! File operations: prompts, mutations, terminal commands and transfers.

use twinpane_core::{path, DropAction, Item, OverlayKind, PaneId, PaneStatus, PreconditionError};
use twinpane_ops::{
    duplicate_name, is_archive, validate_filename, CompletionMarker, MutationRequest,
    PreviewKind, ShellCommand, TerminalEvent, TerminalLaunch, UploadOutcome,
};

use super::constants::NEW_ITEM_DEFAULT_NAME;
use super::effects::{AfterClose, AfterLoad, Effect, SessionId, Teardown};
use super::input::InputState;
use super::overlay::{OverlayContent, PreviewOverlay, PromptKind, TerminalOverlay, UploadOverlay};
use super::registry::MenuAction;
use super::Workbench;

impl Workbench {
    /// Selected rows, or the focused row, refusing the parent marker.
    fn operands(&self, pane: PaneId, operation: &'static str) -> Result<Vec<Item>, PreconditionError> {
        let items = self.panes[pane.index()].selection_or_focused();
        if items.is_empty() {
            return Err(PreconditionError::NothingSelected);
        }
        if items.iter().any(|i| i.is_parent_marker()) {
            return Err(PreconditionError::ParentMarker { operation });
        }
        Ok(items.into_iter().cloned().collect())
    }

    /// First selected row, else the focused row.
    fn single_operand(&self, pane: PaneId, operation: &'static str) -> Result<Item, PreconditionError> {
        let p = &self.panes[pane.index()];
        let item = p
            .selected_items()
            .first()
            .copied()
            .or_else(|| p.focused_item())
            .ok_or(PreconditionError::NoFocusedItem)?;
        if item.is_parent_marker() {
            return Err(PreconditionError::ParentMarker { operation });
        }
        Ok(item.clone())
    }

    fn require_directory(&self, pane: PaneId) -> Result<String, PreconditionError> {
        let p = &self.panes[pane.index()];
        match p.status() {
            PaneStatus::Ready => Ok(p.current_path().to_string()),
            _ => Err(PreconditionError::NoDirectory),
        }
    }

    pub(crate) fn report(&mut self, result: Result<(), PreconditionError>) {
        if let Err(e) = result {
            self.show_message(e.to_string(), true);
        }
    }

    // Terminal-backed operations

    /// Open the terminal overlay and start `command` in it.
    ///
    /// Commands that exit when done are wrapped with a completion marker;
    /// when the marker is seen the overlay closes and `on_exit` runs.
    pub(crate) fn open_terminal(&mut self, title: &str, command: ShellCommand, on_exit: Option<AfterClose>) {
        let session: SessionId = self.next_session;
        self.next_session += 1;

        let (line, detector) = if command.exit_when_done && !command.command.is_empty() {
            let marker = CompletionMarker::new();
            match marker.detector() {
                Ok(detector) => (marker.wrap(&command.command), Some(detector)),
                Err(e) => {
                    tracing::warn!(target: "terminal", error = %e, "completion marker unavailable");
                    (command.command.clone(), None)
                }
            }
        } else {
            (command.command.clone(), None)
        };

        let content = OverlayContent::Terminal(TerminalOverlay {
            session,
            title: title.to_string(),
            command: command.command.clone(),
            output: String::new(),
            exit_when_done: command.exit_when_done,
            detector,
            on_exit,
            exited: None,
            input: InputState::new(),
        });
        if self.open_overlay(OverlayKind::Terminal, content).is_none() {
            return;
        }
        self.overlay
            .register_teardown(OverlayKind::Terminal, Teardown::ReleaseTerminal { session });
        self.effects.push(Effect::StartTerminal {
            session,
            launch: TerminalLaunch {
                command: line,
                cwd: command.cwd,
            },
        });
    }

    /// Copy or move items into `destination` through the terminal.
    pub fn transfer(&mut self, action: DropAction, items: &[Item], destination: &str) {
        if items.iter().any(Item::is_parent_marker) {
            self.report(Err(PreconditionError::ParentMarker {
                operation: action.verb(),
            }));
            return;
        }
        if items.is_empty() {
            self.report(Err(PreconditionError::NothingSelected));
            return;
        }
        self.retain_current();
        let sources = items.iter().map(|i| i.path.as_str());
        let (title, command) = match action {
            DropAction::Copy => ("Copy", self.commands.copy(sources, destination)),
            DropAction::Move => ("Move", self.commands.move_to(sources, destination)),
        };
        tracing::info!(action = action.verb(), count = items.len(), destination, "transfer");
        self.open_terminal(
            title,
            command,
            Some(AfterClose::Refresh {
                pane: None,
                retain: true,
            }),
        );
    }

    /// Copy or move the operands of the active pane into the other pane.
    pub(crate) fn transfer_to_other(&mut self, action: DropAction) {
        let result = self.operands(self.active, action.verb()).map(|items| {
            let destination = self.panes[self.active.other().index()]
                .current_path()
                .to_string();
            self.transfer(action, &items, &destination);
        });
        self.report(result);
    }

    pub(crate) fn delete(&mut self) {
        let pane = self.active;
        let result = self.operands(pane, "delete").map(|items| {
            self.retain_current();
            let command = self.commands.delete(items.iter().map(|i| i.path.as_str()));
            self.open_terminal("Delete", command, Some(refresh_one(pane)));
        });
        self.report(result);
    }

    pub(crate) fn archive(&mut self) {
        let pane = self.active;
        let result = self.require_directory(pane).and_then(|cwd| {
            let items = self.operands(pane, "archive")?;
            self.retain_current();
            let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
            let command = self.commands.archive(&cwd, &names);
            self.open_terminal("Archive", command, Some(refresh_one(pane)));
            Ok(())
        });
        self.report(result);
    }

    /// Run the first non-parent operand in the terminal.
    pub(crate) fn run_in_terminal(&mut self) {
        let pane = self.active;
        let result = self.require_directory(pane).and_then(|cwd| {
            let p = &self.panes[pane.index()];
            let target = p
                .selection_or_focused()
                .into_iter()
                .find(|i| !i.is_parent_marker())
                .map(|i| i.name.to_string())
                .ok_or(PreconditionError::NoFocusedItem)?;
            self.retain_current();
            let command = self.commands.run(&cwd, &target);
            self.open_terminal(&format!("Run {target}"), command, Some(refresh_one(pane)));
            Ok(())
        });
        self.report(result);
    }

    /// Open the focused item: enter directories, extract archives, edit
    /// anything else.
    pub(crate) fn open_focused(&mut self) {
        let pane = self.active;
        let Some(item) = self.panes[pane.index()].focused_item().cloned() else {
            self.report(Err(PreconditionError::NoFocusedItem));
            return;
        };
        if item.is_parent_marker() {
            self.go_to_parent(pane);
        } else if item.is_dir() {
            self.navigate(pane, &item.path);
        } else if is_archive(&item.name) {
            self.retain_current();
            let command = self.commands.extract(&item.path);
            self.open_terminal(&format!("Extract {}", item.name), command, Some(refresh_one(pane)));
        } else {
            let command = self.commands.edit(&item.path);
            if self
                .open_overlay(OverlayKind::TextEditor, OverlayContent::Editor { path: item.path })
                .is_some()
            {
                self.effects.push(Effect::RunEditor { command });
            }
        }
    }

    pub(crate) fn open_shell(&mut self) {
        let cwd = self.panes[self.active.index()].current_path().to_string();
        let command = self.commands.shell(&cwd);
        self.open_terminal("Shell", command, None);
    }

    /// Run a registered menu action.
    pub(crate) fn run_registered(&mut self, id: &str) {
        let Some(registered) = self.registry.get(id).cloned() else {
            tracing::warn!(id, "unknown action");
            return;
        };
        match registered.action {
            MenuAction::Key(action) => self.dispatch(action),
            MenuAction::Userscript(script) => {
                let pane = self.active;
                let p = &self.panes[pane.index()];
                let cwd = p.current_path().to_string();
                let focused = p
                    .focused_item()
                    .filter(|i| !i.is_parent_marker())
                    .map(|i| i.name.to_string());
                self.retain_current();
                let command = self.commands.userscript(&script.path, &cwd, focused.as_deref());
                self.open_terminal(&script.id, command, Some(refresh_one(pane)));
            }
        }
    }

    pub(crate) fn handle_terminal_event(&mut self, session: SessionId, event: TerminalEvent) {
        let Some(OverlayContent::Terminal(terminal)) = self.overlay.content_mut() else {
            return;
        };
        if terminal.session != session {
            return;
        }
        match event {
            TerminalEvent::Connected => {
                tracing::debug!(target: "terminal", session, "connected");
            }
            TerminalEvent::Output(text) => {
                terminal.push_output(&text);
                let done = terminal.exit_when_done
                    && terminal.detector.as_mut().is_some_and(|d| d.feed(&text));
                if done {
                    let on_exit = terminal.on_exit.take();
                    tracing::info!(target: "terminal", session, "command completed");
                    self.close_overlay();
                    if let Some(after) = on_exit {
                        self.run_after_close(after);
                    }
                }
            }
            TerminalEvent::Exited(code) => {
                terminal.exited = Some(code);
                match code {
                    Some(code) => terminal.push_output(&format!("\n[process exited with code {code}]\n")),
                    None => terminal.push_output("\n[process ended]\n"),
                }
            }
        }
    }

    pub(crate) fn handle_terminal_failure(&mut self, session: SessionId, message: &str) {
        tracing::error!(target: "terminal", session, error = %message, "terminal failed");
        match self.overlay.content_mut() {
            Some(OverlayContent::Terminal(terminal)) if terminal.session == session => {
                terminal.push_output(&format!("Terminal error: {message}\n"));
                terminal.exited = Some(None);
            }
            _ => self.status = Some(format!("Terminal error: {message}")),
        }
    }

    // Prompts and single-item mutations

    pub(crate) fn start_rename(&mut self) {
        let pane = self.active;
        match self.single_operand(pane, "rename") {
            Ok(source) => {
                let name = source.name.to_string();
                self.open_prompt("Rename", PromptKind::Rename { pane, source }, &name);
            }
            Err(e) => self.report(Err(e)),
        }
    }

    pub(crate) fn start_duplicate(&mut self) {
        let pane = self.active;
        match self.single_operand(pane, "duplicate") {
            Ok(source) => {
                let name = duplicate_name(&source.name);
                self.open_prompt("Duplicate as", PromptKind::Duplicate { pane, source }, &name);
            }
            Err(e) => self.report(Err(e)),
        }
    }

    pub(crate) fn start_new_item(&mut self) {
        let pane = self.active;
        match self.require_directory(pane) {
            Ok(base) => self.open_prompt(
                "New",
                PromptKind::NewItem {
                    pane,
                    base,
                    as_file: false,
                },
                NEW_ITEM_DEFAULT_NAME,
            ),
            Err(e) => self.report(Err(e)),
        }
    }

    /// Submit the open prompt. Invalid names keep the prompt open.
    pub(crate) fn submit_prompt(&mut self, value: String) {
        let name = value.trim().to_string();
        let Some(OverlayContent::Message(message)) = self.overlay.content_mut() else {
            return;
        };
        let Some(prompt) = message.prompt.as_mut() else {
            return;
        };

        if let PromptKind::Rename { source, .. } = &prompt.kind {
            if name.is_empty() || name == source.name.as_str() {
                self.close_overlay();
                return;
            }
        }
        if let Err(reason) = validate_filename(&name) {
            prompt.input.set_error(reason);
            return;
        }

        let kind = prompt.kind.clone();
        self.close_overlay();

        let (pane, request) = match kind {
            PromptKind::Rename { pane, source } => {
                let destination = path::join(&path::parent(&source.path), &name);
                (
                    pane,
                    MutationRequest::Rename {
                        source: source.path,
                        destination,
                    },
                )
            }
            PromptKind::Duplicate { pane, source } => {
                let destination = path::join(&path::parent(&source.path), &name);
                (
                    pane,
                    MutationRequest::Duplicate {
                        source: source.path,
                        destination,
                    },
                )
            }
            PromptKind::NewItem { pane, base, as_file } => {
                let target = path::join(&base, &name);
                let request = if as_file {
                    MutationRequest::CreateFile { path: target }
                } else {
                    MutationRequest::CreateDirectory { path: target }
                };
                (pane, request)
            }
        };
        tracing::info!(verb = request.verb(), path = request.result_path(), "mutation requested");
        self.effects.push(Effect::Mutate { pane, request });
    }

    pub(crate) fn handle_mutation(
        &mut self,
        pane: PaneId,
        request: MutationRequest,
        result: Result<String, String>,
    ) {
        let created = match result {
            Ok(created) => created,
            Err(e) => {
                self.show_message(format!("{} failed: {e}", capitalize(request.verb())), true);
                return;
            }
        };
        match request {
            MutationRequest::Rename { source, .. } => {
                self.retain_current();
                for retained in self.retained.iter_mut().flatten() {
                    retained.rebase(&source, &created);
                }
                self.refresh(None, true);
            }
            MutationRequest::Duplicate { .. }
            | MutationRequest::CreateDirectory { .. }
            | MutationRequest::CreateFile { .. } => {
                self.reload_with(pane, vec![AfterLoad::FocusPath(created)]);
            }
        }
    }

    // Preview

    /// Preview the focused row of the active pane.
    pub(crate) fn preview_focused(&mut self) {
        let Some(item) = self.panes[self.active.index()].focused_item().cloned() else {
            return;
        };
        if item.is_parent_marker() {
            return;
        }
        let kind = PreviewKind::classify(&item);
        let folder_size = self.folder_sizes.get(&item.path).cloned();
        let content = OverlayContent::Preview(PreviewOverlay {
            item: item.clone(),
            kind,
            content: None,
            text_selected: false,
            folder_size: folder_size.clone(),
            player_active: kind.has_player(),
        });
        let Some(generation) = self.open_overlay(OverlayKind::Preview, content) else {
            return;
        };
        if kind.has_player() {
            self.overlay
                .register_teardown(OverlayKind::Preview, Teardown::DisposePlayer);
        }
        if item.is_dir() && folder_size.is_none() {
            self.effects.push(Effect::FolderSize {
                path: item.path.clone(),
            });
        }
        self.effects.push(Effect::LoadPreview { generation, item });
    }

    pub(crate) fn handle_preview(&mut self, generation: u64, content: twinpane_ops::PreviewContent) {
        if self.overlay.active() != Some(OverlayKind::Preview) || self.overlay.generation() != generation {
            tracing::debug!(generation, "discarding stale preview");
            return;
        }
        if let Some(OverlayContent::Preview(preview)) = self.overlay.content_mut() {
            preview.content = Some(content);
        }
    }

    pub(crate) fn handle_folder_size(&mut self, size: twinpane_ops::FolderSize) {
        let display = size.display();
        if let Some(OverlayContent::Preview(preview)) = self.overlay.content_mut() {
            if preview.item.path == size.path {
                preview.folder_size = Some(display.clone());
            }
        }
        self.folder_sizes.insert(size.path, display);
    }

    // Transfers

    pub(crate) fn start_upload(&mut self) {
        let pane = self.active;
        match self.require_directory(pane) {
            Ok(target) => {
                self.open_overlay(
                    OverlayKind::Upload,
                    OverlayContent::Upload(UploadOverlay {
                        pane,
                        target,
                        input: InputState::new(),
                        queued: Vec::new(),
                        uploading: false,
                    }),
                );
            }
            Err(e) => self.report(Err(e)),
        }
    }

    pub(crate) fn handle_upload(
        &mut self,
        pane: PaneId,
        target: &str,
        focused: Option<String>,
        outcome: UploadOutcome,
    ) {
        let idx = pane.index();
        tracing::info!(saved = outcome.saved.len(), failed = outcome.failed.len(), target, "upload finished");

        if self.overlay.active() == Some(OverlayKind::Upload) {
            self.close_overlay();
            if self.panes[idx].current_path() == target {
                let follow_ups = match outcome.saved.as_slice() {
                    [] => Vec::new(),
                    [single] => vec![AfterLoad::FocusPath(single.clone())],
                    many => vec![AfterLoad::SelectPaths(many.to_vec())],
                };
                self.reload_with(pane, follow_ups);
            }
        } else {
            let unchanged = self.panes[idx].focused_item().map(|i| i.path.clone()) == focused;
            if unchanged {
                self.reload_retaining(pane);
            }
        }

        if !outcome.failed.is_empty() {
            let text = outcome
                .failed
                .iter()
                .map(|(name, reason)| format!("Upload failed: {reason} ({name})"))
                .collect::<Vec<_>>()
                .join("\n");
            self.show_message(text, true);
        }
    }

    pub(crate) fn download(&mut self) {
        let focused = self.panes[self.active.index()]
            .focused_item()
            .filter(|i| i.is_file())
            .map(|i| i.path.clone());
        match focused {
            Some(path) => self.effects.push(Effect::Download { path }),
            None => self.report(Err(PreconditionError::NoFocusedFile)),
        }
    }

    pub(crate) fn handle_download(&mut self, result: Result<std::path::PathBuf, String>) {
        match result {
            Ok(saved) => self.status = Some(format!("Downloaded to {}", saved.display())),
            Err(e) => self.show_message(format!("Download failed: {e}"), true),
        }
    }

    pub(crate) fn handle_editor_exit(&mut self, result: Result<Option<i32>, String>) {
        if self.overlay.active() == Some(OverlayKind::TextEditor) {
            self.close_overlay();
        }
        match result {
            Ok(code) => {
                tracing::debug!(?code, "editor exited");
                self.reload_retaining(self.active);
            }
            Err(e) => self.show_message(format!("Editor failed: {e}"), true),
        }
    }
}

fn refresh_one(pane: PaneId) -> AfterClose {
    AfterClose::Refresh {
        pane: Some(pane),
        retain: true,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("rename"), "Rename");
        assert_eq!(capitalize(""), "");
    }
}
