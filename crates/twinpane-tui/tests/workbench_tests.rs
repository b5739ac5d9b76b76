//! Integration tests for the workbench state machine.
//!
//! The workbench is driven with synthetic keys, mouse events and
//! completions; effects are inspected instead of executed.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;

use twinpane_core::{Item, LoadTicket, OverlayKind, PaneId, PaneStatus, Preferences, SessionConfig};
use twinpane_ops::{
    CommandBuilder, HostPrefix, ListResponse, MutationRequest, TerminalEvent, UploadOutcome,
};
use twinpane_tui::app::{Completion, Effect, OverlayContent};
use twinpane_tui::ui::HitMap;
use twinpane_tui::Workbench;

fn workbench() -> Workbench {
    Workbench::new(
        Preferences::in_memory(),
        SessionConfig::default(),
        CommandBuilder::new(HostPrefix::new("")),
    )
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn key_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn press(wb: &mut Workbench, event: KeyEvent) {
    wb.handle_key_at(event, Instant::now());
}

fn type_text(wb: &mut Workbench, text: &str) {
    for c in text.chars() {
        press(wb, key(KeyCode::Char(c)));
    }
}

fn home_items() -> Vec<Item> {
    vec![
        Item::parent_marker("/"),
        Item::directory("docs", "/home/docs"),
        Item::file("a.txt", "/home/a.txt"),
        Item::file("b.txt", "/home/b.txt"),
    ]
}

fn fetches(effects: &[Effect]) -> Vec<(LoadTicket, String)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Fetch { ticket, request } => Some((*ticket, request.path.clone())),
            _ => None,
        })
        .collect()
}

/// Answer every pending fetch for `pane` with `items` at `path`.
fn answer(wb: &mut Workbench, effects: &[Effect], pane: PaneId, path: &str, items: Vec<Item>) {
    for (ticket, _) in fetches(effects).into_iter().filter(|(t, _)| t.pane == pane) {
        wb.apply(Completion::Listing {
            ticket,
            result: Ok(ListResponse::Directory {
                current_path: path.to_string(),
                items: items.clone(),
            }),
        });
    }
}

/// A workbench with the left pane at `/home` and the right one at `/srv`.
fn loaded() -> Workbench {
    let mut wb = workbench();
    wb.start(Some("/home"));
    let effects = wb.take_effects();
    answer(&mut wb, &effects, PaneId::Left, "/home", home_items());
    answer(
        &mut wb,
        &effects,
        PaneId::Right,
        "/srv",
        vec![Item::parent_marker("/")],
    );
    wb
}

fn message_text(wb: &Workbench) -> Option<String> {
    match wb.overlay().content() {
        Some(OverlayContent::Message(message)) => Some(message.text.clone()),
        _ => None,
    }
}

#[test]
fn test_start_fetches_both_panes() {
    let mut wb = workbench();
    wb.start(None);
    let effects = wb.take_effects();
    let fetched = fetches(&effects);
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().any(|(t, _)| t.pane == PaneId::Left));
    assert!(fetched.iter().any(|(t, _)| t.pane == PaneId::Right));
    assert!(matches!(wb.pane(PaneId::Left).status(), PaneStatus::Loading));
}

#[test]
fn test_stale_listing_is_discarded() {
    let mut wb = workbench();
    wb.start(None);
    let first = wb.take_effects();
    wb.navigate(PaneId::Left, "/home");
    let second = wb.take_effects();

    answer(&mut wb, &first, PaneId::Left, "/", vec![Item::directory("home", "/home")]);
    assert!(matches!(wb.pane(PaneId::Left).status(), PaneStatus::Loading));
    assert_eq!(wb.pane(PaneId::Left).current_path(), "/home");

    answer(&mut wb, &second, PaneId::Left, "/home", home_items());
    assert!(matches!(wb.pane(PaneId::Left).status(), PaneStatus::Ready));
    assert_eq!(wb.pane(PaneId::Left).len(), 4);
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(0));
}

#[test]
fn test_listing_error_is_shown_in_pane() {
    let mut wb = workbench();
    wb.start(None);
    let effects = wb.take_effects();
    for (ticket, _) in fetches(&effects) {
        wb.apply(Completion::Listing {
            ticket,
            result: Ok(ListResponse::Error("Permission denied: /".to_string())),
        });
    }
    assert_eq!(
        wb.pane(PaneId::Left).status(),
        &PaneStatus::Error("Permission denied: /".to_string())
    );
}

#[test]
fn test_type_ahead_focuses_match() {
    let mut wb = loaded();
    type_text(&mut wb, "b");
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(3));
    assert_eq!(wb.typeahead_buffer(), "b");
}

#[test]
fn test_rename_prompt_emits_mutation() {
    let mut wb = loaded();
    type_text(&mut wb, "a");
    press(&mut wb, key_with(KeyCode::Enter, KeyModifiers::SHIFT));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Message));

    press(&mut wb, key_with(KeyCode::Char('u'), KeyModifiers::CONTROL));
    type_text(&mut wb, "c.md");
    press(&mut wb, key(KeyCode::Enter));

    assert!(!wb.overlay().is_open());
    let effects = wb.take_effects();
    assert!(effects.contains(&Effect::Mutate {
        pane: PaneId::Left,
        request: MutationRequest::Rename {
            source: "/home/a.txt".to_string(),
            destination: "/home/c.md".to_string(),
        },
    }));

    wb.apply(Completion::Mutation {
        pane: PaneId::Left,
        request: MutationRequest::Rename {
            source: "/home/a.txt".to_string(),
            destination: "/home/c.md".to_string(),
        },
        result: Ok("/home/c.md".to_string()),
    });
    assert_eq!(fetches(&wb.take_effects()).len(), 2);
}

#[test]
fn test_invalid_name_keeps_prompt_open() {
    let mut wb = loaded();
    press(&mut wb, key_with(KeyCode::Char('n'), KeyModifiers::CONTROL));
    press(&mut wb, key_with(KeyCode::Char('u'), KeyModifiers::CONTROL));
    type_text(&mut wb, "a/b");
    press(&mut wb, key(KeyCode::Enter));

    assert!(wb.overlay().is_open());
    match wb.overlay().content() {
        Some(OverlayContent::Message(message)) => {
            let prompt = message.prompt.as_ref().unwrap();
            assert!(prompt.input.error().is_some());
        }
        other => panic!("expected prompt, got {other:?}"),
    }
    assert!(!wb
        .take_effects()
        .iter()
        .any(|e| matches!(e, Effect::Mutate { .. })));
}

#[test]
fn test_mutation_failure_shows_error() {
    let mut wb = loaded();
    wb.apply(Completion::Mutation {
        pane: PaneId::Left,
        request: MutationRequest::CreateDirectory {
            path: "/home/docs".to_string(),
        },
        result: Err("already exists".to_string()),
    });
    assert_eq!(
        message_text(&wb).as_deref(),
        Some("Create directory failed: already exists")
    );
}

#[test]
fn test_parent_marker_refused() {
    let mut wb = loaded();
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(0));
    press(&mut wb, key(KeyCode::Delete));
    assert_eq!(
        message_text(&wb).as_deref(),
        Some("Cannot delete the parent directory (..)")
    );
    assert!(!wb
        .take_effects()
        .iter()
        .any(|e| matches!(e, Effect::StartTerminal { .. })));
}

#[test]
fn test_escape_closes_overlay_and_schedules_clear() {
    let mut wb = loaded();
    press(&mut wb, key(KeyCode::F(1)));
    assert!(wb.overlay().is_open());
    wb.take_effects();

    press(&mut wb, key(KeyCode::Esc));
    assert!(!wb.overlay().is_open());
    let effects = wb.take_effects();
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::ClearOverlay { after, .. } if *after == SessionConfig::default().overlay_grace()
    )));
}

#[test]
fn test_arrow_in_preview_moves_and_previews_next() {
    let mut wb = loaded();
    type_text(&mut wb, "a");
    press(&mut wb, key_with(KeyCode::Char('X'), KeyModifiers::SHIFT));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Preview));
    wb.take_effects();

    press(&mut wb, key(KeyCode::Down));
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(3));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Preview));
    let effects = wb.take_effects();
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::LoadPreview { item, .. } if item.path == "/home/b.txt"
    )));
}

#[test]
fn test_terminal_marker_closes_overlay_and_refreshes() {
    let mut wb = loaded();
    type_text(&mut wb, "a");
    press(&mut wb, key_with(KeyCode::Char('V'), KeyModifiers::SHIFT));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Terminal));

    let effects = wb.take_effects();
    let (session, command) = effects
        .iter()
        .find_map(|e| match e {
            Effect::StartTerminal { session, launch } => Some((*session, launch.command.clone())),
            _ => None,
        })
        .unwrap();
    assert!(command.starts_with("cp -aiv"));
    let token = command
        .rsplit_once("echo \"")
        .map(|(_, rest)| rest.trim_end_matches('"').to_string())
        .unwrap();

    // The echoed command line never completes the command
    wb.apply(Completion::Terminal {
        session,
        event: TerminalEvent::Output(format!("$ {command}\r\n")),
    });
    assert!(wb.overlay().is_open());

    wb.apply(Completion::Terminal {
        session,
        event: TerminalEvent::Output(format!("'/home/a.txt' -> '/srv/a.txt'\r\n{token}\r\n")),
    });
    assert!(!wb.overlay().is_open());
    let effects = wb.take_effects();
    assert!(effects.contains(&Effect::StopTerminal { session }));
    assert_eq!(fetches(&effects).len(), 2);
}

#[test]
fn test_terminal_output_for_other_session_ignored() {
    let mut wb = loaded();
    press(&mut wb, key_with(KeyCode::Char('t'), KeyModifiers::CONTROL | KeyModifiers::SHIFT));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Terminal));
    wb.apply(Completion::Terminal {
        session: 999,
        event: TerminalEvent::Output("stray".to_string()),
    });
    match wb.overlay().content() {
        Some(OverlayContent::Terminal(terminal)) => assert!(terminal.output.is_empty()),
        other => panic!("expected terminal, got {other:?}"),
    }
}

#[test]
fn test_upload_queue_and_completion() {
    let mut wb = loaded();
    press(&mut wb, key_with(KeyCode::Char('U'), KeyModifiers::CONTROL | KeyModifiers::SHIFT));
    assert_eq!(wb.overlay().active(), Some(OverlayKind::Upload));

    type_text(&mut wb, "/tmp/x.txt");
    press(&mut wb, key(KeyCode::Enter));
    press(&mut wb, key(KeyCode::Enter));

    let effects = wb.take_effects();
    let upload = effects
        .iter()
        .find_map(|e| match e {
            Effect::Upload { target, sources, .. } => Some((target.clone(), sources.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(upload.0, "/home");
    assert_eq!(upload.1, vec![std::path::PathBuf::from("/tmp/x.txt")]);

    wb.apply(Completion::Upload {
        pane: PaneId::Left,
        target: "/home".to_string(),
        focused: None,
        outcome: UploadOutcome {
            saved: vec!["/home/x.txt".to_string()],
            failed: Vec::new(),
        },
    });
    assert!(!wb.overlay().is_open());
    let effects = wb.take_effects();
    let reloads = fetches(&effects);
    assert_eq!(reloads.len(), 1);

    let mut items = home_items();
    items.push(Item::file("x.txt", "/home/x.txt"));
    answer(&mut wb, &effects, PaneId::Left, "/home", items);
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(4));
}

#[test]
fn test_new_and_close_tab() {
    let mut wb = loaded();
    assert_eq!(wb.tabs(PaneId::Left).map(|t| t.len()), Some(1));

    press(&mut wb, key_with(KeyCode::Char('t'), KeyModifiers::CONTROL));
    assert_eq!(wb.tabs(PaneId::Left).map(|t| t.len()), Some(2));
    assert_eq!(wb.tabs(PaneId::Left).map(|t| t.active), Some(1));
    assert_eq!(fetches(&wb.take_effects()).len(), 1);

    press(&mut wb, key_with(KeyCode::Char('w'), KeyModifiers::CONTROL));
    assert_eq!(wb.tabs(PaneId::Left).map(|t| t.len()), Some(1));
}

#[test]
fn test_switch_pane_and_parent_navigation() {
    let mut wb = loaded();
    press(&mut wb, key(KeyCode::Tab));
    assert_eq!(wb.active(), PaneId::Right);
    press(&mut wb, key(KeyCode::Tab));
    assert_eq!(wb.active(), PaneId::Left);

    press(&mut wb, key(KeyCode::Left));
    let effects = wb.take_effects();
    assert_eq!(
        fetches(&effects).iter().map(|(_, p)| p.as_str()).collect::<Vec<_>>(),
        vec!["/"]
    );
    answer(
        &mut wb,
        &effects,
        PaneId::Left,
        "/",
        vec![Item::directory("etc", "/etc"), Item::directory("home", "/home")],
    );
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(1));
}

#[test]
fn test_follow_ups_stay_with_their_load() {
    let mut wb = loaded();
    press(&mut wb, key(KeyCode::Left));
    let to_parent = wb.take_effects();
    let reloaded = wb.reload(PaneId::Left);
    let again = wb.take_effects();
    assert_eq!(fetches(&again), vec![(reloaded, "/".to_string())]);

    let root = vec![Item::directory("etc", "/etc"), Item::directory("home", "/home")];
    answer(&mut wb, &to_parent, PaneId::Left, "/", root.clone());
    assert!(matches!(wb.pane(PaneId::Left).status(), PaneStatus::Loading));

    // The newer load carries no "focus home" follow-up.
    answer(&mut wb, &again, PaneId::Left, "/", root.clone());
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(0));

    // Nothing left over for a later load either.
    wb.reload(PaneId::Left);
    let later = wb.take_effects();
    answer(&mut wb, &later, PaneId::Left, "/", root);
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(0));
}

fn selected(wb: &Workbench, pane: PaneId) -> Vec<usize> {
    wb.pane(pane).selected_indices().collect()
}

#[test]
fn test_shift_arrow_gesture_continues_while_shift_held() {
    let mut wb = loaded();
    press(&mut wb, key(KeyCode::Down));
    press(&mut wb, key_with(KeyCode::Down, KeyModifiers::SHIFT));
    assert_eq!(selected(&wb, PaneId::Left), vec![1, 2]);

    // Same gesture: shrinking back to the anchor restores the baseline.
    press(&mut wb, key_with(KeyCode::Up, KeyModifiers::SHIFT));
    assert_eq!(selected(&wb, PaneId::Left), vec![1]);
}

#[test]
fn test_shift_release_starts_new_gesture() {
    let mut wb = loaded();
    press(&mut wb, key(KeyCode::Down));
    press(&mut wb, key_with(KeyCode::Down, KeyModifiers::SHIFT));
    assert_eq!(selected(&wb, PaneId::Left), vec![1, 2]);

    press(
        &mut wb,
        KeyEvent::new_with_kind(
            KeyCode::Modifier(ModifierKeyCode::LeftShift),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ),
    );

    // Anchored at the selected focus row, the new gesture deselects.
    press(&mut wb, key_with(KeyCode::Up, KeyModifiers::SHIFT));
    assert!(selected(&wb, PaneId::Left).is_empty());
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(1));
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn test_drag_row_to_other_pane_copies() {
    let mut wb = loaded();
    let hit = HitMap::compute(Rect::new(0, 0, 100, 30), &wb, &HitMap::default());
    wb.take_effects();

    // Rows start below the border, tab bar, path line and column header
    let now = Instant::now();
    wb.handle_mouse_at(mouse(MouseEventKind::Down(MouseButton::Left), 10, 7), &hit, now);
    wb.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), 40, 12), &hit, now);
    wb.handle_mouse_at(mouse(MouseEventKind::Drag(MouseButton::Left), 70, 20), &hit, now);
    assert!(wb.drag().is_dragging());
    wb.handle_mouse_at(mouse(MouseEventKind::Up(MouseButton::Left), 70, 20), &hit, now);

    assert_eq!(wb.overlay().active(), Some(OverlayKind::Terminal));
    let effects = wb.take_effects();
    let command = effects
        .iter()
        .find_map(|e| match e {
            Effect::StartTerminal { launch, .. } => Some(launch.command.clone()),
            _ => None,
        })
        .unwrap();
    assert!(command.starts_with("cp -aiv"));
    assert!(command.contains("/home/a.txt"));
}

#[test]
fn test_click_selects_and_ctrl_click_toggles() {
    let mut wb = loaded();
    let hit = HitMap::compute(Rect::new(0, 0, 100, 30), &wb, &HitMap::default());
    let now = Instant::now();

    wb.handle_mouse_at(mouse(MouseEventKind::Down(MouseButton::Left), 10, 7), &hit, now);
    wb.handle_mouse_at(mouse(MouseEventKind::Up(MouseButton::Left), 10, 7), &hit, now);
    assert_eq!(wb.pane(PaneId::Left).focused(), Some(2));

    let later = now + std::time::Duration::from_secs(1);
    let ctrl = MouseEvent {
        modifiers: KeyModifiers::CONTROL,
        ..mouse(MouseEventKind::Down(MouseButton::Left), 10, 8)
    };
    wb.handle_mouse_at(ctrl, &hit, later);
    wb.handle_mouse_at(
        MouseEvent {
            modifiers: KeyModifiers::CONTROL,
            ..mouse(MouseEventKind::Up(MouseButton::Left), 10, 8)
        },
        &hit,
        later,
    );
    assert!(wb.pane(PaneId::Left).is_selected(3));
}
