use proptest::prelude::*;
use twinpane_core::{
    move_focus, ClickKind, ColumnWidths, Direction, Item, MemoryStore, OverlayKind, OverlayStack,
    Pane, PaneId, PaneTabs, Preferences, RetainedSelection, SelectionController, TabRegistry,
};

fn listing(count: usize) -> Vec<Item> {
    let mut items = vec![Item::parent_marker("/")];
    items.extend((0..count).map(|i| Item::file(format!("f{i}"), format!("/d/f{i}"))));
    items
}

fn loaded(count: usize) -> Pane {
    let mut pane = Pane::new(PaneId::Left, "/d");
    let ticket = pane.begin_load();
    pane.apply_listing(ticket, "/d", listing(count));
    pane
}

fn assert_invariants(pane: &Pane) {
    if let Some(focused) = pane.focused() {
        assert!(focused < pane.len(), "focus {focused} outside {} rows", pane.len());
    }
    assert!(pane.selected_indices().all(|i| i < pane.len()));
}

#[derive(Debug, Clone)]
enum Op {
    Click(usize, u8),
    ShiftArrow(bool),
    ReleaseShift,
    Arrow(bool),
    SelectAll,
    Reload(usize),
    RetainReload(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..12, 0u8..3).prop_map(|(i, k)| Op::Click(i, k)),
        any::<bool>().prop_map(Op::ShiftArrow),
        Just(Op::ReleaseShift),
        any::<bool>().prop_map(Op::Arrow),
        Just(Op::SelectAll),
        (0usize..10).prop_map(Op::Reload),
        (0usize..10).prop_map(Op::RetainReload),
    ]
}

fn direction(down: bool) -> Direction {
    if down { Direction::Down } else { Direction::Up }
}

proptest! {
    #[test]
    fn focus_stays_within_items(ops in prop::collection::vec(op(), 1..60)) {
        let mut pane = loaded(5);
        let mut ctl = SelectionController::new();

        for op in ops {
            match op {
                Op::Click(i, k) => {
                    let kind = match k {
                        0 => ClickKind::Plain,
                        1 => ClickKind::Toggle,
                        _ => ClickKind::Range,
                    };
                    ctl.click(&mut pane, i, kind);
                }
                Op::ShiftArrow(down) => {
                    ctl.shift_arrow(&mut pane, direction(down));
                }
                Op::ReleaseShift => ctl.release_shift(),
                Op::Arrow(down) => {
                    move_focus(&mut pane, direction(down));
                }
                Op::SelectAll => pane.select_all(),
                Op::Reload(n) => {
                    let ticket = pane.begin_load();
                    pane.apply_listing(ticket, "/d", listing(n));
                    ctl.reset();
                }
                Op::RetainReload(n) => {
                    let retained = pane.retain();
                    let ticket = pane.begin_load();
                    pane.apply_listing(ticket, "/d", listing(n));
                    pane.restore(&retained);
                    ctl.reset();
                }
            }
            assert_invariants(&pane);
        }
    }

    #[test]
    fn double_shift_click_restores_range(count in 2usize..20, from in 1usize..20, to in 1usize..20) {
        let mut pane = loaded(count);
        let from = from.min(count);
        let to = to.min(count);
        let mut ctl = SelectionController::new();
        pane.set_focus(from);

        ctl.click(&mut pane, to, ClickKind::Range);
        ctl.click(&mut pane, to, ClickKind::Range);

        prop_assert_eq!(pane.selected_indices().count(), 0);
        prop_assert_eq!(pane.focused(), Some(to));
    }

    #[test]
    fn saved_widths_sum_to_hundred(widths in prop::collection::vec(0.5f64..80.0, 5)) {
        let mut prefs = Preferences::in_memory();
        prefs.set_column_widths(PaneId::Left, &widths);
        let loaded = prefs.column_widths(PaneId::Left);
        prop_assert!((loaded.sum() - 100.0).abs() < 1e-6);
    }
}

#[test]
fn test_width_sum_of_97_3_reloads_as_hundred() {
    let mut prefs = Preferences::in_memory();
    prefs.set_column_widths(PaneId::Right, &[30.0, 15.0, 12.3, 20.0, 20.0]);
    let widths = prefs.column_widths(PaneId::Right);
    assert!((widths.sum() - 100.0).abs() < 1e-6);
    assert_eq!(widths.as_slice().len(), 5);
}

#[test]
fn test_default_widths_when_nothing_stored() {
    let mut prefs = Preferences::new(MemoryStore::new());
    assert_eq!(prefs.column_widths(PaneId::Left), ColumnWidths::default());
}

#[test]
fn test_tab_registry_persists_through_preferences() {
    let mut prefs = Preferences::in_memory();
    let mut registry = TabRegistry::default();
    let left = registry.pane_mut(PaneId::Left);
    left.ensure_initialized("/home");
    left.push("/srv", RetainedSelection::focus("/srv/data"), 8);
    prefs.set_tab_registry(&registry);

    let loaded = prefs.tab_registry();
    let left = loaded.pane(PaneId::Left).unwrap();
    assert_eq!(left.active, 1);
    assert_eq!(left.tabs[1].snapshot.focused.as_deref(), Some("/srv/data"));
}

#[test]
fn test_closing_only_tab_leaves_one() {
    let mut tabs = PaneTabs::default();
    tabs.ensure_initialized("/home");
    tabs.close(0, "/home/last");
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs.tabs[0].path, "/home/last");
}

#[test]
fn test_overlay_exclusivity_keeps_message() {
    let mut overlay: OverlayStack<&str, (), ()> = OverlayStack::new();
    overlay.open(OverlayKind::Message, "Rename failed").unwrap();
    assert!(overlay.open(OverlayKind::Preview, "image").is_err());
    assert_eq!(overlay.active(), Some(OverlayKind::Message));
    assert_eq!(overlay.content(), Some(&"Rename failed"));
}
