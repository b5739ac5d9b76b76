//! Press-move-release drag recognition.
//!
//! ```text
//!            press (primary)            travel >= threshold
//!   Idle ───────────────────► Armed ─────────────────────► Dragging
//!    ▲                          │                              │
//!    │       release            │            release           │
//!    └──────── (click) ─────────┘◄──── (drop or cancel) ───────┘
//! ```
//!
//! While dragging, the point under the pointer is hit-tested for a
//! droppable target (directory row, tab, or pane list). The resolved
//! copy/move action is decided from held modifiers and whether source and
//! destination share a top-level path segment.

use crate::item::{Item, Modifiers, PaneId};
use crate::path;

/// Offset of the floating label from the pointer.
pub const LABEL_OFFSET: f64 = 12.0;

/// A pointer position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Something a drag can be dropped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A directory row.
    Directory { pane: PaneId, path: String },
    /// A tab in a pane's tab bar.
    Tab { pane: PaneId, index: usize, path: String },
    /// Empty space in a pane's listing; drops into the pane's directory.
    PaneList { pane: PaneId, path: String },
}

impl DropTarget {
    /// Destination directory.
    pub fn path(&self) -> &str {
        match self {
            DropTarget::Directory { path, .. }
            | DropTarget::Tab { path, .. }
            | DropTarget::PaneList { path, .. } => path,
        }
    }

    /// Pane the target belongs to.
    pub fn pane(&self) -> PaneId {
        match self {
            DropTarget::Directory { pane, .. }
            | DropTarget::Tab { pane, .. }
            | DropTarget::PaneList { pane, .. } => *pane,
        }
    }
}

/// Finds the droppable element under a point.
pub trait HitTest {
    /// First droppable ancestor of whatever lies under `point`.
    fn droppable_at(&self, point: Point) -> Option<DropTarget>;
}

/// Copy or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    Copy,
    Move,
}

impl DropAction {
    /// Glyph shown in the floating label.
    pub fn glyph(self) -> &'static str {
        match self {
            DropAction::Copy => "+",
            DropAction::Move => ">",
        }
    }

    /// Verb for messages and logs.
    pub fn verb(self) -> &'static str {
        match self {
            DropAction::Copy => "copy",
            DropAction::Move => "move",
        }
    }
}

/// Decide copy vs move.
///
/// Shift forces copy, then Ctrl/Meta/Alt force move; otherwise sharing a
/// top-level segment means move and crossing one means copy.
pub fn resolve_drop_action(source: &str, destination: &str, modifiers: Modifiers) -> DropAction {
    if modifiers.shift {
        DropAction::Copy
    } else if modifiers.ctrl || modifiers.meta || modifiers.alt {
        DropAction::Move
    } else if path::top_segment(source) == path::top_segment(destination) {
        DropAction::Move
    } else {
        DropAction::Copy
    }
}

/// The floating indicator that follows the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragLabel {
    pub text: String,
    pub position: Point,
}

/// A recognized drop, ready to hand to the file-operation collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    pub action: DropAction,
    pub items: Vec<Item>,
    pub origin: PaneId,
    pub target: DropTarget,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No gesture was in progress.
    None,
    /// Released before the threshold; treat as a click.
    Click,
    /// Released over a droppable target.
    Drop(DropRequest),
    /// Released over nothing droppable.
    Cancelled,
}

/// The ephemeral drag session.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Items being dragged.
    pub items: Vec<Item>,
    /// Pane the drag started in.
    pub origin: PaneId,
    /// Directory the origin pane was showing at press.
    pub source_dir: String,
    /// Pointer position at press.
    pub start: Point,
    /// Current drop-target candidate (carries the droppable marker).
    pub target: Option<DropTarget>,
    /// Floating label, present once dragging.
    pub label: Option<DragLabel>,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

/// Drag gesture engine. One per workbench.
#[derive(Debug, Clone)]
pub struct DragEngine {
    state: DragState,
    modifiers: Modifiers,
    threshold: f64,
}

impl DragEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            state: DragState::Idle,
            modifiers: Modifiers::NONE,
            threshold,
        }
    }

    /// Record the currently held modifiers.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DragState::Armed(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Live session, armed or dragging.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
        }
    }

    /// Floating label while dragging.
    pub fn label(&self) -> Option<&DragLabel> {
        match &self.state {
            DragState::Dragging(s) => s.label.as_ref(),
            _ => None,
        }
    }

    /// Target currently marked droppable.
    pub fn target(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging(s) => s.target.as_ref(),
            _ => None,
        }
    }

    /// Pointer pressed on a row of `origin`, which shows `source_dir`.
    /// Only the primary button arms a drag.
    pub fn press(
        &mut self,
        button: PointerButton,
        point: Point,
        origin: PaneId,
        source_dir: &str,
        items: Vec<Item>,
    ) -> bool {
        if button != PointerButton::Primary || items.is_empty() {
            return false;
        }
        self.state = DragState::Armed(DragSession {
            items,
            origin,
            source_dir: source_dir.to_string(),
            start: point,
            target: None,
            label: None,
        });
        true
    }

    /// Pointer moved. Returns true when visible drag state changed.
    pub fn motion(&mut self, point: Point, hit: &impl HitTest) -> bool {
        match std::mem::take(&mut self.state) {
            DragState::Idle => false,
            DragState::Armed(session) => {
                let dx = (point.x - session.start.x).abs();
                let dy = (point.y - session.start.y).abs();
                if dx < self.threshold && dy < self.threshold {
                    self.state = DragState::Armed(session);
                    return false;
                }
                tracing::debug!(target: "drag", items = session.items.len(), "drag started");
                let mut session = session;
                self.update(&mut session, point, hit);
                self.state = DragState::Dragging(session);
                true
            }
            DragState::Dragging(mut session) => {
                self.update(&mut session, point, hit);
                self.state = DragState::Dragging(session);
                true
            }
        }
    }

    fn update(&self, session: &mut DragSession, point: Point, hit: &impl HitTest) {
        let candidate = hit.droppable_at(point);
        if candidate != session.target {
            tracing::trace!(target: "drag", to = ?candidate.as_ref().map(DropTarget::path), "drop target changed");
            session.target = candidate;
        }
        let action = self.action_for(session, session.target.as_ref());
        session.label = Some(DragLabel {
            text: format!("{} {}", action.glyph(), summary(&session.items)),
            position: Point::new(point.x + LABEL_OFFSET, point.y + LABEL_OFFSET),
        });
    }

    fn action_for(&self, session: &DragSession, target: Option<&DropTarget>) -> DropAction {
        let source = session.source_dir.as_str();
        let destination = target.map(DropTarget::path).unwrap_or(source);
        resolve_drop_action(source, destination, self.modifiers)
    }

    /// Pointer released.
    ///
    /// Always returns the engine to idle, dropping label and marker.
    pub fn release(&mut self, point: Point, hit: &impl HitTest) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragOutcome::None,
            DragState::Armed(_) => DragOutcome::Click,
            DragState::Dragging(session) => {
                let Some(target) = hit.droppable_at(point) else {
                    tracing::debug!(target: "drag", "released over nothing droppable");
                    return DragOutcome::Cancelled;
                };
                if session.items.iter().any(|i| i.path == target.path()) {
                    tracing::debug!(target: "drag", "dropped onto itself");
                    return DragOutcome::Cancelled;
                }
                let action = self.action_for(&session, Some(&target));
                tracing::info!(
                    target: "drag",
                    action = action.verb(),
                    items = session.items.len(),
                    destination = target.path(),
                    "drop"
                );
                DragOutcome::Drop(DropRequest {
                    action,
                    items: session.items,
                    origin: session.origin,
                    target,
                })
            }
        }
    }

    /// Abort any gesture.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Label text: the single item's name or an item count.
pub fn summary(items: &[Item]) -> String {
    match items {
        [single] => single.name.to_string(),
        _ => format!("{} items", items.len()),
    }
}
