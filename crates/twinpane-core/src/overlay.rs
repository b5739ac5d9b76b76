//! Single-slot overlay modality.
//!
//! At most one overlay is visible. Opening is check, hide others, inject,
//! mark visible. Closing is teardown, unmark, delayed content clear, then
//! the opener's one-shot "closed" callback.
//!
//! The stack is generic over the overlay content `C`, the teardown hook
//! type `H`, and the closed callback type `F`, so it can be driven by the
//! workbench and tested in isolation.

use std::collections::{BTreeMap, BTreeSet};

use strum::{Display, EnumIter};

use crate::error::OverlayError;

/// Kinds of overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum OverlayKind {
    Message,
    Preview,
    Terminal,
    TextEditor,
    Upload,
}

/// Result of closing the overlay.
#[derive(Debug)]
pub struct ClosedOverlay<F> {
    /// Kind that was closed.
    pub kind: OverlayKind,
    /// Generation to pass to [`OverlayStack::clear_content`] after the grace period.
    pub generation: u64,
    /// The opener's closed callback, to be invoked by the caller.
    pub on_closed: Option<F>,
}

/// The overlay slot.
#[derive(Debug)]
pub struct OverlayStack<C, H, F> {
    /// Kind currently open.
    active: Option<OverlayKind>,
    /// Containers currently shown.
    visible: BTreeSet<OverlayKind>,
    /// Injected content; outlives `active` until the delayed clear.
    content: Option<(OverlayKind, C)>,
    /// Whether the underlying panes are locked from scrolling.
    no_scroll: bool,
    /// Bumped on every open; guards delayed clears.
    generation: u64,
    /// One teardown hook per kind.
    teardown: BTreeMap<OverlayKind, H>,
    /// One-shot callback for the next close.
    on_closed: Option<F>,
}

impl<C, H, F> Default for OverlayStack<C, H, F> {
    fn default() -> Self {
        Self {
            active: None,
            visible: BTreeSet::new(),
            content: None,
            no_scroll: false,
            generation: 0,
            teardown: BTreeMap::new(),
            on_closed: None,
        }
    }
}

impl<C, H, F> OverlayStack<C, H, F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any overlay is open.
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Kind currently open.
    pub fn active(&self) -> Option<OverlayKind> {
        self.active
    }

    /// Check if a container is shown.
    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.visible.contains(&kind)
    }

    /// Whether the panes are locked from scrolling.
    pub fn no_scroll(&self) -> bool {
        self.no_scroll
    }

    /// Current open generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Injected content, including content lingering after a close.
    pub fn content(&self) -> Option<&C> {
        self.content.as_ref().map(|(_, c)| c)
    }

    /// Mutable content of the open overlay.
    pub fn content_mut(&mut self) -> Option<&mut C> {
        match (&self.active, &mut self.content) {
            (Some(active), Some((kind, content))) if *active == *kind => Some(content),
            _ => None,
        }
    }

    /// Open an overlay.
    ///
    /// Rejected while another overlay is open; the open one is left untouched.
    pub fn open(&mut self, kind: OverlayKind, content: C) -> Result<u64, OverlayError> {
        if let Some(active) = self.active {
            tracing::debug!(target: "overlay", %kind, %active, "open rejected");
            return Err(OverlayError::Busy { active });
        }
        self.visible.clear();
        self.content = Some((kind, content));
        self.generation += 1;
        self.active = Some(kind);
        self.visible.insert(kind);
        self.no_scroll = true;
        tracing::debug!(target: "overlay", %kind, generation = self.generation, "opened");
        Ok(self.generation)
    }

    /// Register the teardown hook for `kind`, replacing any previous hook.
    pub fn register_teardown(&mut self, kind: OverlayKind, hook: H) -> Option<H> {
        self.teardown.insert(kind, hook)
    }

    /// Check if a teardown hook is registered for `kind`.
    pub fn has_teardown(&self, kind: OverlayKind) -> bool {
        self.teardown.contains_key(&kind)
    }

    /// Register the one-shot closed callback, replacing any previous one.
    pub fn set_on_closed(&mut self, callback: F) {
        self.on_closed = Some(callback);
    }

    /// Drop a pending closed callback without running it.
    pub fn clear_on_closed(&mut self) -> Option<F> {
        self.on_closed.take()
    }

    /// Close the open overlay.
    ///
    /// `run_teardown` receives the active kind's hook (taken out of its slot)
    /// while the content is still present. Returns `None` when nothing is open.
    pub fn close(&mut self, mut run_teardown: impl FnMut(H, Option<&mut C>)) -> Option<ClosedOverlay<F>> {
        let kind = self.active?;

        if let Some(hook) = self.teardown.remove(&kind) {
            run_teardown(hook, self.content.as_mut().map(|(_, c)| c));
        }

        self.active = None;
        self.visible.clear();
        self.no_scroll = false;
        tracing::debug!(target: "overlay", %kind, generation = self.generation, "closed");

        Some(ClosedOverlay {
            kind,
            generation: self.generation,
            on_closed: self.on_closed.take(),
        })
    }

    /// Drop lingering content once the grace period of close `generation`
    /// has elapsed. Ignored if an overlay was opened since.
    pub fn clear_content(&mut self, generation: u64) -> bool {
        if self.active.is_some() || generation != self.generation {
            return false;
        }
        self.content.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Stack = OverlayStack<String, &'static str, &'static str>;

    #[test]
    fn test_open_rejected_while_open() {
        let mut stack = Stack::new();
        stack.open(OverlayKind::Message, "hello".into()).unwrap();

        let err = stack.open(OverlayKind::Preview, "preview".into()).unwrap_err();
        assert_eq!(
            err,
            OverlayError::Busy {
                active: OverlayKind::Message
            }
        );
        assert_eq!(stack.active(), Some(OverlayKind::Message));
        assert_eq!(stack.content().map(String::as_str), Some("hello"));
        assert!(stack.is_visible(OverlayKind::Message));
        assert!(!stack.is_visible(OverlayKind::Preview));
    }

    #[test]
    fn test_close_order() {
        let mut stack = Stack::new();
        stack.open(OverlayKind::Terminal, "output".into()).unwrap();
        stack.register_teardown(OverlayKind::Terminal, "disconnect");
        stack.set_on_closed("refresh");

        let mut seen = Vec::new();
        let closed = stack
            .close(|hook, content| seen.push((hook, content.map(|c| c.clone()))))
            .unwrap();

        assert_eq!(seen, vec![("disconnect", Some("output".to_string()))]);
        assert!(!stack.is_open());
        assert!(!stack.no_scroll());
        assert_eq!(closed.on_closed, Some("refresh"));
        // Content lingers until the grace period elapses.
        assert!(stack.content().is_some());
        assert!(stack.clear_content(closed.generation));
        assert!(stack.content().is_none());
    }

    #[test]
    fn test_teardown_runs_once() {
        let mut stack = Stack::new();
        stack.open(OverlayKind::Preview, "video".into()).unwrap();
        stack.register_teardown(OverlayKind::Preview, "dispose");
        let mut count = 0;
        stack.close(|_, _| count += 1);

        stack.open(OverlayKind::Preview, "video".into()).unwrap();
        stack.close(|_, _| count += 1);
        assert_eq!(count, 1);
        assert!(!stack.has_teardown(OverlayKind::Preview));
    }

    #[test]
    fn test_teardown_only_for_active_kind() {
        let mut stack = Stack::new();
        stack.register_teardown(OverlayKind::Terminal, "disconnect");
        stack.open(OverlayKind::Message, "msg".into()).unwrap();
        let mut ran = false;
        stack.close(|_, _| ran = true);
        assert!(!ran);
        assert!(stack.has_teardown(OverlayKind::Terminal));
    }

    #[test]
    fn test_stale_clear_ignored_after_reopen() {
        let mut stack = Stack::new();
        stack.open(OverlayKind::Message, "first".into()).unwrap();
        let closed = stack.close(|_, _| {}).unwrap();
        stack.open(OverlayKind::Message, "second".into()).unwrap();

        assert!(!stack.clear_content(closed.generation));
        assert_eq!(stack.content().map(String::as_str), Some("second"));
    }

    #[test]
    fn test_close_when_nothing_open() {
        let mut stack = Stack::new();
        stack.set_on_closed("cb");
        assert!(stack.close(|_, _| {}).is_none());
    }
}
