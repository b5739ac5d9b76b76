//! Effects requested by the workbench and the completions that answer them.
//!
//! The workbench never awaits anything. It queues [`Effect`]s; the runtime
//! performs them against the collaborators and feeds a [`Completion`] back
//! for each one that produces a result.

use std::path::PathBuf;
use std::time::Duration;

use twinpane_core::{Direction, Item, LoadTicket, PaneId, RetainedSelection};
use twinpane_ops::{
    FolderSize, ListRequest, ListResponse, MutationRequest, PreviewContent, ShellCommand,
    TerminalEvent, TerminalLaunch, UploadOutcome,
};

/// Identifier of a terminal session opened by the workbench.
pub type SessionId = u64;

/// Work for the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// List a directory for a pane load.
    Fetch {
        ticket: LoadTicket,
        request: ListRequest,
    },
    /// Apply a single-item mutation.
    Mutate {
        pane: PaneId,
        request: MutationRequest,
    },
    /// Connect a terminal session.
    StartTerminal {
        session: SessionId,
        launch: TerminalLaunch,
    },
    /// Write to a terminal session.
    TerminalInput { session: SessionId, data: String },
    /// Release a terminal session.
    StopTerminal { session: SessionId },
    /// Render a preview for the overlay opened at `generation`.
    LoadPreview { generation: u64, item: Item },
    /// Queue a folder size computation.
    FolderSize { path: String },
    /// Upload files into `target`.
    Upload {
        pane: PaneId,
        target: String,
        sources: Vec<PathBuf>,
        /// Focused path of the pane when the upload started.
        focused: Option<String>,
    },
    /// Download a file.
    Download { path: String },
    /// Drop overlay content once the grace period has passed.
    ClearOverlay { generation: u64, after: Duration },
    /// Suspend the TUI and run an interactive command in the real terminal.
    RunEditor { command: ShellCommand },
}

/// Result of an effect.
#[derive(Debug)]
pub enum Completion {
    Listing {
        ticket: LoadTicket,
        result: Result<ListResponse, String>,
    },
    Mutation {
        pane: PaneId,
        request: MutationRequest,
        result: Result<String, String>,
    },
    Terminal {
        session: SessionId,
        event: TerminalEvent,
    },
    TerminalFailed {
        session: SessionId,
        message: String,
    },
    Preview {
        generation: u64,
        content: PreviewContent,
    },
    FolderSize(FolderSize),
    Upload {
        pane: PaneId,
        target: String,
        focused: Option<String>,
        outcome: UploadOutcome,
    },
    Download(Result<PathBuf, String>),
    OverlayGraceElapsed { generation: u64 },
    EditorExited(Result<Option<i32>, String>),
}

/// Follow-up registered against one load of a pane.
#[derive(Debug, Clone, PartialEq)]
pub enum AfterLoad {
    /// Restore a retained selection.
    Restore(RetainedSelection),
    /// Focus the directory with this name, if present.
    FocusName(String),
    /// Focus the row with this path.
    FocusPath(String),
    /// Select these paths and focus the first one.
    SelectPaths(Vec<String>),
}

/// One-shot callback run after the overlay closes.
#[derive(Debug, Clone, PartialEq)]
pub enum AfterClose {
    /// Replay an arrow on the active pane and preview the new focus.
    ReplayArrow(Direction),
    /// Reload one pane, or both when `pane` is `None`.
    Refresh { pane: Option<PaneId>, retain: bool },
}

/// Teardown hook for an overlay kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    ReleaseTerminal { session: SessionId },
    DisposePlayer,
}
