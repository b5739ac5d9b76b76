//! Collaborators for twinpane.
//!
//! Everything the interaction core delegates lives here: directory
//! listings, single-item mutations, shell command construction and the
//! completion marker protocol, the terminal transport, serial folder
//! sizes, previews, uploads and downloads, and userscript discovery.
//!
//! Each collaborator is a trait with a local implementation working below
//! a [`HostRoot`].

mod error;
mod folder_size;
mod listing;
mod marker;
mod mutation;
mod preview;
mod root;
mod shell;
mod terminal;
mod transfer;
mod userscripts;

pub use error::{ListingError, MutationError, TerminalError};
pub use folder_size::{directory_size, start_folder_size_queue, FolderSize, FolderSizeQueue};
pub use listing::{format_time, DirectoryService, ListRequest, ListResponse, LocalDirectoryService};
pub use marker::{CompletionDetector, CompletionMarker};
pub use mutation::{
    copy_dir_recursive, duplicate_name, validate_filename, FileMutationService,
    LocalMutationService, MutationRequest,
};
pub use preview::{
    LocalPreviewProvider, PreviewBody, PreviewContent, PreviewEntry, PreviewKind, PreviewProvider,
    TEXT_PREVIEW_LIMIT,
};
pub use root::{HostPrefix, HostRoot};
pub use shell::{is_archive, shell_quote, CommandBuilder, ShellCommand, ARCHIVE_EXTENSIONS};
pub use terminal::{LocalShell, TerminalEvent, TerminalLaunch, TerminalSession, TerminalTransport};
pub use transfer::{LocalTransfers, TransferService, UploadOutcome};
pub use userscripts::{discover_userscripts, Userscript};

/// Default channel buffer size for collaborator results.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
