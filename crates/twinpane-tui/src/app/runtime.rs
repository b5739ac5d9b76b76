//! Executes workbench effects against the collaborators.
//!
//! Every effect runs on its own task; results come back over one channel
//! as [`Completion`]s, in whatever order the collaborators finish.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use twinpane_ops::{
    start_folder_size_queue, DirectoryService, FileMutationService, FolderSizeQueue, HostRoot,
    LocalDirectoryService, LocalMutationService, LocalPreviewProvider, LocalShell, LocalTransfers,
    PreviewProvider, TerminalTransport, TransferService,
};

use super::constants::COMPLETION_CHANNEL_SIZE;
use super::effects::{Completion, Effect, SessionId};

/// The services effects are performed against.
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn DirectoryService>,
    pub mutation: Arc<dyn FileMutationService>,
    pub terminal: Arc<dyn TerminalTransport>,
    pub preview: Arc<dyn PreviewProvider>,
    pub transfer: Arc<dyn TransferService>,
}

impl Collaborators {
    /// Local filesystem services below `root`.
    pub fn local(root: HostRoot, download_dir: PathBuf) -> Self {
        Self {
            directory: Arc::new(LocalDirectoryService::new(root.clone())),
            mutation: Arc::new(LocalMutationService::new(root.clone())),
            terminal: Arc::new(LocalShell::default()),
            preview: Arc::new(LocalPreviewProvider::new(root.clone())),
            transfer: Arc::new(LocalTransfers::new(root, download_dir)),
        }
    }
}

struct TerminalHandle {
    input: mpsc::Sender<String>,
    cancel: CancellationToken,
}

/// Runs effects and reports their completions.
pub struct EffectRuntime {
    collaborators: Collaborators,
    tx: mpsc::Sender<Completion>,
    terminals: HashMap<SessionId, TerminalHandle>,
    folder_sizes: FolderSizeQueue,
}

impl EffectRuntime {
    /// Create the runtime. Must be called from within a tokio runtime.
    pub fn new(collaborators: Collaborators, root: HostRoot) -> (Self, mpsc::Receiver<Completion>) {
        let (tx, rx) = mpsc::channel(COMPLETION_CHANNEL_SIZE);
        let (folder_sizes, mut sizes) = start_folder_size_queue(root);

        let forward = tx.clone();
        tokio::spawn(async move {
            while let Some(size) = sizes.recv().await {
                if forward.send(Completion::FolderSize(size)).await.is_err() {
                    break;
                }
            }
        });

        (
            Self {
                collaborators,
                tx,
                terminals: HashMap::new(),
                folder_sizes,
            },
            rx,
        )
    }

    /// Start an effect.
    pub fn execute(&mut self, effect: Effect) {
        let tx = self.tx.clone();
        match effect {
            Effect::Fetch { ticket, request } => {
                let directory = Arc::clone(&self.collaborators.directory);
                tokio::spawn(async move {
                    let result = directory.list(request).await.map_err(|e| e.to_string());
                    let _ = tx.send(Completion::Listing { ticket, result }).await;
                });
            }
            Effect::Mutate { pane, request } => {
                let mutation = Arc::clone(&self.collaborators.mutation);
                tokio::spawn(async move {
                    let result = mutation
                        .apply(request.clone())
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx
                        .send(Completion::Mutation {
                            pane,
                            request,
                            result,
                        })
                        .await;
                });
            }
            Effect::StartTerminal { session, launch } => self.start_terminal(session, launch),
            Effect::TerminalInput { session, data } => {
                let Some(handle) = self.terminals.get(&session) else {
                    tracing::debug!(target: "terminal", session, "input for unknown session");
                    return;
                };
                let input = handle.input.clone();
                tokio::spawn(async move {
                    let _ = input.send(data).await;
                });
            }
            Effect::StopTerminal { session } => {
                if let Some(handle) = self.terminals.remove(&session) {
                    tracing::debug!(target: "terminal", session, "released");
                    handle.cancel.cancel();
                }
            }
            Effect::LoadPreview { generation, item } => {
                let preview = Arc::clone(&self.collaborators.preview);
                tokio::spawn(async move {
                    let content = preview.preview(item).await;
                    let _ = tx
                        .send(Completion::Preview {
                            generation,
                            content,
                        })
                        .await;
                });
            }
            Effect::FolderSize { path } => {
                if !self.folder_sizes.enqueue(path) {
                    tracing::warn!("folder size worker stopped");
                }
            }
            Effect::Upload {
                pane,
                target,
                sources,
                focused,
            } => {
                let transfer = Arc::clone(&self.collaborators.transfer);
                tokio::spawn(async move {
                    let outcome = transfer.upload(target.clone(), sources).await;
                    let _ = tx
                        .send(Completion::Upload {
                            pane,
                            target,
                            focused,
                            outcome,
                        })
                        .await;
                });
            }
            Effect::Download { path } => {
                let transfer = Arc::clone(&self.collaborators.transfer);
                tokio::spawn(async move {
                    let result = transfer.download(path).await.map_err(|e| e.to_string());
                    let _ = tx.send(Completion::Download(result)).await;
                });
            }
            Effect::ClearOverlay { generation, after } => {
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Completion::OverlayGraceElapsed { generation }).await;
                });
            }
            Effect::RunEditor { command } => {
                tracing::warn!(command = %command.command, "editor effect reached the runtime");
            }
        }
    }

    fn start_terminal(&mut self, session: SessionId, launch: twinpane_ops::TerminalLaunch) {
        let tx = self.tx.clone();
        let mut connected = match self.collaborators.terminal.connect(launch) {
            Ok(connected) => connected,
            Err(e) => {
                tokio::spawn(async move {
                    let _ = tx
                        .send(Completion::TerminalFailed {
                            session,
                            message: e.to_string(),
                        })
                        .await;
                });
                return;
            }
        };

        self.terminals.insert(
            session,
            TerminalHandle {
                input: connected.input.clone(),
                cancel: connected.cancel.clone(),
            },
        );
        tracing::debug!(target: "terminal", session, "connected");

        tokio::spawn(async move {
            while let Some(event) = connected.events.recv().await {
                if tx.send(Completion::Terminal { session, event }).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Release every live terminal session.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.terminals.drain() {
            handle.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use twinpane_core::{LoadTicket, PaneId};
    use twinpane_ops::{ListRequest, ListResponse};

    fn runtime(dir: &TempDir) -> (EffectRuntime, mpsc::Receiver<Completion>) {
        let root = HostRoot::new(dir.path());
        let collaborators = Collaborators::local(root.clone(), dir.path().join("downloads"));
        EffectRuntime::new(collaborators, root)
    }

    #[tokio::test]
    async fn test_fetch_reports_listing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let (mut runtime, mut rx) = runtime(&dir);

        let ticket = LoadTicket {
            pane: PaneId::Left,
            seq: 1,
        };
        runtime.execute(Effect::Fetch {
            ticket,
            request: ListRequest::new("/"),
        });

        match rx.recv().await {
            Some(Completion::Listing {
                ticket: got,
                result: Ok(ListResponse::Directory { items, .. }),
            }) => {
                assert_eq!(got, ticket);
                assert!(items.iter().any(|i| i.name == "a.txt"));
            }
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clear_overlay_waits_for_grace() {
        let dir = TempDir::new().unwrap();
        let (mut runtime, mut rx) = runtime(&dir);

        runtime.execute(Effect::ClearOverlay {
            generation: 7,
            after: Duration::from_millis(10),
        });

        match rx.recv().await {
            Some(Completion::OverlayGraceElapsed { generation }) => assert_eq!(generation, 7),
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_folder_size_forwarded() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/f"), vec![0u8; 64]).unwrap();
        let (mut runtime, mut rx) = runtime(&dir);

        runtime.execute(Effect::FolderSize {
            path: "/sub".into(),
        });

        match rx.recv().await {
            Some(Completion::FolderSize(size)) => {
                assert_eq!(size.path, "/sub");
                assert_eq!(size.bytes, Ok(64));
            }
            other => panic!("unexpected completion: {other:?}"),
        }
    }
}
