//! Terminal transport.
//!
//! The terminal overlay talks to a session: a stream of output events, an
//! input sink and a cancellation token that releases the session when the
//! overlay closes.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TerminalError;
use crate::OPERATION_CHANNEL_SIZE;

/// What to run when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalLaunch {
    /// Command line; empty for an interactive shell.
    pub command: String,
    /// Host working directory.
    pub cwd: Option<String>,
}

/// Events emitted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Connected,
    Output(String),
    /// The process ended; `None` when it was killed or the code is unknown.
    Exited(Option<i32>),
}

/// A live terminal session.
#[derive(Debug)]
pub struct TerminalSession {
    pub events: mpsc::Receiver<TerminalEvent>,
    pub input: mpsc::Sender<String>,
    pub cancel: CancellationToken,
}

/// Starts terminal sessions.
pub trait TerminalTransport: Send + Sync {
    /// Start a session. Must be called from within a tokio runtime.
    fn connect(&self, launch: TerminalLaunch) -> Result<TerminalSession, TerminalError>;
}

/// Runs commands through a local `sh` with piped stdio.
#[derive(Debug, Clone)]
pub struct LocalShell {
    shell: String,
}

impl Default for LocalShell {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl LocalShell {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl TerminalTransport for LocalShell {
    fn connect(&self, launch: TerminalLaunch) -> Result<TerminalSession, TerminalError> {
        let mut cmd = Command::new(&self.shell);
        if !launch.command.is_empty() {
            cmd.arg("-c").arg(&launch.command);
        }
        if let Some(cwd) = &launch.cwd {
            cmd.current_dir(cwd);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| TerminalError::Spawn { source })?;
        tracing::info!(target: "terminal", command = %launch.command, cwd = ?launch.cwd, "session started");

        let (event_tx, events) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let (input, mut input_rx) = mpsc::channel::<String>(OPERATION_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let _ = event_tx.try_send(TerminalEvent::Connected);

        let mut pumps = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(stdout, event_tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(stderr, event_tx.clone())));
        }
        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                while let Some(line) = input_rx.recv().await {
                    if stdin.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = stdin.flush().await;
                }
            });
        }

        let token = cancel.clone();
        tokio::spawn(async move {
            let code = tokio::select! {
                status = child.wait() => {
                    for pump in pumps {
                        let _ = pump.await;
                    }
                    status.ok().and_then(|s| s.code())
                }
                _ = token.cancelled() => {
                    let _ = child.kill().await;
                    tracing::debug!(target: "terminal", "session cancelled");
                    None
                }
            };
            tracing::debug!(target: "terminal", ?code, "session ended");
            let _ = event_tx.send(TerminalEvent::Exited(code)).await;
        });

        Ok(TerminalSession {
            events,
            input,
            cancel,
        })
    }
}

async fn pump(mut reader: impl AsyncRead + Unpin, tx: mpsc::Sender<TerminalEvent>) {
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                if tx.send(TerminalEvent::Output(chunk)).await.is_err() {
                    break;
                }
            }
        }
    }
}
