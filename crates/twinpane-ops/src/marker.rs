//! Completion marker protocol for terminal commands.
//!
//! A command that should close its terminal when done is suffixed with
//! `&& echo "<token>"`. The echoed token only appears at the start of an
//! output line (after optional non-quote noise such as cursor escapes) once
//! the command succeeded; the echo of the command line itself always has a
//! `"` in front of the token and never matches.

use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique completion token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMarker {
    token: String,
}

impl CompletionMarker {
    /// Mint a new token from the wall clock and a process-wide counter.
    pub fn new() -> Self {
        let time = chrono::Local::now().format("%H%M%S%3f");
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            token: format!("__twinpane_exit_code_{time}_{n}__"),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Append the marker echo to `command`.
    pub fn wrap(&self, command: &str) -> String {
        format!("{command} && echo \"{}\"", self.token)
    }

    /// Detector for this marker.
    pub fn detector(&self) -> Result<CompletionDetector, regex::Error> {
        CompletionDetector::new(&self.token)
    }
}

impl Default for CompletionMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates terminal output and reports when the marker shows up.
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    pattern: Regex,
    buffer: String,
    done: bool,
}

impl CompletionDetector {
    pub fn new(token: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r#"(?m)^[^"]*{}"#, regex::escape(token)))?;
        Ok(Self {
            pattern,
            buffer: String::new(),
            done: false,
        })
    }

    /// Feed a chunk of output. Returns `true` exactly once, on the chunk
    /// that completes the marker.
    pub fn feed(&mut self, chunk: &str) -> bool {
        if self.done {
            return false;
        }
        self.buffer.push_str(chunk);
        self.done = self.pattern.is_match(&self.buffer);
        self.done
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
