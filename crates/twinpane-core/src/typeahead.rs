//! Incremental type-ahead search over a pane's rows.

use std::time::{Duration, Instant};

/// Accumulates typed characters until the user pauses.
#[derive(Debug, Clone)]
pub struct TypeAhead {
    buffer: String,
    last_key: Option<Instant>,
    timeout: Duration,
}

impl TypeAhead {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffer: String::new(),
            last_key: None,
            timeout,
        }
    }

    /// Characters that take part in type-ahead.
    pub fn accepts(c: char) -> bool {
        c.is_ascii_alphanumeric()
    }

    /// Current buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Drop the buffer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key = None;
    }

    /// Append a keystroke at time `now`, restarting the buffer if the
    /// previous keystroke is older than the timeout.
    pub fn push(&mut self, c: char, now: Instant) -> &str {
        let expired = self
            .last_key
            .is_none_or(|last| now.saturating_duration_since(last) >= self.timeout);
        if expired {
            self.buffer.clear();
        }
        self.buffer.push(c.to_ascii_lowercase());
        self.last_key = Some(now);
        &self.buffer
    }

    /// Index of the first name starting with the buffer, case-insensitively.
    pub fn find<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<usize> {
        if self.buffer.is_empty() {
            return None;
        }
        names
            .into_iter()
            .position(|name| name.to_lowercase().starts_with(&self.buffer))
    }
}
