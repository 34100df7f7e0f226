//! Decides what happens after transport errors and unexpected closes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Consecutive transport errors tolerated before shutting the client down.
const MAX_TRANSPORT_ERRORS: u32 = 3;

/// Restarts allowed inside [`RESTART_WINDOW`] before giving up.
pub const MAX_RESTART_COUNT: usize = 5;

pub const RESTART_WINDOW: Duration = Duration::from_secs(3 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Keep reading from the connection.
    Continue,
    /// Stop the client.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    DoNotRestart,
    Restart,
}

pub trait ErrorHandler {
    /// `count` is the number of consecutive errors including this one.
    fn error(&mut self, message: &str, count: u32) -> ErrorAction;

    fn closed(&mut self) -> CloseAction;
}

/// Restart on close unless the server keeps dying: after
/// [`MAX_RESTART_COUNT`] closes within [`RESTART_WINDOW`] it stays down.
#[derive(Debug, Default)]
pub struct DefaultErrorHandler {
    restarts: VecDeque<Instant>,
}

impl DefaultErrorHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn closed_at(&mut self, now: Instant) -> CloseAction {
        self.restarts.push_back(now);
        if self.restarts.len() > MAX_RESTART_COUNT {
            self.restarts.pop_front();
        }
        if self.restarts.len() < MAX_RESTART_COUNT {
            return CloseAction::Restart;
        }
        let first = self.restarts.front().copied().unwrap_or(now);
        if now.duration_since(first) <= RESTART_WINDOW {
            CloseAction::DoNotRestart
        } else {
            self.restarts.pop_front();
            CloseAction::Restart
        }
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn error(&mut self, message: &str, count: u32) -> ErrorAction {
        if count > 0 && count <= MAX_TRANSPORT_ERRORS {
            tracing::debug!(count, "Transport error, continuing: {message}");
            ErrorAction::Continue
        } else {
            ErrorAction::Shutdown
        }
    }

    fn closed(&mut self) -> CloseAction {
        self.closed_at(Instant::now())
    }
}
