//! Bearer token lifecycle state.
//!
//! At most one valid token exists at a time; installing a new one fully
//! replaces the old. The validity window is drawn once per process from
//! [3500, 3600) seconds so a fleet of agents does not refresh in lockstep
//! against the backend. Tokens are never persisted — a restart starts
//! from scratch.

use std::time::{Duration, Instant};

use rand::Rng;

const WINDOW_MIN_SECS: u64 = 3500;
const WINDOW_MAX_SECS: u64 = 3600;

#[derive(Debug)]
pub struct TokenState {
    token: Option<String>,
    issued_at: Instant,
    window: Duration,
}

impl TokenState {
    /// A fresh state with a randomized validity window and no token.
    pub fn new() -> Self {
        let secs = rand::thread_rng().gen_range(WINDOW_MIN_SECS..WINDOW_MAX_SECS);
        Self::with_window(Duration::from_secs(secs))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            token: None,
            issued_at: Instant::now(),
            window,
        }
    }

    /// True iff no token is held or `now - issued_at >= window`.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.token.is_none() || now.saturating_duration_since(self.issued_at) >= self.window
    }

    /// Replace the token wholesale and restart the clock.
    pub fn install(&mut self, token: String, now: Instant) {
        self.token = Some(token);
        self.issued_at = now;
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for TokenState {
    fn default() -> Self {
        Self::new()
    }
}
