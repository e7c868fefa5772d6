//! Agent-level error boundary.

use pawbot_telegram::TelegramError;

use crate::payload::PayloadError;

/// The only error classes that cross the main-loop boundary.
///
/// `InvalidSession` terminates the agent; everything else is absorbed by
/// the cycle-level handler (log, 3 s backoff, continue).
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("telegram session is no longer authorized")]
    InvalidSession,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TelegramError> for AgentError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::SessionRevoked => AgentError::InvalidSession,
            other => AgentError::Other(anyhow::Error::new(other)),
        }
    }
}

impl From<PayloadError> for AgentError {
    fn from(err: PayloadError) -> Self {
        AgentError::Other(anyhow::Error::new(err))
    }
}
