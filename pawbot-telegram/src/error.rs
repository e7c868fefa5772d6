//! Error taxonomy for session capability calls.

/// Errors surfaced by a [`crate::TelegramSession`] implementation.
///
/// Only `SessionRevoked` is fatal for the agent; `FloodWait` carries the
/// platform-mandated cooldown and everything else is transient.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The account's authorization was revoked or deactivated. The agent
    /// owning this session must terminate — retrying cannot help.
    #[error("session authorization revoked")]
    SessionRevoked,

    /// Platform rate limit: wait at least `seconds` before retrying.
    #[error("flood wait: retry after {seconds}s")]
    FloodWait { seconds: u64 },

    /// Membership check result for a chat we have not joined.
    #[error("not a participant of the chat")]
    NotParticipant,

    /// Anything else: transport failures, unexpected broker responses,
    /// platform errors with no dedicated handling.
    #[error("{0}")]
    Other(String),
}

impl TelegramError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TelegramError::SessionRevoked)
    }
}
