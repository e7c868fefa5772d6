//! The capability trait the agent is generic over.

use crate::error::TelegramError;
use crate::types::{ChatInfo, Membership, Peer, SelfProfile, WebViewUrl};

/// Everything the agent needs from a Telegram user session.
///
/// One connection, one in-flight call at a time — the agent is a single
/// task, so implementations take `&mut self` and need no locking.
/// [`crate::BrokerSession`] is the production implementation; tests use
/// scripted mocks.
#[allow(async_fn_in_trait)]
pub trait TelegramSession {
    /// Whether the underlying session currently holds a connection.
    fn is_connected(&self) -> bool;

    /// Connect. Returns [`TelegramError::SessionRevoked`] when the
    /// account's authorization is gone — the caller must treat that as
    /// fatal for the whole agent.
    async fn connect(&mut self) -> Result<(), TelegramError>;

    async fn disconnect(&mut self) -> Result<(), TelegramError>;

    /// Resolve a bot/channel username to a peer reference. Subject to
    /// flood control ([`TelegramError::FloodWait`]).
    async fn resolve_peer(&mut self, username: &str) -> Result<Peer, TelegramError>;

    /// Open the named mini-app of `peer` and return the signed launch URL.
    async fn request_webview(
        &mut self,
        peer: &Peer,
        short_name: &str,
        start_param: &str,
    ) -> Result<WebViewUrl, TelegramError>;

    async fn get_me(&mut self) -> Result<SelfProfile, TelegramError>;

    /// Look up a chat by username or invite slug.
    async fn get_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError>;

    /// Our own membership in `chat`. [`TelegramError::NotParticipant`]
    /// when we have not joined it.
    async fn get_chat_member(&mut self, chat: &str) -> Result<Membership, TelegramError>;

    async fn join_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError>;

    /// Update notification settings for a chat; `mute_until` is a unix
    /// timestamp ([`crate::MUTE_FOREVER`] for a permanent mute).
    async fn mute_chat(&mut self, chat_id: i64, mute_until: i64) -> Result<(), TelegramError>;
}
