//! Telegram session capability surface for pawbot.
//!
//! The agent never speaks MTProto itself. Everything it needs from the
//! platform — resolving the mini-app peer, opening the web view, joining
//! and muting channels — goes through the [`session::TelegramSession`]
//! trait. The shipped implementation, [`broker::BrokerSession`], forwards
//! each call to a local session-broker sidecar that holds the real user
//! session; tests substitute an in-process mock.

pub mod broker;
pub mod error;
pub mod session;
pub mod types;

pub use broker::BrokerSession;
pub use error::TelegramError;
pub use session::TelegramSession;

/// `mute_until` value for a permanent mute (max representable timestamp).
pub const MUTE_FOREVER: i64 = 2_147_483_647;
