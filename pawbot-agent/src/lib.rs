//! Quest automation agent for the PAWS Telegram mini-app.
//!
//! One agent drives one account: it obtains a signed web-app payload
//! through the Telegram session, trades it for a bearer token at the game
//! backend, reports the balance, and works through the reward quest list
//! once per cycle. The loop runs forever; only a revoked session stops it.

pub mod agent;
pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod payload;
pub mod quests;
pub mod token;
pub mod webview;
