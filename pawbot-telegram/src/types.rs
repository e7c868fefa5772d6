//! Shared types for session capability calls.

use serde::{Deserialize, Serialize};

/// A resolved peer reference. Opaque to the agent; the broker hands it
/// back on webview requests so it never re-resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: i64,
    pub access_hash: i64,
}

/// The account's own profile, fetched once per process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfProfile {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A chat/channel looked up by username or invite slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Our membership status in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Member,
    Administrator,
    Owner,
}

/// Result of a mini-app webview open: the signed launch URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebViewUrl {
    pub url: String,
}
