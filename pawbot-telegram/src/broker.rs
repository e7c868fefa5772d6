//! HTTP adapter to the local session-broker sidecar.
//!
//! The sidecar owns the actual MTProto user session (login, session file,
//! datacenter migration) and exposes the handful of capability calls the
//! agent needs as a JSON API on localhost. Failures come back as a
//! `{error, seconds?, message?}` envelope with a non-2xx status; this
//! module maps the envelope onto [`TelegramError`] so the agent never
//! sees broker wire details.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::TelegramError;
use crate::session::TelegramSession;
use crate::types::{ChatInfo, Membership, Peer, SelfProfile, WebViewUrl};

/// Broker error envelope.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: String,
    #[serde(default)]
    seconds: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipReply {
    status: Membership,
}

/// [`TelegramSession`] implementation backed by the sidecar.
pub struct BrokerSession {
    base: String,
    http: reqwest::Client,
    connected: bool,
}

impl BrokerSession {
    /// `base` is the sidecar root, e.g. `http://127.0.0.1:8089`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            connected: false,
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, TelegramError> {
        tracing::debug!(path, "broker call");
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Other(format!("broker unreachable: {e}")))?;
        Self::decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TelegramError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .map_err(|e| TelegramError::Other(format!("broker unreachable: {e}")))?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, TelegramError> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| TelegramError::Other(format!("bad broker response: {e}")));
        }
        let env: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
        Err(match env.error.as_str() {
            "FLOOD_WAIT" => TelegramError::FloodWait {
                seconds: env.seconds.unwrap_or(0),
            },
            // Pyrogram-style revocation classes collapse into one fatal signal.
            "SESSION_REVOKED" | "UNAUTHORIZED" | "USER_DEACTIVATED" | "AUTH_KEY_UNREGISTERED" => {
                TelegramError::SessionRevoked
            }
            "USER_NOT_PARTICIPANT" => TelegramError::NotParticipant,
            other => TelegramError::Other(format!(
                "broker error {status}: {}",
                env.message
                    .as_deref()
                    .unwrap_or(if other.is_empty() { body.as_str() } else { other })
            )),
        })
    }
}

impl TelegramSession for BrokerSession {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.post("/connect", json!({})).await?;
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.post("/disconnect", json!({})).await?;
        self.connected = false;
        Ok(())
    }

    async fn resolve_peer(&mut self, username: &str) -> Result<Peer, TelegramError> {
        self.post("/resolve-peer", json!({ "username": username })).await
    }

    async fn request_webview(
        &mut self,
        peer: &Peer,
        short_name: &str,
        start_param: &str,
    ) -> Result<WebViewUrl, TelegramError> {
        self.post(
            "/webview",
            json!({
                "peer": peer,
                "short_name": short_name,
                "start_param": start_param,
                "platform": "android",
            }),
        )
        .await
    }

    async fn get_me(&mut self) -> Result<SelfProfile, TelegramError> {
        self.get("/me").await
    }

    async fn get_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError> {
        self.post("/chat", json!({ "name": name })).await
    }

    async fn get_chat_member(&mut self, chat: &str) -> Result<Membership, TelegramError> {
        let reply: MembershipReply = self.post("/chat-member", json!({ "chat": chat })).await?;
        Ok(reply.status)
    }

    async fn join_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError> {
        self.post("/join", json!({ "name": name })).await
    }

    async fn mute_chat(&mut self, chat_id: i64, mute_until: i64) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .post(
                "/notify-settings",
                json!({ "chat_id": chat_id, "mute_until": mute_until }),
            )
            .await?;
        Ok(())
    }
}
