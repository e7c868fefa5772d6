//! Game backend HTTP client.
//!
//! Four stateless JSON operations over one session-scoped `reqwest`
//! client. The bearer token lives here as an explicit slot mutated only
//! through [`BackendClient::set_bearer`] — no hidden global header state.
//!
//! Every operation runs behind a uniform error boundary: transport and
//! decoding failures are logged, followed by a 1-second pause, and the
//! call yields nothing. Callers treat "nothing" as "this attempt did not
//! succeed", never as a distinguishable error.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::quests::Quest;

#[derive(Debug, Default, Deserialize)]
struct AuthEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct QuestsEnvelope {
    #[serde(default)]
    data: Vec<Quest>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletedEnvelope {
    #[serde(default)]
    message: Option<String>,
}

/// The backend has shipped both `data: ["<token>"]` and
/// `data: [{"token": "<token>"}]` for sign-in; accept either.
fn token_from(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string),
        _ => None,
    }
}

pub struct BackendClient {
    http: reqwest::Client,
    base: String,
    bearer: Option<String>,
    account: String,
}

impl BackendClient {
    /// TLS certificate validation is disabled on purpose: the backend
    /// fronts sit behind anti-bot proxies with rotating certificates.
    pub fn new(
        base_url: &str,
        account: &str,
        user_agent: &str,
        proxy: Option<&str>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("invalid user-agent string")?,
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30));
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy).context("invalid proxy url")?);
        }

        Ok(Self {
            http: builder.build().context("building http client")?,
            base: base_url.trim_end_matches('/').to_string(),
            bearer: None,
            account: account.to_string(),
        })
    }

    /// Install the bearer token used by every subsequent call.
    pub fn set_bearer(&mut self, token: &str) {
        self.bearer = Some(token.to_string());
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, format!("{}{path}", self.base));
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        req
    }

    /// The uniform error boundary: log, pause 1 s, yield nothing.
    async fn absorb<T>(&self, op: &str, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(account = %self.account, op, error = %err, "backend call failed");
                tokio::time::sleep(Duration::from_secs(1)).await;
                None
            }
        }
    }

    /// `POST /v1/user/auth` — exchange the signed web-app payload for a
    /// bearer token. `None` when the backend refuses (`success: false`)
    /// or the attempt fails outright.
    pub async fn sign_in(&self, referral_code: &str, init_data: &str) -> Option<String> {
        let result = async {
            let env: AuthEnvelope = self
                .request(Method::POST, "/v1/user/auth")
                .json(&json!({ "referralCode": referral_code, "data": init_data }))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            if !env.success {
                return Ok(None);
            }
            anyhow::Ok(env.data.first().and_then(token_from))
        }
        .await;
        self.absorb("sign-in", result).await.flatten()
    }

    /// `GET /v1/user` — the profile object; empty mapping when absent.
    pub async fn user_info(&self) -> serde_json::Map<String, serde_json::Value> {
        let result = async {
            let env: UserEnvelope = self
                .request(Method::GET, "/v1/user")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            anyhow::Ok(env.data)
        }
        .await;
        self.absorb("user-info", result).await.unwrap_or_default()
    }

    /// `GET /v1/quests/list` — fresh quest list; empty when absent.
    pub async fn quest_list(&self) -> Vec<Quest> {
        let result = async {
            let env: QuestsEnvelope = self
                .request(Method::GET, "/v1/quests/list")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            anyhow::Ok(env.data)
        }
        .await;
        self.absorb("quest-list", result).await.unwrap_or_default()
    }

    /// `POST /v1/quests/completed` — the confirmation message, if any.
    pub async fn complete_quest(&self, quest_id: &str) -> Option<String> {
        let result = async {
            let env: CompletedEnvelope = self
                .request(Method::POST, "/v1/quests/completed")
                .json(&json!({ "questId": quest_id }))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            anyhow::Ok(env.message)
        }
        .await;
        self.absorb("complete-quest", result).await.flatten()
    }
}
