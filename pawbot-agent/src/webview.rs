//! Mini-app webview handshake: turn the Telegram session into a signed
//! init-data payload the backend will accept.

use std::time::Duration;

use pawbot_telegram::types::{Peer, SelfProfile};
use pawbot_telegram::{TelegramError, TelegramSession};

use crate::error::AgentError;
use crate::payload;

pub struct WebViewAuth {
    account: String,
    bot_username: String,
    app_short_name: String,
    /// Resolved once and cached for the process lifetime; the peer
    /// identity never changes.
    peer: Option<Peer>,
    identity: Option<SelfProfile>,
}

impl WebViewAuth {
    pub fn new(
        account: impl Into<String>,
        bot_username: impl Into<String>,
        app_short_name: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            bot_username: bot_username.into(),
            app_short_name: app_short_name.into(),
            peer: None,
            identity: None,
        }
    }

    /// The account's own profile, once a handshake has captured it.
    pub fn identity(&self) -> Option<&SelfProfile> {
        self.identity.as_ref()
    }

    /// Run the handshake and return the decoded init data.
    ///
    /// Connects the session if the caller had not, and disconnects again
    /// only in that case. A revoked authorization on connect is the one
    /// fatal outcome; flood control on peer resolution is waited out
    /// (`seconds + 3`) and retried without a cap, as the platform demands.
    pub async fn obtain_payload<S: TelegramSession>(
        &mut self,
        session: &mut S,
        start_param: &str,
    ) -> Result<String, AgentError> {
        let was_connected = session.is_connected();
        if !was_connected {
            session.connect().await?;
        }

        let peer = loop {
            if let Some(peer) = &self.peer {
                break peer.clone();
            }
            match session.resolve_peer(&self.bot_username).await {
                Ok(peer) => self.peer = Some(peer),
                Err(TelegramError::FloodWait { seconds }) => {
                    let wait = seconds + 3;
                    tracing::warn!(
                        account = %self.account,
                        wait_secs = wait,
                        "flood wait while resolving peer"
                    );
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Err(err) => return Err(err.into()),
            }
        };

        let webview = session
            .request_webview(&peer, &self.app_short_name, start_param)
            .await?;
        let init_data = payload::extract_init_data(&webview.url)?;

        if self.identity.is_none() {
            match session.get_me().await {
                Ok(me) => {
                    tracing::info!(
                        account = %self.account,
                        user_id = me.id,
                        username = me.username.as_deref().unwrap_or(""),
                        "session identity captured"
                    );
                    self.identity = Some(me);
                }
                Err(err) => {
                    tracing::warn!(account = %self.account, error = %err, "could not fetch own profile");
                }
            }
        }

        if !was_connected {
            let _ = session.disconnect().await;
        }

        Ok(init_data)
    }
}
