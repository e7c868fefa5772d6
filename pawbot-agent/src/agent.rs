//! The main loop: one agent, one account, one cycle at a time.
//!
//! `NEED_AUTH → AUTHENTICATED → POLLING → IDLE`, forever. Token refresh
//! strictly precedes the profile fetch, which precedes quest listing and
//! per-quest work; every step leans on state the previous one produced.
//! Single task, one in-flight operation — no locking anywhere.

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use pawbot_telegram::TelegramSession;

use crate::backend::BackendClient;
use crate::error::AgentError;
use crate::quests::QuestRunner;
use crate::token::TokenState;
use crate::webview::WebViewAuth;

pub struct AgentConfig {
    pub account: String,
    pub bot_username: String,
    pub app_short_name: String,
    pub auto_task: bool,
    pub referral_code: String,
    /// Sleep between cycles.
    pub idle: Duration,
    /// Backoff after a failed cycle.
    pub cycle_backoff: Duration,
    /// Inter-quest pacing, in seconds.
    pub quest_pacing_secs: RangeInclusive<u64>,
    /// Politeness delay before joining a channel.
    pub join_delay: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            account: "main".into(),
            bot_username: "PAWSOG_bot".into(),
            app_short_name: "PAWS".into(),
            auto_task: true,
            referral_code: String::new(),
            idle: Duration::from_secs(12 * 3600),
            cycle_backoff: Duration::from_secs(3),
            quest_pacing_secs: 2..=10,
            join_delay: Duration::from_secs(3),
        }
    }
}

pub struct Agent<S: TelegramSession> {
    session: S,
    backend: BackendClient,
    webview: WebViewAuth,
    token: TokenState,
    runner: QuestRunner,
    account: String,
    auto_task: bool,
    referral_code: String,
    idle: Duration,
    cycle_backoff: Duration,
}

impl<S: TelegramSession> Agent<S> {
    pub fn new(session: S, backend: BackendClient, config: AgentConfig) -> Self {
        let webview = WebViewAuth::new(
            config.account.clone(),
            config.bot_username,
            config.app_short_name,
        );
        let runner = QuestRunner::new(config.account.clone())
            .with_pacing(config.quest_pacing_secs, config.join_delay);
        Self {
            session,
            backend,
            webview,
            token: TokenState::new(),
            runner,
            account: config.account,
            auto_task: config.auto_task,
            referral_code: config.referral_code,
            idle: config.idle,
            cycle_backoff: config.cycle_backoff,
        }
    }

    /// Re-authenticate when the token is absent or its window elapsed.
    /// On success the backend client carries the new bearer immediately.
    async fn ensure_fresh_token(&mut self) -> Result<(), AgentError> {
        if !self.token.needs_refresh(Instant::now()) {
            return Ok(());
        }
        let init_data = self
            .webview
            .obtain_payload(&mut self.session, &self.referral_code)
            .await?;
        match self.backend.sign_in(&self.referral_code, &init_data).await {
            Some(token) => {
                self.backend.set_bearer(&token);
                self.token.install(token, Instant::now());
                tracing::info!(account = %self.account, "signed in, bearer token refreshed");
                Ok(())
            }
            None => Err(AgentError::Other(anyhow::anyhow!(
                "sign-in yielded no token"
            ))),
        }
    }

    /// One full cycle: refresh if stale, report balance, work the quests.
    pub async fn run_cycle(&mut self) -> Result<(), AgentError> {
        self.ensure_fresh_token().await?;

        let user = self.backend.user_info().await;
        if let Some(balance) = user.get("gameData").and_then(|g| g.get("balance")) {
            tracing::info!(account = %self.account, %balance, "balance");
        }

        if self.auto_task {
            let quests = self.backend.quest_list().await;
            self.runner
                .run(&mut self.session, &self.backend, quests)
                .await;
        }

        Ok(())
    }

    /// Run forever. Returns only on a revoked session; every other error
    /// is logged, backed off, and the loop restarts at the token check.
    pub async fn run(mut self) -> Result<(), AgentError> {
        loop {
            match self.run_cycle().await {
                Ok(()) => {
                    tracing::info!(account = %self.account, idle_secs = self.idle.as_secs(), "cycle done, going to sleep");
                    tokio::time::sleep(self.idle).await;
                }
                Err(AgentError::InvalidSession) => {
                    return Err(AgentError::InvalidSession);
                }
                Err(err) => {
                    tracing::error!(account = %self.account, error = %err, "cycle failed");
                    tokio::time::sleep(self.cycle_backoff).await;
                }
            }
        }
    }
}
