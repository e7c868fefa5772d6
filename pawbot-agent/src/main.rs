//! pawbot: single-account quest automation agent.
//!
//! Requires a running session-broker sidecar holding the Telegram user
//! session (see `pawbot-telegram`). The agent itself only talks JSON to
//! the broker and to the game backend.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pawbot_telegram::BrokerSession;

use pawbot_agent::agent::{Agent, AgentConfig};
use pawbot_agent::backend::BackendClient;
use pawbot_agent::config::Args;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawbot=info".into()),
        )
        .init();

    let args = Args::parse();

    let backend = BackendClient::new(
        &args.api_base,
        &args.account,
        &args.user_agent,
        args.proxy.as_deref(),
    )?;
    let session = BrokerSession::new(&args.broker_url);

    let config = AgentConfig {
        account: args.account.clone(),
        bot_username: args.bot_username.clone(),
        app_short_name: args.app_short_name.clone(),
        auto_task: args.auto_task,
        referral_code: args.referral_code().to_string(),
        idle: Duration::from_secs(args.idle_secs),
        ..AgentConfig::default()
    };

    tracing::info!(
        account = %args.account,
        broker = %args.broker_url,
        api = %args.api_base,
        "starting pawbot"
    );

    // Only a revoked session ever comes back out of the loop.
    if let Err(err) = Agent::new(session, backend, config).run().await {
        tracing::error!(account = %args.account, error = %err, "agent terminated");
    }

    Ok(())
}
