//! CLI/environment configuration surface.

use clap::Parser;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/128.0.6613.99 Mobile Safari/537.36";

#[derive(Debug, Parser)]
#[command(name = "pawbot", about = "Quest automation agent for the PAWS Telegram mini-app")]
pub struct Args {
    /// Session-broker sidecar URL.
    #[arg(long, env = "PAWBOT_BROKER_URL", default_value = "http://127.0.0.1:8089")]
    pub broker_url: String,

    /// Game backend base URL.
    #[arg(long, env = "PAWBOT_API_BASE", default_value = "https://api.paws.community")]
    pub api_base: String,

    /// Account label used in every log line.
    #[arg(long, env = "PAWBOT_ACCOUNT", default_value = "main")]
    pub account: String,

    /// Mini-app bot username.
    #[arg(long, default_value = "PAWSOG_bot")]
    pub bot_username: String,

    /// Mini-app short name.
    #[arg(long, default_value = "PAWS")]
    pub app_short_name: String,

    /// Work the quest list each cycle.
    #[arg(long, env = "PAWBOT_AUTO_TASK", default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_task: bool,

    /// Send a referral code on sign-in and in the webview start param.
    #[arg(long, env = "PAWBOT_USE_REF")]
    pub use_ref: bool,

    /// Referral code to send when --use-ref is set.
    #[arg(long, env = "PAWBOT_REF_CODE", default_value = "")]
    pub ref_code: String,

    /// Outbound proxy URL for backend calls.
    #[arg(long, env = "PAWBOT_PROXY")]
    pub proxy: Option<String>,

    /// User-agent header for backend calls.
    #[arg(long, env = "PAWBOT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Seconds to sleep between cycles.
    #[arg(long, env = "PAWBOT_IDLE_SECS", default_value_t = 12 * 3600)]
    pub idle_secs: u64,
}

impl Args {
    /// Active referral code: the configured one when enabled, else none.
    pub fn referral_code(&self) -> &str {
        if self.use_ref && !self.ref_code.is_empty() {
            &self.ref_code
        } else {
            ""
        }
    }
}
