//! Quest model and the per-cycle quest runner.

use std::ops::RangeInclusive;
use std::time::Duration;

use pawbot_telegram::TelegramSession;
use rand::Rng;
use serde::Deserialize;

use crate::backend::BackendClient;
use crate::channel;

/// A reward quest as the backend lists it. Fetched fresh every cycle,
/// never cached across cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct Quest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Channel link for telegram-category quests.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub amount: f64,
}

impl Quest {
    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    fn reward_amount(&self) -> f64 {
        self.rewards.first().map(|r| r.amount).unwrap_or(0.0)
    }
}

/// How a quest's category code dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKind {
    /// Join (and mute) the linked channel, then complete.
    Telegram,
    /// Requires external action (wallet, invite); never completed here.
    Manual,
    /// Straight completion attempt.
    Plain,
}

/// Classify by category code. An absent code falls through to a plain
/// completion attempt; the backend has shipped quests without one, so we
/// keep that tolerated rather than erroring (contract risk, see DESIGN.md).
pub fn classify(code: Option<&str>) -> QuestKind {
    let Some(code) = code else {
        return QuestKind::Plain;
    };
    let code = code.to_ascii_lowercase();
    if code.contains("telegram") {
        QuestKind::Telegram
    } else if code == "wallet" || code == "invite" {
        QuestKind::Manual
    } else {
        QuestKind::Plain
    }
}

/// Runs one pass over the quest list, in backend order.
pub struct QuestRunner {
    account: String,
    /// Seconds slept between quests, drawn uniformly per quest.
    pacing_secs: RangeInclusive<u64>,
    /// Politeness delay before joining a channel.
    join_delay: Duration,
}

impl QuestRunner {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            pacing_secs: 2..=10,
            join_delay: Duration::from_secs(3),
        }
    }

    pub fn with_pacing(mut self, pacing_secs: RangeInclusive<u64>, join_delay: Duration) -> Self {
        self.pacing_secs = pacing_secs;
        self.join_delay = join_delay;
        self
    }

    /// One cycle: dispatch side effects and submit completions. Failures
    /// are logged per quest and never abort the pass.
    pub async fn run<S: TelegramSession>(
        &self,
        session: &mut S,
        backend: &BackendClient,
        quests: Vec<Quest>,
    ) {
        for quest in quests {
            match classify(quest.code.as_deref()) {
                QuestKind::Telegram => match quest.data.as_deref() {
                    Some(link) => {
                        channel::join_and_mute(session, &self.account, link, self.join_delay)
                            .await;
                    }
                    None => {
                        tracing::warn!(
                            account = %self.account,
                            quest = %quest.title(),
                            "telegram quest without a channel link"
                        );
                    }
                },
                QuestKind::Manual => continue,
                QuestKind::Plain => {}
            }

            match backend.complete_quest(&quest.id).await {
                Some(message) if !message.is_empty() => {
                    tracing::info!(
                        account = %self.account,
                        quest = %quest.title(),
                        reward = quest.reward_amount(),
                        "quest completed"
                    );
                }
                _ => {
                    tracing::warn!(
                        account = %self.account,
                        quest = %quest.title(),
                        "quest completion did not succeed this attempt"
                    );
                }
            }

            let pause = rand::thread_rng().gen_range(self.pacing_secs.clone());
            tokio::time::sleep(Duration::from_secs(pause)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_is_a_substring_match() {
        assert_eq!(classify(Some("telegram")), QuestKind::Telegram);
        assert_eq!(classify(Some("telegram-join")), QuestKind::Telegram);
        assert_eq!(classify(Some("TELEGRAM_BOOST")), QuestKind::Telegram);
    }

    #[test]
    fn wallet_and_invite_are_exact_matches() {
        assert_eq!(classify(Some("wallet")), QuestKind::Manual);
        assert_eq!(classify(Some("Invite")), QuestKind::Manual);
        // Only the exact code skips; variants fall through.
        assert_eq!(classify(Some("wallet-connect")), QuestKind::Plain);
    }

    #[test]
    fn missing_code_falls_through_to_completion() {
        assert_eq!(classify(None), QuestKind::Plain);
        assert_eq!(classify(Some("twitter")), QuestKind::Plain);
    }

    #[test]
    fn quest_decodes_from_backend_shape() {
        let quest: Quest = serde_json::from_str(
            r#"{"_id":"q1","code":"telegram-join","title":"Join","data":"https://t.me/foo","rewards":[{"amount":10}]}"#,
        )
        .unwrap();
        assert_eq!(quest.id, "q1");
        assert_eq!(quest.data.as_deref(), Some("https://t.me/foo"));
        assert_eq!(quest.reward_amount(), 10.0);
    }

    #[test]
    fn quest_tolerates_sparse_fields() {
        let quest: Quest = serde_json::from_str(r#"{"_id":"q2"}"#).unwrap();
        assert_eq!(quest.code, None);
        assert_eq!(quest.title(), "q2");
        assert_eq!(quest.reward_amount(), 0.0);
    }
}
