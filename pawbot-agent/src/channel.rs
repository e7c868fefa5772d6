//! Channel join-and-mute capability used by telegram-category quests.

use std::time::Duration;

use pawbot_telegram::{TelegramError, TelegramSession, MUTE_FOREVER};

/// Strip the `https://t.me/` prefix down to a bare channel slug.
pub fn normalize_link(link: &str) -> &str {
    link.strip_prefix("https://t.me/").unwrap_or(link)
}

/// Join the linked channel and mute it permanently.
///
/// Already being a member is the common case and a silent no-op. A
/// "not a participant" membership check waits out a politeness delay,
/// joins, then mutes; a failed mute only logs. Every other failure is
/// logged and the attempt is considered finished — the caller goes on to
/// submit the quest completion regardless.
pub async fn join_and_mute<S: TelegramSession>(
    session: &mut S,
    account: &str,
    link: &str,
    politeness_delay: Duration,
) {
    let slug = normalize_link(link);

    let was_connected = session.is_connected();
    if !was_connected {
        if let Err(err) = session.connect().await {
            tracing::error!(account, channel = slug, error = %err, "connect failed for channel task");
            return;
        }
    }

    match session.get_chat(slug).await {
        Ok(chat) => {
            let handle = chat.username.clone().unwrap_or_else(|| slug.to_string());
            match session.get_chat_member(&handle).await {
                Ok(_) => {} // already a member
                Err(TelegramError::NotParticipant) => {
                    tokio::time::sleep(politeness_delay).await;
                    match session.join_chat(slug).await {
                        Ok(joined) => {
                            tracing::info!(
                                account,
                                channel = %joined.username.as_deref().unwrap_or(slug),
                                "joined channel"
                            );
                            match session.mute_chat(chat.id, MUTE_FOREVER).await {
                                Ok(()) => {
                                    tracing::info!(account, channel = %handle, "muted channel")
                                }
                                Err(err) => {
                                    tracing::info!(account, channel = %handle, error = %err, "failed to mute channel")
                                }
                            }
                        }
                        Err(err) => {
                            tracing::error!(account, channel = slug, error = %err, "failed to join channel")
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(account, channel = %handle, error = %err, "membership check failed")
                }
            }
        }
        Err(err) => {
            tracing::error!(account, channel = slug, error = %err, "chat lookup failed")
        }
    }

    if !was_connected {
        let _ = session.disconnect().await;
    }
}
