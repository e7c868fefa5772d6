//! End-to-end cycle tests: scripted Telegram session + mock game backend.
//!
//! The backend is a real axum server on an ephemeral port; the session is
//! an in-process script that records every capability call.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use pawbot_agent::agent::{Agent, AgentConfig};
use pawbot_agent::backend::BackendClient;
use pawbot_agent::error::AgentError;
use pawbot_agent::webview::WebViewAuth;
use pawbot_telegram::types::{ChatInfo, Membership, Peer, SelfProfile, WebViewUrl};
use pawbot_telegram::{TelegramError, TelegramSession};

const WEBVIEW_URL: &str =
    "https://walletbot.me/#tgWebAppData=query_id%3DAA%26user%3D%257B%257D&tgWebAppVersion=7.10";

// ── Scripted session ───────────────────────────────────────────────────

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn contains(&self, entry: &str) -> bool {
        self.0.lock().unwrap().iter().any(|c| c == entry)
    }
}

enum MembershipScript {
    Member,
    NotParticipant,
    Broken,
}

struct MockSession {
    log: CallLog,
    connected: bool,
    flood_waits: VecDeque<u64>,
    membership: MembershipScript,
    revoke_on_connect: bool,
}

impl MockSession {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            connected: false,
            flood_waits: VecDeque::new(),
            membership: MembershipScript::NotParticipant,
            revoke_on_connect: false,
        }
    }
}

impl TelegramSession for MockSession {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), TelegramError> {
        self.log.push("connect");
        if self.revoke_on_connect {
            return Err(TelegramError::SessionRevoked);
        }
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TelegramError> {
        self.log.push("disconnect");
        self.connected = false;
        Ok(())
    }

    async fn resolve_peer(&mut self, username: &str) -> Result<Peer, TelegramError> {
        self.log.push(format!("resolve_peer:{username}"));
        if let Some(seconds) = self.flood_waits.pop_front() {
            return Err(TelegramError::FloodWait { seconds });
        }
        Ok(Peer {
            id: 1,
            access_hash: 2,
        })
    }

    async fn request_webview(
        &mut self,
        _peer: &Peer,
        short_name: &str,
        _start_param: &str,
    ) -> Result<WebViewUrl, TelegramError> {
        self.log.push(format!("request_webview:{short_name}"));
        Ok(WebViewUrl {
            url: WEBVIEW_URL.to_string(),
        })
    }

    async fn get_me(&mut self) -> Result<SelfProfile, TelegramError> {
        self.log.push("get_me");
        Ok(SelfProfile {
            id: 777,
            username: Some("tester".into()),
            ..Default::default()
        })
    }

    async fn get_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError> {
        self.log.push(format!("get_chat:{name}"));
        Ok(ChatInfo {
            id: 100,
            username: Some(name.to_string()),
        })
    }

    async fn get_chat_member(&mut self, chat: &str) -> Result<Membership, TelegramError> {
        self.log.push(format!("get_chat_member:{chat}"));
        match self.membership {
            MembershipScript::Member => Ok(Membership::Member),
            MembershipScript::NotParticipant => Err(TelegramError::NotParticipant),
            MembershipScript::Broken => Err(TelegramError::Other("CHANNEL_PRIVATE".into())),
        }
    }

    async fn join_chat(&mut self, name: &str) -> Result<ChatInfo, TelegramError> {
        self.log.push(format!("join_chat:{name}"));
        Ok(ChatInfo {
            id: 100,
            username: Some(name.to_string()),
        })
    }

    async fn mute_chat(&mut self, chat_id: i64, mute_until: i64) -> Result<(), TelegramError> {
        self.log.push(format!("mute_chat:{chat_id}:{mute_until}"));
        Ok(())
    }
}

// ── Mock backend ───────────────────────────────────────────────────────

#[derive(Clone)]
struct BackendState {
    quests: Arc<Value>,
    completions: Arc<Mutex<Vec<String>>>,
    user_auth_headers: Arc<Mutex<Vec<String>>>,
}

async fn spawn_backend(quests: Value) -> (String, BackendState) {
    let state = BackendState {
        quests: Arc::new(quests),
        completions: Arc::new(Mutex::new(Vec::new())),
        user_auth_headers: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route(
            "/v1/user/auth",
            post(|| async { Json(json!({ "success": true, "data": [{ "token": "abc" }] })) }),
        )
        .route(
            "/v1/user",
            get(|State(state): State<BackendState>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                state.user_auth_headers.lock().unwrap().push(auth);
                Json(json!({ "data": { "gameData": { "balance": 1234 } } }))
            }),
        )
        .route(
            "/v1/quests/list",
            get(|State(state): State<BackendState>| async move {
                Json(json!({ "data": state.quests.as_ref().clone() }))
            }),
        )
        .route(
            "/v1/quests/completed",
            post(|State(state): State<BackendState>, Json(body): Json<Value>| async move {
                let quest_id = body
                    .get("questId")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                state.completions.lock().unwrap().push(quest_id);
                Json(json!({ "message": "ok" }))
            }),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

fn test_config() -> AgentConfig {
    AgentConfig {
        account: "test".into(),
        quest_pacing_secs: 0..=0,
        join_delay: Duration::ZERO,
        ..AgentConfig::default()
    }
}

fn agent_for(base: &str, session: MockSession) -> Agent<MockSession> {
    let backend = BackendClient::new(base, "test", "pawbot-test", None).unwrap();
    Agent::new(session, backend, test_config())
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[tokio::test]
async fn telegram_quest_joins_channel_then_completes() {
    let (base, state) = spawn_backend(json!([{
        "_id": "q1",
        "code": "telegram-join",
        "title": "Join",
        "data": "https://t.me/foo",
        "rewards": [{ "amount": 10 }],
    }]))
    .await;

    let log = CallLog::default();
    let mut agent = agent_for(&base, MockSession::new(log.clone()));
    agent.run_cycle().await.unwrap();

    // Joiner ran against the bare slug, exactly once, before completion.
    assert!(log.contains("get_chat:foo"));
    assert_eq!(log.count("join_chat:foo"), 1);
    assert_eq!(log.count("mute_chat:100:2147483647"), 1);
    assert_eq!(*state.completions.lock().unwrap(), vec!["q1".to_string()]);
}

#[tokio::test]
async fn wallet_and_invite_quests_are_never_completed() {
    let (base, state) = spawn_backend(json!([
        { "_id": "q2", "code": "wallet" },
        { "_id": "q3", "code": "Invite" },
    ]))
    .await;

    let log = CallLog::default();
    let mut agent = agent_for(&base, MockSession::new(log.clone()));
    agent.run_cycle().await.unwrap();

    assert!(state.completions.lock().unwrap().is_empty());
    assert_eq!(log.count("join_chat:"), 0);
}

#[tokio::test]
async fn quest_without_code_still_attempts_completion() {
    let (base, state) = spawn_backend(json!([{ "_id": "q4" }])).await;

    let log = CallLog::default();
    let mut agent = agent_for(&base, MockSession::new(log.clone()));
    agent.run_cycle().await.unwrap();

    assert_eq!(*state.completions.lock().unwrap(), vec!["q4".to_string()]);
    assert_eq!(log.count("join_chat:"), 0);
}

#[tokio::test]
async fn sign_in_token_flows_into_subsequent_calls() {
    let (base, state) = spawn_backend(json!([])).await;

    let log = CallLog::default();
    let mut agent = agent_for(&base, MockSession::new(log));
    agent.run_cycle().await.unwrap();

    // The profile fetch comes after the refresh, so it must carry the
    // bearer the sign-in just returned.
    assert_eq!(
        *state.user_auth_headers.lock().unwrap(),
        vec!["Bearer abc".to_string()]
    );
}

#[tokio::test]
async fn token_is_not_refreshed_while_fresh() {
    let (base, _state) = spawn_backend(json!([])).await;

    let log = CallLog::default();
    let mut agent = agent_for(&base, MockSession::new(log.clone()));
    agent.run_cycle().await.unwrap();
    agent.run_cycle().await.unwrap();

    // One handshake serves both cycles: the window is far from elapsed.
    assert_eq!(log.count("request_webview:"), 1);
}

#[tokio::test]
async fn already_member_channel_is_a_silent_noop() {
    let (base, state) = spawn_backend(json!([{
        "_id": "q1",
        "code": "telegram",
        "data": "https://t.me/foo",
    }]))
    .await;

    let log = CallLog::default();
    let mut session = MockSession::new(log.clone());
    session.membership = MembershipScript::Member;
    let mut agent = agent_for(&base, session);
    agent.run_cycle().await.unwrap();

    assert_eq!(log.count("join_chat:"), 0);
    assert_eq!(log.count("mute_chat:"), 0);
    // Completion still goes through.
    assert_eq!(*state.completions.lock().unwrap(), vec!["q1".to_string()]);
}

#[tokio::test]
async fn broken_membership_check_still_attempts_completion() {
    let (base, state) = spawn_backend(json!([{
        "_id": "q1",
        "code": "telegram",
        "data": "https://t.me/foo",
    }]))
    .await;

    let log = CallLog::default();
    let mut session = MockSession::new(log.clone());
    session.membership = MembershipScript::Broken;
    let mut agent = agent_for(&base, session);
    agent.run_cycle().await.unwrap();

    assert_eq!(log.count("join_chat:"), 0);
    assert_eq!(*state.completions.lock().unwrap(), vec!["q1".to_string()]);
}

#[tokio::test]
async fn revoked_session_is_fatal() {
    let (base, _state) = spawn_backend(json!([])).await;

    let log = CallLog::default();
    let mut session = MockSession::new(log);
    session.revoke_on_connect = true;
    let mut agent = agent_for(&base, session);

    assert!(matches!(
        agent.run_cycle().await,
        Err(AgentError::InvalidSession)
    ));
}

#[tokio::test(start_paused = true)]
async fn flood_wait_sleeps_signal_plus_three_then_retries() {
    // No HTTP here: the handshake alone, under a paused clock.
    let log = CallLog::default();
    let mut session = MockSession::new(log.clone());
    session.flood_waits.push_back(5);

    let mut webview = WebViewAuth::new("test", "PAWSOG_bot", "PAWS");
    let started = tokio::time::Instant::now();
    let init_data = webview.obtain_payload(&mut session, "").await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(8));
    assert_eq!(log.count("resolve_peer:"), 2);
    assert!(init_data.starts_with("query_id="));
}

#[tokio::test]
async fn peer_resolution_is_cached_across_handshakes() {
    let log = CallLog::default();
    let mut session = MockSession::new(log.clone());

    let mut webview = WebViewAuth::new("test", "PAWSOG_bot", "PAWS");
    webview.obtain_payload(&mut session, "").await.unwrap();
    webview.obtain_payload(&mut session, "").await.unwrap();

    assert_eq!(log.count("resolve_peer:"), 1);
    assert_eq!(log.count("request_webview:"), 2);
    // The session was connected and released on each handshake.
    assert_eq!(log.count("connect"), 2);
    assert_eq!(log.count("disconnect"), 2);
}
