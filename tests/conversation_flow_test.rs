//! Conversation flow integration tests
//! Run with: cargo test --test conversation_flow_test

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};

use line_intro_bot::application::catalog::{self, Topic};
use line_intro_bot::application::errors::GatewayError;
use line_intro_bot::application::messaging::EventDispatcher;
use line_intro_bot::domain::entities::{InboundEvent, Language, Locale, Reply};
use line_intro_bot::domain::traits::{DeliveryGateway, UserStore};
use line_intro_bot::infrastructure::database::SqliteStore;
use line_intro_bot::infrastructure::storage::JsonStore;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Gateway that remembers everything it was asked to deliver
#[derive(Default)]
struct RecordingGateway {
    replies: Mutex<Vec<Reply>>,
    menus: Mutex<Vec<(String, Language)>>,
}

#[async_trait]
impl DeliveryGateway for RecordingGateway {
    async fn reply(&self, _reply_token: &str, reply: &Reply) -> Result<(), GatewayError> {
        self.replies.lock().unwrap().push(reply.clone());
        Ok(())
    }

    async fn attach_rich_menu(&self, user_id: &str, language: Language) -> Result<(), GatewayError> {
        self.menus.lock().unwrap().push((user_id.to_string(), language));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn setup(store: Arc<dyn UserStore>) -> (EventDispatcher, Arc<RecordingGateway>) {
    ensure_init();
    let gateway = Arc::new(RecordingGateway::default());
    (EventDispatcher::new(store, gateway.clone()), gateway)
}

async fn send(d: &EventDispatcher, user: &str, text: &str) -> Reply {
    d.dispatch(&InboundEvent::text(user, "token", text))
        .await
        .expect("dispatch")
        .expect("reply")
}

/// Follow, pick English, ask about the lab, chat, unfollow
#[tokio::test]
async fn test_full_english_conversation() {
    let (d, gateway) = setup(Arc::new(JsonStore::in_memory()));

    let reply = d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();
    assert_eq!(reply, Some(catalog::choose_language_prompt()));
    assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);

    let reply = send(&d, "U1", "English").await;
    assert_eq!(reply.text, catalog::reply_for(Locale::English, Topic::SetLanguage));
    assert_eq!(d.current_language("U1").await.unwrap(), Language::English);
    assert_eq!(*gateway.menus.lock().unwrap(), vec![("U1".to_string(), Language::English)]);

    let reply = send(&d, "U1", "Lab").await;
    assert_eq!(reply.text, catalog::reply_for(Locale::English, Topic::Lab));

    let reply = send(&d, "U1", "anything else").await;
    assert_eq!(reply, catalog::self_introduction(Locale::English));
    assert_eq!(reply.emojis.len(), 1);

    let reply = d.dispatch(&InboundEvent::unfollow("U1")).await.unwrap();
    assert_eq!(reply, None);
    assert!(d.current_language("U1").await.is_err());
    assert_eq!(gateway.replies.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_non_selector_text_keeps_user_unset() {
    let (d, gateway) = setup(Arc::new(JsonStore::in_memory()));
    d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();

    for text in ["hello", "english", "Set Language", "Internship Experience", "中文 "] {
        let reply = send(&d, "U1", text).await;
        assert_eq!(reply, catalog::invalid_selection_prompt());
        assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);
    }
    assert!(gateway.menus.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_change_language_after_topics() {
    let (d, _) = setup(Arc::new(JsonStore::in_memory()));
    d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();
    send(&d, "U1", "中文").await;
    send(&d, "U1", "實習經驗").await;
    send(&d, "U1", "隨便聊聊").await;

    let reply = send(&d, "U1", "設定語言").await;
    assert_eq!(reply, catalog::choose_language_prompt());
    assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);

    send(&d, "U1", "English").await;
    assert_eq!(d.current_language("U1").await.unwrap(), Language::English);
}

#[tokio::test]
async fn test_topic_lookup_is_repeatable() {
    let (d, _) = setup(Arc::new(JsonStore::in_memory()));
    d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();
    send(&d, "U1", "中文").await;

    let first = send(&d, "U1", "Internship Experience").await;
    let second = send(&d, "U1", "Internship Experience").await;
    assert_eq!(first, second);
    assert_eq!(first.text, catalog::reply_for(Locale::Chinese, Topic::Internship));
    assert_eq!(d.current_language("U1").await.unwrap(), Language::Chinese);
}

#[tokio::test]
async fn test_refollow_starts_fresh() {
    for store in [
        Arc::new(JsonStore::in_memory()) as Arc<dyn UserStore>,
        Arc::new(SqliteStore::in_memory().unwrap()) as Arc<dyn UserStore>,
    ] {
        let (d, _) = setup(store);
        d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();
        send(&d, "U1", "English").await;
        d.dispatch(&InboundEvent::unfollow("U1")).await.unwrap();
        d.dispatch(&InboundEvent::follow("U1", "token")).await.unwrap();

        assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);
        let reply = send(&d, "U1", "Lab").await;
        assert_eq!(reply, catalog::invalid_selection_prompt());
    }
}

#[tokio::test]
async fn test_message_before_follow_is_not_found() {
    let (d, gateway) = setup(Arc::new(JsonStore::in_memory()));
    let err = d
        .dispatch(&InboundEvent::text("U9", "token", "English"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(gateway.replies.lock().unwrap().is_empty());
    assert!(gateway.menus.lock().unwrap().is_empty());
}

/// Concurrent users must not overwrite each other's language
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_users_keep_their_language() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("db.json");
    let sqlite_path = dir.path().join("users.db");

    let json = Arc::new(JsonStore::open(&json_path).await.unwrap()) as Arc<dyn UserStore>;
    let sqlite = Arc::new(SqliteStore::open(&sqlite_path).unwrap()) as Arc<dyn UserStore>;

    for store in [json, sqlite] {
        let (d, _) = setup(store);

        let mut tasks = Vec::new();
        for i in 0..24 {
            let d = d.clone();
            tasks.push(tokio::spawn(async move {
                let user = format!("U{}", i);
                let selector = if i % 2 == 0 { "English" } else { "中文" };
                d.dispatch(&InboundEvent::follow(user.as_str(), "token")).await.unwrap();
                d.dispatch(&InboundEvent::text(user.as_str(), "token", selector)).await.unwrap();
                d.dispatch(&InboundEvent::text(user.as_str(), "token", "Lab")).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }

    let reopened = [
        Arc::new(JsonStore::open(&json_path).await.unwrap()) as Arc<dyn UserStore>,
        Arc::new(SqliteStore::open(&sqlite_path).unwrap()) as Arc<dyn UserStore>,
    ];
    for store in reopened {
        let (check, _) = setup(store);
        for i in 0..24 {
            let expected = if i % 2 == 0 { Language::English } else { Language::Chinese };
            assert_eq!(check.current_language(&format!("U{}", i)).await.unwrap(), expected);
        }
    }
}
