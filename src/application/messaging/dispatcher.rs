//! Event dispatcher - Routes platform events through the language state machine

use std::sync::Arc;

use crate::application::catalog;
use crate::application::errors::{BotError, StorageError};
use crate::domain::entities::{InboundEvent, Language, Reply, LANGUAGE_KEY};
use crate::domain::traits::{DeliveryGateway, UserStore};

use super::intent;
use super::state_machine;

/// Event dispatcher - loads user state, runs the transition, persists and replies
#[derive(Clone)]
pub struct EventDispatcher {
    store: Arc<dyn UserStore>,
    gateway: Arc<dyn DeliveryGateway>,
}

impl EventDispatcher {
    pub fn new(store: Arc<dyn UserStore>, gateway: Arc<dyn DeliveryGateway>) -> Self {
        tracing::debug!("Dispatching through the {} gateway", gateway.name());
        Self { store, gateway }
    }

    /// Handle one event to completion. Returns the reply that was sent, if any.
    pub async fn dispatch(&self, event: &InboundEvent) -> Result<Option<Reply>, BotError> {
        match event {
            InboundEvent::Follow { user_id, reply_token, .. } => {
                self.store.create(user_id).await?;
                let reply = self.prompt_language(user_id).await?;
                self.gateway.reply(reply_token, &reply).await?;
                Ok(Some(reply))
            }
            InboundEvent::Unfollow { user_id, .. } => {
                self.store.delete(user_id).await?;
                Ok(None)
            }
            InboundEvent::TextMessage { user_id, reply_token, text, .. } => {
                let state = self.current_language(user_id).await?;
                let intent = intent::resolve(text);
                tracing::debug!("[{}] state={} intent={:?}", user_id, state, intent);

                let step = state_machine::step(state, intent);
                if let Some(next) = step.next {
                    self.store.set(user_id, LANGUAGE_KEY, next.as_str()).await?;
                    tracing::info!("[{}] language {} -> {}", user_id, state, next);
                }
                if let Some(locale) = step.rich_menu {
                    self.gateway.attach_rich_menu(user_id, locale.into()).await?;
                }
                self.gateway.reply(reply_token, &step.reply).await?;
                Ok(Some(step.reply))
            }
        }
    }

    /// Stored language of a user
    pub async fn current_language(&self, user_id: &str) -> Result<Language, StorageError> {
        let raw = self.store.load(user_id, LANGUAGE_KEY).await?;
        raw.parse::<Language>().map_err(StorageError::InvalidValue)
    }

    /// Reset the user to `unset` and build the language choice prompt
    async fn prompt_language(&self, user_id: &str) -> Result<Reply, BotError> {
        self.store.set(user_id, LANGUAGE_KEY, Language::Unset.as_str()).await?;
        Ok(catalog::choose_language_prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog::Topic;
    use crate::application::errors::GatewayError;
    use crate::domain::entities::Locale;
    use crate::infrastructure::storage::JsonStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        replies: Mutex<Vec<(String, Reply)>>,
        menus: Mutex<Vec<(String, Language)>>,
    }

    #[async_trait]
    impl DeliveryGateway for RecordingGateway {
        async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), GatewayError> {
            self.replies.lock().unwrap().push((reply_token.to_string(), reply.clone()));
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

    fn dispatcher() -> (EventDispatcher, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = EventDispatcher::new(Arc::new(JsonStore::in_memory()), gateway.clone());
        (dispatcher, gateway)
    }

    #[tokio::test]
    async fn follow_creates_unset_user_and_prompts() {
        let (d, gw) = dispatcher();
        let reply = d.dispatch(&InboundEvent::follow("U1", "t1")).await.unwrap();

        assert_eq!(reply, Some(catalog::choose_language_prompt()));
        assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);
        assert_eq!(gw.replies.lock().unwrap()[0].0, "t1");
    }

    #[tokio::test]
    async fn selecting_language_swaps_menu() {
        let (d, gw) = dispatcher();
        d.dispatch(&InboundEvent::follow("U1", "t1")).await.unwrap();
        let reply = d.dispatch(&InboundEvent::text("U1", "t2", "中文")).await.unwrap().unwrap();

        assert_eq!(reply.text, catalog::reply_for(Locale::Chinese, Topic::SetLanguage));
        assert_eq!(d.current_language("U1").await.unwrap(), Language::Chinese);
        assert_eq!(*gw.menus.lock().unwrap(), vec![("U1".to_string(), Language::Chinese)]);
    }

    #[tokio::test]
    async fn change_language_resets_state() {
        let (d, _) = dispatcher();
        d.dispatch(&InboundEvent::follow("U1", "t1")).await.unwrap();
        d.dispatch(&InboundEvent::text("U1", "t2", "English")).await.unwrap();
        d.dispatch(&InboundEvent::text("U1", "t3", "Lab")).await.unwrap();
        let reply = d.dispatch(&InboundEvent::text("U1", "t4", "Set Language")).await.unwrap();

        assert_eq!(reply, Some(catalog::choose_language_prompt()));
        assert_eq!(d.current_language("U1").await.unwrap(), Language::Unset);
    }

    #[tokio::test]
    async fn text_from_unknown_user_is_not_found() {
        let (d, gw) = dispatcher();
        let err = d.dispatch(&InboundEvent::text("ghost", "t1", "hi")).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(gw.replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unfollow_sends_nothing() {
        let (d, gw) = dispatcher();
        d.dispatch(&InboundEvent::follow("U1", "t1")).await.unwrap();
        let reply = d.dispatch(&InboundEvent::unfollow("U1")).await.unwrap();

        assert_eq!(reply, None);
        assert_eq!(gw.replies.lock().unwrap().len(), 1);
        assert!(d.current_language("U1").await.is_err());
    }
}
