use async_trait::async_trait;
use crate::application::errors::GatewayError;
use crate::domain::entities::{Language, Reply};

/// DeliveryGateway trait - abstraction for the messaging platform's outbound API
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Send a reply addressed by the event's reply token
    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), GatewayError>;

    /// Replace the rich menu linked to a user with the variant for `language`
    async fn attach_rich_menu(&self, user_id: &str, language: Language) -> Result<(), GatewayError>;

    /// Adapter name for logging
    fn name(&self) -> &str;
}
