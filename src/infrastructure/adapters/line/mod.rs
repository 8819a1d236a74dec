//! LINE Messaging API adapter

pub mod webhook;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::application::catalog::{menu_labels, MenuLabels};
use crate::application::errors::GatewayError;
use crate::domain::entities::{Emoji, Language, Locale, Reply};
use crate::domain::traits::DeliveryGateway;
use crate::infrastructure::config::{LineConfig, RichMenuConfig};

/// Rich menu canvas, one row of three tappable areas
const MENU_WIDTH: u32 = 2500;
const MENU_HEIGHT: u32 = 833;
const MENU_NAME: &str = "intro richmenu";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quick_reply: Option<QuickReplyPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    emojis: Vec<Emoji>,
}

#[derive(Debug, Serialize)]
struct QuickReplyPayload {
    items: Vec<QuickReplyButton>,
}

#[derive(Debug, Serialize)]
struct QuickReplyButton {
    #[serde(rename = "type")]
    kind: &'static str,
    action: MessageAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageAction {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    text: String,
}

impl MessageAction {
    fn new(label: Option<&str>, text: &str) -> Self {
        Self {
            kind: "message",
            label: label.map(str::to_string),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichMenu {
    pub size: MenuSize,
    pub selected: bool,
    pub name: String,
    pub chat_bar_text: String,
    pub areas: Vec<MenuArea>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuArea {
    pub bounds: MenuBounds,
    pub action: MessageAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RichMenu {
    /// Menu for one locale: change language, internship, lab
    pub fn for_locale(locale: Locale) -> Self {
        let MenuLabels { chat_bar, change_language, internship, lab } = *menu_labels(locale);
        let area = |x: u32, width: u32, text: &str| MenuArea {
            bounds: MenuBounds { x, y: 0, width, height: MENU_HEIGHT },
            action: MessageAction::new(None, text),
        };

        Self {
            size: MenuSize { width: MENU_WIDTH, height: MENU_HEIGHT },
            selected: false,
            name: MENU_NAME.to_string(),
            chat_bar_text: chat_bar.to_string(),
            areas: vec![
                area(0, 833, change_language),
                area(833, 833, internship),
                area(1666, 834, lab),
            ],
        }
    }
}

/// LINE gateway - replies and rich menu management over the Messaging API
pub struct LineAdapter {
    client: Client,
    access_token: String,
    api_base: String,
    data_api_base: String,
    images: RichMenuConfig,
    /// Rich menu id per locale, created on first use
    menus: Mutex<HashMap<Locale, String>>,
}

impl LineAdapter {
    pub fn new(access_token: impl Into<String>, line: &LineConfig, images: RichMenuConfig) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            api_base: line.api_base.trim_end_matches('/').to_string(),
            data_api_base: line.data_api_base.trim_end_matches('/').to_string(),
            images,
            menus: Mutex::new(HashMap::new()),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/{}", self.api_base, path)
    }

    fn image_path(&self, locale: Locale) -> &PathBuf {
        match locale {
            Locale::English => &self.images.english_image,
            Locale::Chinese => &self.images.chinese_image,
        }
    }

    async fn check(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Api { status: status.as_u16(), body })
    }

    /// Rich menu id for `locale`, creating and uploading it if needed
    async fn menu_id(&self, locale: Locale) -> Result<String, GatewayError> {
        let mut menus = self.menus.lock().await;
        if let Some(id) = menus.get(&locale) {
            return Ok(id.clone());
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Created {
            rich_menu_id: String,
        }

        let response = self
            .client
            .post(self.api_url("richmenu"))
            .bearer_auth(&self.access_token)
            .json(&RichMenu::for_locale(locale))
            .send()
            .await?;
        let created: Created = Self::check(response).await?.json().await?;

        let image = tokio::fs::read(self.image_path(locale)).await?;
        let response = self
            .client
            .post(format!("{}/v2/bot/richmenu/{}/content", self.data_api_base, created.rich_menu_id))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(image)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!("Created rich menu {} for {}", created.rich_menu_id, locale);
        menus.insert(locale, created.rich_menu_id.clone());
        Ok(created.rich_menu_id)
    }

    /// Drop a cached menu id unless another task already replaced it
    async fn forget_menu(&self, locale: Locale, menu_id: &str) {
        let mut menus = self.menus.lock().await;
        if menus.get(&locale).map(String::as_str) == Some(menu_id) {
            menus.remove(&locale);
        }
    }

    async fn link_rich_menu(&self, user_id: &str, menu_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.api_url(&format!("user/{}/richmenu/{}", user_id, menu_id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!("Linked rich menu {} to {}", menu_id, user_id);
        Ok(())
    }

    async fn unlink_rich_menu(&self, user_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.api_url(&format!("user/{}/richmenu", user_id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        // Nothing linked yet
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }
}

/// Reply request body for the Messaging API
fn reply_body<'a>(reply_token: &'a str, reply: &'a Reply) -> ReplyRequest<'a> {
    let quick_reply = reply.quick_reply.as_ref().map(|qr| QuickReplyPayload {
        items: qr
            .items
            .iter()
            .map(|item| QuickReplyButton {
                kind: "action",
                action: MessageAction::new(Some(&item.label), &item.text),
            })
            .collect(),
    });

    ReplyRequest {
        reply_token,
        messages: vec![TextMessage {
            kind: "text",
            text: &reply.text,
            quick_reply,
            emojis: reply.emojis.clone(),
        }],
    }
}

#[async_trait]
impl DeliveryGateway for LineAdapter {
    async fn reply(&self, reply_token: &str, reply: &Reply) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.api_url("message/reply"))
            .bearer_auth(&self.access_token)
            .json(&reply_body(reply_token, reply))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn attach_rich_menu(&self, user_id: &str, language: Language) -> Result<(), GatewayError> {
        self.unlink_rich_menu(user_id).await?;
        let Some(locale) = language.locale() else {
            return Ok(());
        };

        let menu_id = self.menu_id(locale).await?;
        match self.link_rich_menu(user_id, &menu_id).await {
            // Deleted outside the bot; forget it and build a fresh one
            Err(GatewayError::Api { status: 404, .. }) => {
                tracing::warn!("Rich menu {} for {} is gone, recreating", menu_id, locale);
                self.forget_menu(locale, &menu_id).await;
                let menu_id = self.menu_id(locale).await?;
                self.link_rich_menu(user_id, &menu_id).await
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        "line"
    }
}
