use serde::Serialize;

/// Outbound reply computed for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quick_reply: Option<QuickReply>,
    pub emojis: Vec<Emoji>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_reply: None,
            emojis: Vec::new(),
        }
    }

    pub fn with_quick_reply(mut self, quick_reply: QuickReply) -> Self {
        self.quick_reply = Some(quick_reply);
        self
    }

    pub fn with_emoji(mut self, emoji: Emoji) -> Self {
        self.emojis.push(emoji);
        self
    }
}

/// Row of tappable choices shown under a message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

impl QuickReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item that sends `text` back when tapped
    pub fn with_item(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.items.push(QuickReplyItem {
            label: label.into(),
            text: text.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyItem {
    pub label: String,
    pub text: String,
}

/// Emoji overlay replacing the placeholder character at `index` in the reply text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    pub index: usize,
    pub product_id: String,
    pub emoji_id: String,
}

impl Emoji {
    pub fn new(index: usize, product_id: impl Into<String>, emoji_id: impl Into<String>) -> Self {
        Self {
            index,
            product_id: product_id.into(),
            emoji_id: emoji_id.into(),
        }
    }
}
