use chrono::{DateTime, Utc};

/// Kind of inbound platform event, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Follow,
    Unfollow,
    Text,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Follow => "follow",
            EventKind::Unfollow => "unfollow",
            EventKind::Text => "text",
        }
    }
}

/// A signature-verified event delivered by the messaging platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Follow {
        user_id: String,
        reply_token: String,
        timestamp: DateTime<Utc>,
    },
    Unfollow {
        user_id: String,
        timestamp: DateTime<Utc>,
    },
    TextMessage {
        user_id: String,
        reply_token: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
}

impl InboundEvent {
    pub fn follow(user_id: impl Into<String>, reply_token: impl Into<String>) -> Self {
        InboundEvent::Follow {
            user_id: user_id.into(),
            reply_token: reply_token.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn unfollow(user_id: impl Into<String>) -> Self {
        InboundEvent::Unfollow {
            user_id: user_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn text(user_id: impl Into<String>, reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        InboundEvent::TextMessage {
            user_id: user_id.into(),
            reply_token: reply_token.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::Follow { .. } => EventKind::Follow,
            InboundEvent::Unfollow { .. } => EventKind::Unfollow,
            InboundEvent::TextMessage { .. } => EventKind::Text,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            InboundEvent::Follow { user_id, .. }
            | InboundEvent::Unfollow { user_id, .. }
            | InboundEvent::TextMessage { user_id, .. } => user_id,
        }
    }

    /// Unfollow events carry no reply token
    pub fn reply_token(&self) -> Option<&str> {
        match self {
            InboundEvent::Follow { reply_token, .. }
            | InboundEvent::TextMessage { reply_token, .. } => Some(reply_token),
            InboundEvent::Unfollow { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            InboundEvent::Follow { timestamp, .. }
            | InboundEvent::Unfollow { timestamp, .. }
            | InboundEvent::TextMessage { timestamp, .. } => *timestamp,
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        match &mut self {
            InboundEvent::Follow { timestamp, .. }
            | InboundEvent::Unfollow { timestamp, .. }
            | InboundEvent::TextMessage { timestamp, .. } => *timestamp = at,
        }
        self
    }
}
