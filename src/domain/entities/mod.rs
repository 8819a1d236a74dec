//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod event;
pub mod reply;

pub use user::{Language, Locale, UserRecord, LANGUAGE_KEY};
pub use event::{EventKind, InboundEvent};
pub use reply::{Emoji, QuickReply, QuickReplyItem, Reply};
