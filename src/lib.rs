//! LINE introduction bot
//!
//! Webhook-driven bot that remembers each follower's display language and
//! answers with canned introduction texts in that language.

pub mod domain;
pub mod application;
pub mod infrastructure;
