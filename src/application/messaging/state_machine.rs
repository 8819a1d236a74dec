//! Per-user language state machine
//!
//! Pure transition function: given the stored language and the resolved
//! intent of a text message, decide the next stored language, the reply and
//! whether the rich menu has to be swapped.

use crate::application::catalog::{self, Topic};
use crate::domain::entities::{Language, Locale, Reply};

use super::intent::Intent;

/// Outcome of one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Language to persist, `None` when the state is unchanged
    pub next: Option<Language>,
    pub reply: Reply,
    /// Rich menu variant to attach, if any
    pub rich_menu: Option<Locale>,
}

impl Step {
    fn stay(reply: Reply) -> Self {
        Self { next: None, reply, rich_menu: None }
    }
}

pub fn step(state: Language, intent: Intent) -> Step {
    match state.locale() {
        None => match intent {
            Intent::SelectLanguage(locale) => Step {
                next: Some(locale.into()),
                reply: Reply::text(catalog::reply_for(locale, Topic::SetLanguage)),
                rich_menu: Some(locale),
            },
            _ => Step::stay(catalog::invalid_selection_prompt()),
        },
        Some(locale) => match intent {
            Intent::ChangeLanguage => Step {
                next: Some(Language::Unset),
                reply: catalog::choose_language_prompt(),
                rich_menu: None,
            },
            Intent::Topic(topic) => Step::stay(Reply::text(catalog::reply_for(locale, topic))),
            Intent::SelectLanguage(_) | Intent::Other => Step::stay(catalog::self_introduction(locale)),
        },
    }
}
