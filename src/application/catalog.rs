//! Content catalog - canned reply texts and menu labels per locale

use crate::domain::entities::{Emoji, Locale, QuickReply, Reply};

/// Which canned reply to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SetLanguage,
    Internship,
    Lab,
    SelfIntro,
    PromptChooseLanguage,
    PromptInvalidSelection,
}

/// Labels shown on the rich menu of one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLabels {
    pub chat_bar: &'static str,
    pub change_language: &'static str,
    pub internship: &'static str,
    pub lab: &'static str,
}

const CHOOSE_LANGUAGE: &str = "Language/語言";
const INVALID_SELECTION: &str = "Please select a language / 請選擇語言";

const EN_SET_LANGUAGE: &str = "Set language to English, \"Options\" will have my experiences and sending message will receive my self introduction!";
const ZH_SET_LANGUAGE: &str = "語言已設定為中文，「選單」裡有我的經歷，傳送任何訊息可以收到我的自我介紹！";

const EN_INTERNSHIP: &str = "I was a STEP intern at Google last summer vacation, the project is mainly about adding a new function to an internal existing tool. It is written in C++ and uses the framework Qt. I learned a lot about reading other people's code fast and ask for help when needed.";
const ZH_INTERNSHIP: &str = "去年暑假我在 Google 擔任 STEP intern，project 主要是在內部既有的工具上新增功能，使用 C++，framework 是 Qt。這段期間我學到如何快速讀懂別人的 code，也學會在需要時主動尋求幫助。";

const EN_LAB: &str = "Last semester I was in prof. Yun-Nung Chen's MiuLab, surveying and experimenting on end-to-end spoken language understanding. This semester I join prof. Chung-Wei Lin's lab, studying anomaly detection on autonomous vehicle. Other than that, I am also in prof. Hung-Yi Lee's Lab, doing experiment on multiple topics related to speech processing.";
const ZH_LAB: &str = "上學期我在陳縕儂教授的 MiuLab，做 end-to-end spoken language understanding 的 survey 與實驗。這學期加入林忠緯教授的實驗室，研究 anomaly detection on autonomous vehicle。除此之外，我也在李宏毅教授的實驗室做 speech processing 相關的實驗。";

// Leading "$" is the placeholder the emoji overlay replaces.
const EN_SELF_INTRO: &str = "$ Hi, my name is Erina Wu, currently a junior in National Taiwan University, majoring in Computer Science and Information Engineering. In my free time, I like to exercise or play puzzle for relaxing, I am also a member of the puzzle club at school. Besides, I love desserts, baking them is also one of my favorite thing to do.";
const ZH_SELF_INTRO: &str = "$ 嗨，我是 Erina Wu，目前是臺灣大學資訊工程學系大三的學生。閒暇時我喜歡運動或玩解謎來放鬆，也是學校解謎社的成員。另外我很喜歡甜點，烘焙甜點也是我最喜歡做的事情之一。";

const EN_MENU: MenuLabels = MenuLabels {
    chat_bar: "Options",
    change_language: "Set Language",
    internship: "Internship Experience",
    lab: "Lab",
};

const ZH_MENU: MenuLabels = MenuLabels {
    chat_bar: "選單",
    change_language: "設定語言",
    internship: "實習經驗",
    lab: "實驗室",
};

/// Emoji anchored on the self introduction placeholder
pub const SELF_INTRO_EMOJI_INDEX: usize = 0;
const SELF_INTRO_EMOJI_PRODUCT: &str = "5ac22e85040ab15980c9b44f";
const SELF_INTRO_EMOJI_ID: &str = "065";

/// Canned text for a topic. Prompts are bilingual and ignore the locale.
pub fn reply_for(locale: Locale, topic: Topic) -> &'static str {
    match (locale, topic) {
        (_, Topic::PromptChooseLanguage) => CHOOSE_LANGUAGE,
        (_, Topic::PromptInvalidSelection) => INVALID_SELECTION,
        (Locale::English, Topic::SetLanguage) => EN_SET_LANGUAGE,
        (Locale::Chinese, Topic::SetLanguage) => ZH_SET_LANGUAGE,
        (Locale::English, Topic::Internship) => EN_INTERNSHIP,
        (Locale::Chinese, Topic::Internship) => ZH_INTERNSHIP,
        (Locale::English, Topic::Lab) => EN_LAB,
        (Locale::Chinese, Topic::Lab) => ZH_LAB,
        (Locale::English, Topic::SelfIntro) => EN_SELF_INTRO,
        (Locale::Chinese, Topic::SelfIntro) => ZH_SELF_INTRO,
    }
}

/// Text a user sends to pick this locale
pub fn selector_label(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "English",
        Locale::Chinese => "中文",
    }
}

pub fn menu_labels(locale: Locale) -> &'static MenuLabels {
    match locale {
        Locale::English => &EN_MENU,
        Locale::Chinese => &ZH_MENU,
    }
}

/// Language choice prompt with one quick reply button per locale
pub fn choose_language_prompt() -> Reply {
    let quick_reply = Locale::ALL.iter().fold(QuickReply::new(), |qr, locale| {
        let label = selector_label(*locale);
        qr.with_item(label, label)
    });
    Reply::text(CHOOSE_LANGUAGE).with_quick_reply(quick_reply)
}

pub fn invalid_selection_prompt() -> Reply {
    Reply::text(INVALID_SELECTION)
}

pub fn self_introduction(locale: Locale) -> Reply {
    Reply::text(reply_for(locale, Topic::SelfIntro)).with_emoji(Emoji::new(
        SELF_INTRO_EMOJI_INDEX,
        SELF_INTRO_EMOJI_PRODUCT,
        SELF_INTRO_EMOJI_ID,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_are_shared_between_locales() {
        for topic in [Topic::PromptChooseLanguage, Topic::PromptInvalidSelection] {
            assert_eq!(reply_for(Locale::English, topic), reply_for(Locale::Chinese, topic));
        }
    }

    #[test]
    fn content_differs_per_locale() {
        for topic in [Topic::SetLanguage, Topic::Internship, Topic::Lab, Topic::SelfIntro] {
            assert_ne!(reply_for(Locale::English, topic), reply_for(Locale::Chinese, topic));
        }
    }

    #[test]
    fn choose_prompt_offers_both_selectors() {
        let reply = choose_language_prompt();
        let items = reply.quick_reply.expect("quick reply").items;
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["English", "中文"]);
        assert!(items.iter().all(|i| i.label == i.text));
    }

    #[test]
    fn self_intro_emoji_replaces_placeholder() {
        for locale in Locale::ALL {
            let reply = self_introduction(locale);
            assert_eq!(reply.emojis.len(), 1);
            let index = reply.emojis[0].index;
            assert_eq!(reply.text.chars().nth(index), Some('$'));
        }
    }

    #[test]
    fn menu_labels_do_not_overlap() {
        let mut labels = Vec::new();
        for locale in Locale::ALL {
            let menu = menu_labels(locale);
            labels.extend([selector_label(locale), menu.change_language, menu.internship, menu.lab]);
        }
        let mut deduped = labels.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(labels.len(), deduped.len());
    }
}
