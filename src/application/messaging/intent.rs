//! Intent resolution - maps raw message text onto what the user asked for

use once_cell::sync::Lazy;

use crate::application::catalog::{menu_labels, selector_label, Topic};
use crate::domain::entities::Locale;

/// What a text message asks for, independent of the label's wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SelectLanguage(Locale),
    ChangeLanguage,
    Topic(Topic),
    Other,
}

/// Ordered (label, intent) pairs built from the catalog
static LABELS: Lazy<Vec<(&'static str, Intent)>> = Lazy::new(|| {
    let mut labels = Vec::new();
    for locale in Locale::ALL {
        let menu = menu_labels(locale);
        labels.push((selector_label(locale), Intent::SelectLanguage(locale)));
        labels.push((menu.change_language, Intent::ChangeLanguage));
        labels.push((menu.internship, Intent::Topic(Topic::Internship)));
        labels.push((menu.lab, Intent::Topic(Topic::Lab)));
    }
    labels
});

/// Resolve message text by exact, case-sensitive equality. First match wins.
pub fn resolve(text: &str) -> Intent {
    LABELS
        .iter()
        .find(|(label, _)| *label == text)
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_labels_of_both_locales() {
        assert_eq!(resolve("English"), Intent::SelectLanguage(Locale::English));
        assert_eq!(resolve("中文"), Intent::SelectLanguage(Locale::Chinese));
        assert_eq!(resolve("Set Language"), Intent::ChangeLanguage);
        assert_eq!(resolve("設定語言"), Intent::ChangeLanguage);
        assert_eq!(resolve("Internship Experience"), Intent::Topic(Topic::Internship));
        assert_eq!(resolve("實習經驗"), Intent::Topic(Topic::Internship));
        assert_eq!(resolve("Lab"), Intent::Topic(Topic::Lab));
        assert_eq!(resolve("實驗室"), Intent::Topic(Topic::Lab));
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(resolve("lab"), Intent::Other);
        assert_eq!(resolve("Lab "), Intent::Other);
        assert_eq!(resolve(" English"), Intent::Other);
        assert_eq!(resolve(""), Intent::Other);
    }
}
