use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Attribute key holding the selected display language
pub const LANGUAGE_KEY: &str = "language";

/// Display language preference of a user.
///
/// `Unset` is the state between following the bot and picking a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Unset,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Unset => "unset",
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    /// Locale for a chosen language, `None` while still unset
    pub fn locale(&self) -> Option<Locale> {
        match self {
            Language::Unset => None,
            Language::English => Some(Locale::English),
            Language::Chinese => Some(Locale::Chinese),
        }
    }
}

/// One of the two languages content is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    English,
    Chinese,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Chinese];
}

impl From<Locale> for Language {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::English => Language::English,
            Locale::Chinese => Language::Chinese,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Language::from(*self).fmt(f)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(Language::Unset),
            "en" => Ok(Language::English),
            "zh" => Ok(Language::Chinese),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Per-user attribute record as it is persisted.
///
/// Serializes as a flat JSON object, e.g. `{"language": "unset"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    attributes: BTreeMap<String, String>,
}

impl UserRecord {
    /// Fresh record for a user who just followed the bot
    pub fn new() -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(LANGUAGE_KEY.to_string(), Language::Unset.as_str().to_string());
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::new()
    }
}
