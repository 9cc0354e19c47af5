//! Script-based language guessing for display texts.
//!
//! Source language tags are unreliable (course staff type Hebrew titles into
//! `en-US` fields), so every text is re-tagged from the script it is written
//! in.

use moebridge_core::Section;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Stand-in for texts that are empty after trimming.
pub const DEFAULT_TEXT: &str = "No Text";

const STRIPPED_PUNCTUATION: &str = "-'\"().,;:!?[]{}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Hebrew,
    Arabic,
    Russian,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hebrew => "he",
            Language::Arabic => "ar",
            Language::Russian => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Guesses the language of `text` from its Unicode block.
///
/// Digits and common punctuation are ignored. A text is English when what
/// remains is pure ASCII, otherwise Hebrew, Arabic or Russian when every
/// remaining character lies in that script's block (whitespace allowed).
/// Mixed or unrecognised scripts fall back to English.
pub fn detect_language(text: &str) -> Language {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_ascii_digit() && !STRIPPED_PUNCTUATION.contains(*c))
        .collect();
    let cleaned = cleaned.trim();

    let all_in = |lo: char, hi: char| {
        cleaned
            .chars()
            .all(|c| (lo..=hi).contains(&c) || c.is_whitespace())
    };

    if cleaned.is_ascii() {
        Language::English
    } else if all_in('\u{0590}', '\u{05FF}') {
        Language::Hebrew
    } else if all_in('\u{0600}', '\u{06FF}') {
        Language::Arabic
    } else if all_in('\u{0400}', '\u{04FF}') {
        Language::Russian
    } else {
        Language::English
    }
}

/// How many entries a re-keyed language map may keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageMapPolicy {
    /// One entry: the last variant, keyed by its detected language.
    #[default]
    Single,
    /// One entry per detected language; later variants win on collisions.
    PerLanguage,
}

impl FromStr for LanguageMapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(LanguageMapPolicy::Single),
            "per-language" | "per_language" => Ok(LanguageMapPolicy::PerLanguage),
            other => Err(format!("unknown language map policy: {other}")),
        }
    }
}

/// Text of a language-map variant, trimmed, with [`DEFAULT_TEXT`] for blanks.
pub fn display_text(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.is_empty() {
        DEFAULT_TEXT.to_string()
    } else {
        text
    }
}

/// A single-entry language map for `text`.
pub fn language_map_for(text: &str) -> Section {
    let text = match text.trim() {
        "" => DEFAULT_TEXT,
        trimmed => trimmed,
    };
    let mut map = Section::new();
    map.insert(
        detect_language(text).code().to_string(),
        Value::String(text.to_string()),
    );
    map
}

/// Re-keys a source language map by detected language.
///
/// Variants are visited in source order. Anything that is not a JSON object
/// yields an empty map.
pub fn rekey_language_map(value: &Value, policy: LanguageMapPolicy) -> Section {
    let mut out = Section::new();
    let Some(variants) = value.as_object() else {
        return out;
    };

    for variant in variants.values() {
        let text = display_text(variant);
        let lang = detect_language(&text);
        if policy == LanguageMapPolicy::Single {
            out.clear();
        }
        out.insert(lang.code().to_string(), Value::String(text));
    }

    out
}
