use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Language;

static NEUTRAL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d.():\-,]+$").unwrap());

/// Arabic, Arabic Supplement and Arabic Extended-A.
fn is_arabic_char(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

/// True when `text` carries at least one Arabic code point.
pub fn is_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// True when `text` has Latin letters and no Arabic code point.
pub fn is_english(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic()) && !is_arabic(text)
}

/// Numbers and reference punctuation that belong to neither script.
pub fn is_neutral(token: &str) -> bool {
    NEUTRAL_TOKEN.is_match(token)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Arabic,
    Latin,
    Mixed,
}

pub fn classify(text: &str) -> Script {
    if is_arabic(text) {
        Script::Arabic
    } else if is_english(text) {
        Script::Latin
    } else {
        Script::Mixed
    }
}

/// Whether the line's script is the one `language` is written in.
pub fn matches_language(text: &str, language: Language) -> bool {
    match language {
        Language::En => is_english(text),
        Language::Ar => is_arabic(text),
    }
}

/// Per-language streams of one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmented {
    pub en: String,
    pub ar: String,
}

impl Segmented {
    pub fn target(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ar => &self.ar,
        }
    }
}

/// Split an interleaved Arabic/English line into two clean streams.
///
/// Arabic-bearing tokens go to `ar`. Latin tokens and neutral tokens
/// (`1.19.`, `(a)`, `2,`) go to `en` so references survive on Arabic-majority
/// lines. Anything else is dropped.
pub fn segment(line: &str) -> Segmented {
    let mut en: Vec<&str> = Vec::new();
    let mut ar: Vec<&str> = Vec::new();
    for token in line.split_whitespace() {
        if is_arabic(token) {
            ar.push(token);
        } else if is_english(token) || is_neutral(token) {
            en.push(token);
        }
    }
    Segmented { en: en.join(" "), ar: ar.join(" ") }
}
