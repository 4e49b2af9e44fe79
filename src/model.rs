use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target language of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
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
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// One decoded piece of PDF text with its page position.
/// Missing coordinates are treated as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub content: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

impl Fragment {
    pub fn new(content: impl Into<String>, x: f64, y: f64) -> Self {
        Self { content: content.into(), x: Some(x), y: Some(y) }
    }

    pub fn x(&self) -> f64 {
        self.x.unwrap_or(0.0)
    }

    pub fn y(&self) -> f64 {
        self.y.unwrap_or(0.0)
    }
}

/// One extracted checklist rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItem {
    pub rule_id: String,
    pub doc_ref: String,
    pub text_en: String,
    pub text_ar: String,
    pub category: String,
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_text: Option<String>,
}

impl ParsedItem {
    /// Text field for `language`.
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::En => &self.text_en,
            Language::Ar => &self.text_ar,
        }
    }

    pub fn text_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::En => &mut self.text_en,
            Language::Ar => &mut self.text_ar,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text_en.is_empty() || !self.text_ar.is_empty()
    }
}

/// Terminal artifact of a parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub title: String,
    pub file_name: String,
    pub language: Language,
    pub items: Vec<ParsedItem>,
}
