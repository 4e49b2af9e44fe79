use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{Language, ParsedItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub changed_at_ms: u64,
    pub previous_text: String,
    pub new_text: String,
    pub language: Language,
}

/// A parsed item with its text-revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    #[serde(flatten)]
    pub item: ParsedItem,
    pub version: u32,
    #[serde(default)]
    pub changes: Vec<TextChange>,
}

impl TrackedItem {
    pub fn new(item: ParsedItem) -> Self {
        Self { item, version: 1, changes: Vec::new() }
    }
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Carry revision history from a previous parse of the same document.
///
/// A new item matches an existing one by rule id or identical `language`
/// text. A match whose text differs gets the next version and a change record.
pub fn compare_items(existing: &[TrackedItem], new_items: Vec<ParsedItem>, language: Language) -> Vec<TrackedItem> {
    compare_items_at(existing, new_items, language, now_ms())
}

/// [`compare_items`] with an explicit change timestamp.
pub fn compare_items_at(
    existing: &[TrackedItem],
    new_items: Vec<ParsedItem>,
    language: Language,
    changed_at_ms: u64,
) -> Vec<TrackedItem> {
    new_items
        .into_iter()
        .map(|item| {
            let previous = existing.iter().find(|old| {
                old.item.rule_id == item.rule_id || old.item.text(language) == item.text(language)
            });
            let Some(previous) = previous else {
                return TrackedItem::new(item);
            };
            let previous_text = previous.item.text(language);
            if previous_text == item.text(language) {
                return TrackedItem { item, version: previous.version, changes: previous.changes.clone() };
            }
            let mut changes = previous.changes.clone();
            changes.push(TextChange {
                changed_at_ms,
                previous_text: previous_text.to_string(),
                new_text: item.text(language).to_string(),
                language,
            });
            TrackedItem { item, version: previous.version + 1, changes }
        })
        .collect()
}
