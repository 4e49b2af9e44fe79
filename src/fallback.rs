use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::category::{extract_reference, infer_category, is_regulatory_content};
use crate::lang::segment;
use crate::model::{Language, ParsedItem};
use crate::recognizer::is_footer;

/// Default ceiling on items produced by the content-based pass.
pub const DEFAULT_FALLBACK_ITEM_CAP: usize = 50;

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Second pass for documents the structural scan could not read: every
/// regulatory-sounding sentence becomes a top-level item. No section or parent
/// state is tracked. Stops after `cap` items.
pub fn extract_content_based_items(pages: &[Vec<String>], language: Language, cap: usize) -> Vec<ParsedItem> {
    info!(language = %language, "starting content-based extraction");
    let mut items: Vec<ParsedItem> = Vec::new();

    let sentences = pages
        .iter()
        .flatten()
        .map(|line| line.trim())
        .filter(|line| line.chars().count() > 50 && !is_footer(line))
        .flat_map(|line| SENTENCE_BREAK.split(line))
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > 30);

    for sentence in sentences {
        if items.len() >= cap {
            debug!(cap, "content-based extraction reached its item cap");
            break;
        }
        if !is_regulatory_content(sentence) {
            continue;
        }
        let segmented = segment(sentence);
        if segmented.target(language).chars().count() <= 20 {
            continue;
        }
        let n = items.len() + 1;
        items.push(ParsedItem {
            rule_id: format!("RULE-{}", n),
            doc_ref: extract_reference(sentence).unwrap_or_else(|| format!("CONTENT-{}", n)),
            text_en: segmented.en,
            text_ar: segmented.ar,
            category: infer_category(sentence).to_string(),
            parent: None,
            parent_text: None,
        });
    }

    info!(items = items.len(), "content-based extraction finished");
    items
}
