//! Line-by-line structural recognition.
//!
//! Each recognizer is a pure function of the current line and the parser
//! state. [`RECOGNIZERS`] fixes their precedence; the first one that returns an
//! [`Outcome`] wins and [`StructuralScanner`] applies it.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::category::{extract_reference, infer_category, is_regulatory_content};
use crate::lang::{is_arabic, matches_language, segment, Segmented};
use crate::model::{Language, ParsedItem};

static FOOTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^Page\s+\d+\s+of\s+\d+",
        r"CBUAE Classification",
        r"^\s*\d+\s*$",
        r"^\s*[\u2012\u2013\u2014\u2212\-]{1,3}\s*\d+\s*[\u2012\u2013\u2014\u2212\-]{1,3}\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static EN_HEADER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[A-Z\d.\s]{3,}$",
        r"(?i)^CHAPTER\s+\d+",
        r"(?i)^SECTION\s+\d+",
        r"(?i)^PART\s+[IVX\d]+",
        r"(?i)^ARTICLE\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

struct ReferencePattern {
    regex: Regex,
    /// Deeper references (`1.2.a`, `1.2.3`) that belong under an active parent
    /// whose reference they extend.
    nested: bool,
}

static REFERENCE_PATTERNS: Lazy<Vec<ReferencePattern>> = Lazy::new(|| {
    let pattern = |re: &str, nested: bool| ReferencePattern { regex: Regex::new(re).unwrap(), nested };
    vec![
        pattern(r"^(\d+\.\d+)(?:\.?[\s:\-]+(.+)|\.([^a-z\d\s.].*))", false),
        pattern(r"(?i)^(?:Article|Chapter|Section)\s+(\d+)[\s.\-:]*(.+)", false),
        pattern(r"^(\d+-\d+)(?:\.?[\s:\-]+(.+)|\.([^a-z\d\s.].*))", false),
        pattern(r"^\((\d+)\)[\s.:\-]*(.+)", false),
        // A dash followed by a digit is a range reference, not a separator.
        pattern(r"^(\d+)(?:\.?[\s:]+[\s:\-]*([^\s:\-].{9,})|\.?-[\s\-]*([^\d\s\-].{9,}))", false),
        pattern(r"^(\d+[.\-]\d+\.[a-z])[\s.:\-]+(.+)", true),
        pattern(r"^(\d+[.\-]\d+\.\d+)[\s.:\-]+(.+)", true),
        pattern(r"^(?:المادة|ةداملا)\s+(\d+)\s*(.+)", false),
        pattern(r"(?i)^(Requirement\s+\d+|Obligation\s+\d+)[\s.:\-]*(.+)", false),
    ]
});

static ARABIC_ARTICLE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(\s*(?:المادة|ةداملا)\s+(\d+)\s*(.+?)\s*\)").unwrap());
static ENGLISH_ARTICLE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Article\s*\(\s*\d+\s*\)\s*(.+)").unwrap());
static SUB_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+[.\s]*[\-.]\s*\d+\.(?:[a-z]|\d+))[\s.]+(.+)").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\(([a-z\d]+)\)[\s.]+(.+)").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-*][\s.]+(.+)").unwrap());
static EMBEDDED_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+[.\-]\d+)").unwrap());
static STRUCTURAL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d+\.|\(|\s*[•\-*])").unwrap());

/// The numbered item that sub-items, list items and bullets attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub doc_ref: String,
    pub text: String,
}

/// Mutable state threaded through one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    pub current_category: Option<String>,
    pub parent: Option<ParentRef>,
    pub emitted: usize,
}

impl ParserState {
    fn category_or(&self, fallback: &str) -> String {
        self.current_category.clone().unwrap_or_else(|| fallback.to_string())
    }

    fn parent_ref(&self) -> Option<String> {
        self.parent.as_ref().map(|p| p.doc_ref.clone())
    }

    fn parent_text(&self) -> Option<String> {
        self.parent.as_ref().map(|p| p.text.clone())
    }
}

/// The line under inspection plus the one following it on the same page.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub line: &'a str,
    pub next: Option<&'a str>,
    pub language: Language,
}

impl LineContext<'_> {
    fn len(&self) -> usize {
        self.line.chars().count()
    }
}

/// An item before its rule id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub doc_ref: String,
    pub text_en: String,
    pub text_ar: String,
    pub category: String,
    pub parent: Option<String>,
    pub parent_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Noise line; no state change.
    Skip,
    SetCategory(String),
    Emit { item: ItemDraft, becomes_parent: bool },
    /// Matched a tier but carried too little target-language text.
    Discard,
    /// Append to the most recent item's target-language text.
    Continue(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerKind {
    Skip,
    SectionHeader,
    NumberedItem,
    ArabicArticle,
    SubItem,
    ListItem,
    Bullet,
    RegulatoryBlock,
    RegulatoryContent,
    Continuation,
}

pub type RecognizeFn = fn(&LineContext<'_>, &ParserState) -> Option<Outcome>;

/// Precedence order of the recognizers.
pub const RECOGNIZERS: &[(RecognizerKind, RecognizeFn)] = &[
    (RecognizerKind::Skip, recognize_skip),
    (RecognizerKind::SectionHeader, recognize_section_header),
    (RecognizerKind::NumberedItem, recognize_numbered_item),
    (RecognizerKind::ArabicArticle, recognize_arabic_article),
    (RecognizerKind::SubItem, recognize_sub_item),
    (RecognizerKind::ListItem, recognize_list_item),
    (RecognizerKind::Bullet, recognize_bullet),
    (RecognizerKind::RegulatoryBlock, recognize_regulatory_block),
    (RecognizerKind::RegulatoryContent, recognize_regulatory_content),
    (RecognizerKind::Continuation, recognize_continuation),
];

/// Run the recognizers in order and return the first hit.
pub fn recognize(ctx: &LineContext<'_>, state: &ParserState) -> Option<(RecognizerKind, Outcome)> {
    RECOGNIZERS
        .iter()
        .find_map(|(kind, recognizer)| recognizer(ctx, state).map(|outcome| (*kind, outcome)))
}

/// Page-number and banner lines that never carry content.
pub fn is_footer(line: &str) -> bool {
    FOOTER_PATTERNS.iter().any(|re| re.is_match(line))
}

pub fn is_section_header(line: &str, language: Language) -> bool {
    match language {
        Language::En => EN_HEADER_PATTERNS.iter().any(|re| re.is_match(line)),
        Language::Ar => {
            let len = line.chars().count();
            is_arabic(line)
                && len > 10
                && len < 100
                && !line.chars().any(|c| c.is_ascii_digit())
                && line.split(' ').count() < 8
        }
    }
}

/// Match a top-level reference and return `(reference, body)`.
///
/// `active_parent` keeps deeper references that extend it (e.g. `1.1.a`
/// under `1.1`) out of this tier so the sub-item tier can attach them.
pub fn extract_numbered_item(line: &str, active_parent: Option<&str>) -> Option<(String, String)> {
    for pattern in REFERENCE_PATTERNS.iter() {
        let Some(cap) = pattern.regex.captures(line) else { continue };
        let Some(body) = (2..cap.len()).find_map(|i| cap.get(i)) else { continue };
        let reference = cap[1].trim();
        let body = body.as_str().trim();
        if pattern.nested {
            if let Some(parent) = active_parent {
                if reference.starts_with(&format!("{}.", parent)) {
                    continue;
                }
            }
        }
        if body.chars().count() > 5 {
            return Some((reference.to_string(), body.to_string()));
        }
    }
    None
}

fn recognize_skip(ctx: &LineContext<'_>, _state: &ParserState) -> Option<Outcome> {
    (ctx.len() < 10 || is_footer(ctx.line)).then_some(Outcome::Skip)
}

fn recognize_section_header(ctx: &LineContext<'_>, _state: &ParserState) -> Option<Outcome> {
    is_section_header(ctx.line, ctx.language).then(|| Outcome::SetCategory(ctx.line.trim().to_string()))
}

fn recognize_numbered_item(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let active_parent = state.parent.as_ref().map(|p| p.doc_ref.as_str());
    let (reference, body) = extract_numbered_item(ctx.line, active_parent)?;
    let Segmented { en, ar } = segment(&body);
    let target = match ctx.language {
        Language::En => &en,
        Language::Ar => &ar,
    };
    if target.chars().count() <= 5 {
        return Some(Outcome::Discard);
    }
    Some(Outcome::Emit {
        item: ItemDraft {
            doc_ref: reference,
            category: state.category_or(infer_category(ctx.line)),
            text_en: en,
            text_ar: ar,
            parent: None,
            parent_text: None,
        },
        becomes_parent: true,
    })
}

fn recognize_arabic_article(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let cap = ARABIC_ARTICLE_TITLE.captures(ctx.line)?;
    let title = cap[2].trim().to_string();
    let english_title = ctx
        .next
        .and_then(|next| ENGLISH_ARTICLE_TITLE.captures(next))
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    if title.is_empty() && english_title.is_empty() {
        return Some(Outcome::Discard);
    }
    Some(Outcome::Emit {
        item: ItemDraft {
            doc_ref: format!("Article-{}", &cap[1]),
            text_en: english_title,
            text_ar: title,
            category: state.category_or("Articles"),
            parent: None,
            parent_text: None,
        },
        becomes_parent: false,
    })
}

/// Draft for the child tiers: only the target-language text is kept.
fn child_item(ctx: &LineContext<'_>, state: &ParserState, doc_ref: String, body: &str) -> Outcome {
    let segmented = segment(body);
    let target = segmented.target(ctx.language).to_string();
    if target.is_empty() {
        return Outcome::Discard;
    }
    let (text_en, text_ar) = match ctx.language {
        Language::En => (target, String::new()),
        Language::Ar => (String::new(), target),
    };
    Outcome::Emit {
        item: ItemDraft {
            doc_ref,
            text_en,
            text_ar,
            category: state.category_or("Uncategorized"),
            parent: state.parent_ref(),
            parent_text: state.parent_text(),
        },
        becomes_parent: false,
    }
}

fn recognize_sub_item(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let cap = SUB_ITEM.captures(ctx.line)?;
    Some(child_item(ctx, state, cap[1].to_string(), &cap[2]))
}

fn recognize_list_item(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let cap = LIST_ITEM.captures(ctx.line)?;
    let marker = &cap[1];
    let doc_ref = match &state.parent {
        Some(parent) => format!("{}.{}", parent.doc_ref, marker),
        None => marker.to_string(),
    };
    Some(child_item(ctx, state, doc_ref, &cap[2]))
}

fn recognize_bullet(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let cap = BULLET.captures(ctx.line)?;
    let doc_ref = match &state.parent {
        Some(parent) => format!("{}.{}", parent.doc_ref, state.emitted),
        None => format!("BULLET-{}", state.emitted + 1),
    };
    Some(child_item(ctx, state, doc_ref, &cap[1]))
}

/// Both language streams of a whole line, if the target one is substantial.
fn regulatory_item(ctx: &LineContext<'_>, doc_ref: impl FnOnce() -> String, category: String) -> Outcome {
    let Segmented { en, ar } = segment(ctx.line);
    let target_len = match ctx.language {
        Language::En => en.chars().count(),
        Language::Ar => ar.chars().count(),
    };
    if target_len <= 20 {
        return Outcome::Discard;
    }
    Outcome::Emit {
        item: ItemDraft {
            doc_ref: doc_ref(),
            text_en: en,
            text_ar: ar,
            category,
            parent: None,
            parent_text: None,
        },
        becomes_parent: false,
    }
}

fn recognize_regulatory_block(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let mentions_article = ctx.line.contains("Article") || ctx.line.contains("ةداملا") || ctx.line.contains("المادة");
    if ctx.len() <= 50 || !(is_arabic(ctx.line) || mentions_article) {
        return None;
    }
    let doc_ref = || {
        EMBEDDED_REFERENCE
            .captures(ctx.line)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| format!("REG-{}", state.emitted + 1))
    };
    Some(regulatory_item(ctx, doc_ref, state.category_or("Regulatory Content")))
}

fn recognize_regulatory_content(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    if !is_regulatory_content(ctx.line) {
        return None;
    }
    let doc_ref = || extract_reference(ctx.line).unwrap_or_else(|| format!("REG-{}", state.emitted + 1));
    Some(regulatory_item(ctx, doc_ref, state.category_or(infer_category(ctx.line))))
}

fn recognize_continuation(ctx: &LineContext<'_>, state: &ParserState) -> Option<Outcome> {
    let applies = state.emitted > 0
        && !STRUCTURAL_MARKER.is_match(ctx.line)
        && matches_language(ctx.line, ctx.language)
        && ctx.len() > 30;
    applies.then(|| Outcome::Continue(ctx.line.trim().to_string()))
}

/// Stateful scan over all pages of one document, in order.
#[derive(Debug)]
pub struct StructuralScanner {
    language: Language,
    state: ParserState,
    items: Vec<ParsedItem>,
}

impl StructuralScanner {
    pub fn new(language: Language) -> Self {
        Self { language, state: ParserState::default(), items: Vec::new() }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn items(&self) -> &[ParsedItem] {
        &self.items
    }

    /// Feed one page. Category and parent state carry over to the next page.
    pub fn scan_page(&mut self, lines: &[String]) {
        let lines: Vec<&str> = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();
        for (i, line) in lines.iter().copied().enumerate() {
            let ctx = LineContext { line, next: lines.get(i + 1).copied(), language: self.language };
            if let Some((kind, outcome)) = recognize(&ctx, &self.state) {
                self.apply(kind, outcome);
            }
        }
    }

    fn apply(&mut self, kind: RecognizerKind, outcome: Outcome) {
        match outcome {
            Outcome::Skip | Outcome::Discard => {}
            Outcome::SetCategory(category) => {
                debug!(category = %category, "section header");
                self.state.current_category = Some(category);
            }
            Outcome::Emit { item, becomes_parent } => {
                let rule_id = format!("RULE-{}", self.items.len() + 1);
                debug!(rule_id = %rule_id, doc_ref = %item.doc_ref, kind = ?kind, "item recognized");
                if becomes_parent {
                    let text = match self.language {
                        Language::En => item.text_en.clone(),
                        Language::Ar => item.text_ar.clone(),
                    };
                    self.state.parent = Some(ParentRef { doc_ref: item.doc_ref.clone(), text });
                }
                self.items.push(ParsedItem {
                    rule_id,
                    doc_ref: item.doc_ref,
                    text_en: item.text_en,
                    text_ar: item.text_ar,
                    category: item.category,
                    parent: item.parent,
                    parent_text: item.parent_text,
                });
                self.state.emitted = self.items.len();
            }
            Outcome::Continue(text) => {
                let language = self.language;
                if let Some(last) = self.items.last_mut() {
                    let field = last.text_mut(language);
                    if !field.is_empty() {
                        field.push(' ');
                    }
                    field.push_str(&text);
                }
            }
        }
    }

    pub fn finish(self) -> Vec<ParsedItem> {
        self.items
    }
}

/// Structural pass over every page.
pub fn scan_structure(pages: &[Vec<String>], language: Language) -> Vec<ParsedItem> {
    let mut scanner = StructuralScanner::new(language);
    for page in pages {
        scanner.scan_page(page);
    }
    scanner.finish()
}
