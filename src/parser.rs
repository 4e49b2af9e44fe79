use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fallback::{extract_content_based_items, DEFAULT_FALLBACK_ITEM_CAP};
use crate::glyph::{GlyphError, GlyphPositioner};
use crate::lines::{reconstruct_pages, DEFAULT_LINE_TOLERANCE};
use crate::model::{Fragment, Language, ParsedDocument, ParsedItem};
use crate::recognizer::scan_structure;

static FILE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

const COMMERCIAL_KEYWORDS: &[&str] = &["invoice", "tax invoice", "bill of supply", "gst"];
const COMPLIANCE_KEYWORDS: &[&str] = &["compliance", "regulation", "cbuae", "aml", "kyc", "suspicious"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("PDF buffer is empty")]
    EmptyBuffer,
    #[error("PDF parsing error: {0}")]
    Decode(#[from] GlyphError),
    #[error("No text content found in PDF")]
    NoTextContent,
    #[error("This appears to be a commercial document (invoice/bill). Please upload regulatory compliance documents instead.")]
    WrongDocumentType,
    #[error("No compliance checklist items found. Please ensure this is a regulatory compliance document.")]
    NotComplianceDocument,
    #[error("No checklist items found in the document. The document may have an unsupported format.")]
    UnsupportedFormat,
}

/// Tunables of one parse run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub line_tolerance: f64,
    pub fallback_item_cap: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { line_tolerance: DEFAULT_LINE_TOLERANCE, fallback_item_cap: DEFAULT_FALLBACK_ITEM_CAP }
    }
}

/// Structural pass, then the content-based pass if the first found nothing.
pub fn extract_items(pages: &[Vec<String>], language: Language, options: &ParserOptions) -> Vec<ParsedItem> {
    let items = scan_structure(pages, language);
    info!(items = items.len(), language = %language, "structural scan finished");
    if !items.is_empty() {
        return items;
    }
    info!("no structured items found, falling back to content-based extraction");
    extract_content_based_items(pages, language, options.fallback_item_cap)
}

/// Pick the failure message for a document that produced no items, from
/// keyword presence in its full text.
pub fn diagnose_empty_result(pages: &[Vec<String>]) -> ParseError {
    let full_text = pages.iter().map(|page| page.join("\n")).collect::<Vec<_>>().join(" ").to_lowercase();
    let commercial = COMMERCIAL_KEYWORDS.iter().any(|k| full_text.contains(k));
    let compliance = COMPLIANCE_KEYWORDS.iter().any(|k| full_text.contains(k));
    let err = if commercial && !compliance {
        ParseError::WrongDocumentType
    } else if !compliance {
        ParseError::NotComplianceDocument
    } else {
        ParseError::UnsupportedFormat
    };
    warn!(commercial, compliance, error = %err, "no checklist items extracted");
    err
}

/// File name without its last extension.
pub fn document_title(file_name: &str) -> String {
    FILE_EXTENSION.replace(file_name, "").into_owned()
}

pub fn assemble(file_name: &str, language: Language, items: Vec<ParsedItem>) -> ParsedDocument {
    ParsedDocument { title: document_title(file_name), file_name: file_name.to_string(), language, items }
}

/// Entry point: decode a PDF with the positioner and extract its checklist.
///
/// Every call builds fresh parser state, so one parser can serve concurrent
/// calls for different buffers or languages.
#[derive(Debug, Clone, Default)]
pub struct ChecklistParser<P> {
    positioner: P,
    options: ParserOptions,
}

impl<P: GlyphPositioner> ChecklistParser<P> {
    pub fn new(positioner: P) -> Self {
        Self { positioner, options: ParserOptions::default() }
    }

    pub fn with_options(positioner: P, options: ParserOptions) -> Self {
        Self { positioner, options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Decode `buffer` into fragments only.
    pub fn fragments(&self, buffer: &[u8]) -> Result<Vec<Vec<Fragment>>, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyBuffer);
        }
        Ok(self.positioner.position(buffer)?)
    }

    pub fn parse(&self, buffer: &[u8], file_name: &str, language: Language) -> Result<ParsedDocument, ParseError> {
        let pages = self.fragments(buffer)?;
        debug!(file = file_name, pages = pages.len(), "fragments decoded");
        parse_fragments(&pages, file_name, language, &self.options)
    }
}

/// Everything after glyph positioning.
pub fn parse_fragments(
    pages: &[Vec<Fragment>],
    file_name: &str,
    language: Language,
    options: &ParserOptions,
) -> Result<ParsedDocument, ParseError> {
    let lines = reconstruct_pages(pages, options.line_tolerance);
    if lines.is_empty() {
        return Err(ParseError::NoTextContent);
    }
    info!(file = file_name, pages = lines.len(), language = %language, "parsing checklist");

    let items = extract_items(&lines, language, options);
    if items.is_empty() {
        return Err(diagnose_empty_result(&lines));
    }
    Ok(assemble(file_name, language, items))
}
