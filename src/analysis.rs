//! Per-page structure diagnostics for tuning the recognizers against a new
//! document family.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lang::{classify, Script};
use crate::lines::reconstruct_lines;
use crate::model::Fragment;

const MAX_SAMPLES: usize = 5;
const SAMPLE_CHARS: usize = 100;
const PREVIEW_CHARS: usize = 50;

static MAIN_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:[.\s]*[\-.]\s*\d+)?)[\s.]+(.+)").unwrap());
static SUB_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+[.\s]*[\-.]\s*\d+\.(?:[a-z]|\d+))[\s.]+(.+)").unwrap());
static ARABIC_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(\s*(?:المادة|ةداملا)\s+(\d+)\s*(.+?)\s*\)").unwrap());
static ENGLISH_ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Article\s*\(\s*(\d+)\s*\)\s*(.+)").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\(([a-z\d]+)\)[\s.]+(.+)").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-*][\s.]+(.+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternHit {
    pub marker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleScript {
    Arabic,
    English,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleHit {
    pub script: ArticleScript,
    pub number: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePatterns {
    pub main_numbers: Vec<PatternHit>,
    pub sub_numbers: Vec<PatternHit>,
    pub articles: Vec<ArticleHit>,
    pub list_items: Vec<PatternHit>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSamples {
    pub arabic: Vec<String>,
    pub english: Vec<String>,
    pub mixed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub page_number: usize,
    pub total_fragments: usize,
    pub total_lines: usize,
    pub arabic_lines: usize,
    pub english_lines: usize,
    pub numbered_items: usize,
    pub bullet_points: usize,
    pub patterns: StructurePatterns,
    pub samples: LanguageSamples,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    pub total_pages: usize,
    pub pages: Vec<PageAnalysis>,
}

impl StructureReport {
    pub fn total_numbered_items(&self) -> usize {
        self.pages.iter().map(|p| p.numbered_items).sum()
    }

    pub fn total_bullet_points(&self) -> usize {
        self.pages.iter().map(|p| p.bullet_points).sum()
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn push_sample(bucket: &mut Vec<String>, line: &str) {
    if bucket.len() < MAX_SAMPLES {
        bucket.push(truncate(line, SAMPLE_CHARS));
    }
}

fn hit(cap: &regex::Captures<'_>) -> PatternHit {
    PatternHit { marker: cap[1].to_string(), text: truncate(&cap[2], PREVIEW_CHARS) }
}

fn analyze_page(page_number: usize, fragments: &[Fragment], tolerance: f64) -> PageAnalysis {
    let lines = reconstruct_lines(fragments, tolerance);
    let mut analysis = PageAnalysis {
        page_number,
        total_fragments: fragments.len(),
        total_lines: 0,
        arabic_lines: 0,
        english_lines: 0,
        numbered_items: 0,
        bullet_points: 0,
        patterns: StructurePatterns::default(),
        samples: LanguageSamples::default(),
    };

    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        analysis.total_lines += 1;
        match classify(line) {
            Script::Arabic => {
                analysis.arabic_lines += 1;
                push_sample(&mut analysis.samples.arabic, line);
            }
            Script::Latin => {
                analysis.english_lines += 1;
                push_sample(&mut analysis.samples.english, line);
            }
            Script::Mixed => push_sample(&mut analysis.samples.mixed, line),
        }

        let patterns = &mut analysis.patterns;
        if let Some(cap) = MAIN_NUMBER.captures(line) {
            patterns.main_numbers.push(hit(&cap));
            analysis.numbered_items += 1;
        }
        if let Some(cap) = SUB_NUMBER.captures(line) {
            patterns.sub_numbers.push(hit(&cap));
        }
        if let Some(cap) = ARABIC_ARTICLE.captures(line) {
            patterns.articles.push(ArticleHit {
                script: ArticleScript::Arabic,
                number: cap[1].to_string(),
                title: truncate(&cap[2], PREVIEW_CHARS),
            });
        } else if let Some(cap) = ENGLISH_ARTICLE.captures(line) {
            patterns.articles.push(ArticleHit {
                script: ArticleScript::English,
                number: cap[1].to_string(),
                title: truncate(&cap[2], PREVIEW_CHARS),
            });
        }
        if let Some(cap) = LIST_ITEM.captures(line) {
            patterns.list_items.push(hit(&cap));
        }
        if let Some(cap) = BULLET.captures(line) {
            patterns.bullets.push(truncate(&cap[1], PREVIEW_CHARS));
            analysis.bullet_points += 1;
        }
    }
    analysis
}

/// Language and structure statistics for every page, blank pages included.
pub fn analyze_structure(pages: &[Vec<Fragment>], tolerance: f64) -> StructureReport {
    StructureReport {
        total_pages: pages.len(),
        pages: pages
            .iter()
            .enumerate()
            .map(|(i, fragments)| analyze_page(i + 1, fragments, tolerance))
            .collect(),
    }
}
