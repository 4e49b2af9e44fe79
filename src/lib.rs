use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod analysis;
pub mod category;
pub mod config;
pub mod fallback;
pub mod glyph;
pub mod lang;
pub mod lines;
pub mod model;
pub mod parser;
pub mod recognizer;
pub mod revision;

pub use analysis::{analyze_structure, StructureReport};
pub use category::{extract_reference, infer_category, is_regulatory_content};
pub use config::{load_config, parse_config, validate_input_file, ChecklistConfig, ConfigError, InputError, Limits};
pub use fallback::extract_content_based_items;
pub use glyph::{check_deps, install_help_for, parse_bbox_xhtml, DepsResult, GlyphError, GlyphPositioner, PopplerPositioner};
pub use lang::{classify, is_arabic, is_english, segment, Script, Segmented};
pub use lines::{reconstruct_lines, reconstruct_pages};
pub use model::{Fragment, Language, ParsedDocument, ParsedItem};
pub use parser::{
    assemble, diagnose_empty_result, document_title, extract_items, parse_fragments, ChecklistParser, ParseError,
    ParserOptions,
};
pub use recognizer::{scan_structure, ParserState, StructuralScanner};
pub use revision::{compare_items, TrackedItem};

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { guidance: String },
}

/// Enumerate PDFs using a glob pattern (e.g., "./input/**/*.pdf").
/// Returns a sorted list of paths.
pub fn enumerate_pdfs(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let root = if Path::new(glob_pattern).is_absolute() { "/" } else { "." };
    let pattern = glob_pattern.trim_start_matches("./");
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(root, &[pattern])
        .case_insensitive(true)
        .follow_links(false)
        .build()
        .map_err(|_| EnumerateError::NoFilesFound { guidance: folder_guidance() })?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.is_file())
        .collect();

    paths.sort();
    if paths.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: folder_guidance() });
    }
    Ok(paths)
}

fn folder_guidance() -> String {
    r#"No PDF matched ./input/**/*.pdf
Suggested layout:
  ./input/circulars/...
  ./input/guidance/...
  ./input/laws/...
Example: put the regulation at ./input/circulars/notice-5737-2021.pdf"#
        .to_string()
}

/// Lowercase ASCII slug of a file stem, dashes collapsed; "doc" when empty.
pub fn doc_slug(stem: &str) -> String {
    let mapped: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = mapped.split('-').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        "doc".to_string()
    } else {
        slug
    }
}

/// Suffix `-1`, `-2`, ... until `slug` is not in `used`, then record it.
pub fn unique_slug(slug: String, used: &mut HashSet<String>) -> String {
    let mut candidate = slug.clone();
    let mut i = 1;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", slug, i);
        i += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Run metadata written next to each parsed document. `meta_fingerprint` is
/// computed without the timestamps so identical runs fingerprint the same.
pub fn document_meta(doc: &ParsedDocument, doc_id: &str, source_sha256: &str, started_ms: u64, finished_ms: u64) -> serde_json::Value {
    let with_parent = doc.items.iter().filter(|i| i.parent.is_some()).count();
    let categories: std::collections::BTreeSet<&str> = doc.items.iter().map(|i| i.category.as_str()).collect();
    let meta = serde_json::json!({
        "doc_id": doc_id,
        "engine": "poppler",
        "file_name": doc.file_name,
        "language": doc.language,
        "source_sha256": source_sha256,
        "items": doc.items.len(),
        "items_with_parent": with_parent,
        "categories": categories,
    });
    let fingerprint = sha256_hex(&serde_json::to_vec(&meta).unwrap_or_default());
    let mut full = meta.as_object().cloned().unwrap_or_default();
    full.insert("meta_fingerprint".to_string(), serde_json::json!(fingerprint));
    full.insert("timestamps".to_string(), serde_json::json!({"started_ms": started_ms, "finished_ms": finished_ms}));
    serde_json::Value::Object(full)
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub json_path: String,
    pub meta_path: String,
}

/// Atomically write `<doc_id>.<lang>.json` and `<doc_id>.<lang>.meta.json`
/// into `outdir`.
pub fn emit_document(doc: &ParsedDocument, meta: &serde_json::Value, outdir: &str, doc_id: &str) -> Result<EmitPaths, EmitError> {
    let fail = |e: &dyn std::fmt::Display| EmitError::WriteFailed(e.to_string());
    std::fs::create_dir_all(outdir).map_err(|e| fail(&e))?;
    let stem = format!("{}.{}", doc_id, doc.language);
    let json_path = Path::new(outdir).join(format!("{}.json", stem));
    let meta_path = Path::new(outdir).join(format!("{}.meta.json", stem));

    // Write temp files then rename
    let pid = std::process::id();
    let json_tmp = json_path.with_extension(format!("json.tmp.{}", pid));
    let meta_tmp = meta_path.with_extension(format!("json.tmp.{}", pid));

    let doc_bytes = serde_json::to_vec_pretty(doc).map_err(|e| fail(&e))?;
    let meta_bytes = serde_json::to_vec_pretty(meta).map_err(|e| fail(&e))?;
    std::fs::write(&json_tmp, doc_bytes).map_err(|e| fail(&e))?;
    std::fs::write(&meta_tmp, meta_bytes).map_err(|e| fail(&e))?;

    std::fs::rename(&json_tmp, &json_path).map_err(|e| fail(&e))?;
    std::fs::rename(&meta_tmp, &meta_path).map_err(|e| fail(&e))?;

    Ok(EmitPaths {
        json_path: json_path.to_string_lossy().to_string(),
        meta_path: meta_path.to_string_lossy().to_string(),
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}
