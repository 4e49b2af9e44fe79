//! Glyph positioning: PDF bytes in, positioned text fragments per page out.
//!
//! The parser only depends on [`GlyphPositioner`]. [`PopplerPositioner`]
//! implements it on top of Poppler's `pdftotext -bbox`.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::Fragment;

/// Poppler reports positions in points; the layout grid used for line
/// grouping is 16 points per unit.
pub const POINTS_PER_GRID_UNIT: f64 = 16.0;

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("EncryptedPDF")]
    EncryptedPdf,
    #[error("{0} not found on PATH")]
    MissingTool(String),
    #[error("pdftotext failed: {0}")]
    Tool(String),
    #[error("malformed bbox output: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid coordinate: {0}")]
    Coordinate(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Decodes a PDF buffer into per-page fragments. Called once per parse.
pub trait GlyphPositioner {
    fn position(&self, buffer: &[u8]) -> Result<Vec<Vec<Fragment>>, GlyphError>;
}

impl<F> GlyphPositioner for F
where
    F: Fn(&[u8]) -> Result<Vec<Vec<Fragment>>, GlyphError>,
{
    fn position(&self, buffer: &[u8]) -> Result<Vec<Vec<Fragment>>, GlyphError> {
        self(buffer)
    }
}

#[derive(Debug, Clone)]
pub struct PopplerPositioner {
    program: PathBuf,
}

impl Default for PopplerPositioner {
    fn default() -> Self {
        Self { program: PathBuf::from("pdftotext") }
    }
}

impl PopplerPositioner {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl GlyphPositioner for PopplerPositioner {
    fn position(&self, buffer: &[u8]) -> Result<Vec<Vec<Fragment>>, GlyphError> {
        let program = which::which(&self.program)
            .map_err(|_| GlyphError::MissingTool(self.program.display().to_string()))?;

        let mut input = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        input.write_all(buffer)?;
        input.flush()?;

        let out = Command::new(program).arg("-bbox").arg("-q").arg(input.path()).arg("-").output()?;
        if !out.status.success() {
            let err = String::from_utf8_lossy(&out.stderr).to_lowercase();
            if err.contains("encrypt") || err.contains("password") {
                return Err(GlyphError::EncryptedPdf);
            }
            let code = out.status.code().unwrap_or(-1);
            return Err(GlyphError::Tool(format!("exit status {}: {}", code, err.trim())));
        }

        let xhtml = String::from_utf8_lossy(&out.stdout);
        let pages = parse_bbox_xhtml(&xhtml)?;
        debug!(pages = pages.len(), bytes = buffer.len(), "pdftotext bbox decoded");
        Ok(pages)
    }
}

fn coordinate(tag: &BytesStart<'_>, name: &str) -> Result<Option<f64>, GlyphError> {
    let Some(attr) = tag.try_get_attribute(name).map_err(quick_xml::Error::from)? else {
        return Ok(None);
    };
    let raw = attr.unescape_value()?;
    raw.trim()
        .parse::<f64>()
        .map(|points| Some(points / POINTS_PER_GRID_UNIT))
        .map_err(|_| GlyphError::Coordinate(format!("{}={}", name, raw)))
}

/// Read `pdftotext -bbox` XHTML into one fragment list per `<page>`.
pub fn parse_bbox_xhtml(xhtml: &str) -> Result<Vec<Vec<Fragment>>, GlyphError> {
    let mut reader = Reader::from_str(xhtml);
    reader.trim_text(true);

    let mut pages: Vec<Vec<Fragment>> = Vec::new();
    let mut word: Option<Fragment> = None;

    loop {
        match reader.read_event()? {
            Event::Start(tag) if tag.name().as_ref() == b"page" => pages.push(Vec::new()),
            Event::Empty(tag) if tag.name().as_ref() == b"page" => pages.push(Vec::new()),
            Event::Start(tag) if tag.name().as_ref() == b"word" => {
                word = Some(Fragment {
                    content: String::new(),
                    x: coordinate(&tag, "xMin")?,
                    y: coordinate(&tag, "yMin")?,
                });
            }
            Event::Text(text) => {
                if let Some(current) = word.as_mut() {
                    current.content.push_str(&text.unescape()?);
                }
            }
            Event::End(tag) if tag.name().as_ref() == b"word" => {
                if let (Some(fragment), Some(page)) = (word.take(), pages.last_mut()) {
                    if !fragment.content.is_empty() {
                        page.push(fragment);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(pages)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    pub ok: bool,
    pub missing: Vec<String>,
}

/// `pdftotext` (Poppler) is the only required external tool.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();
    if which::which("pdftotext").is_err() {
        missing.push("pdftotext".to_string());
    }
    DepsResult { ok: missing.is_empty(), missing }
}

/// Install hint for missing tools, empty when nothing is missing.
pub fn install_help_for(missing: &[String]) -> String {
    if !missing.iter().any(|m| m == "pdftotext") {
        return String::new();
    }
    "Dependency missing. Install Poppler utilities:\n  sudo apt install poppler-utils\n  brew install poppler"
        .to_string()
}
