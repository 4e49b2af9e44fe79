use std::borrow::Cow;
use std::cmp::Ordering;

use tracing::debug;

use crate::model::Fragment;

/// Default y-distance under which two fragments share a visual line, in
/// layout grid units.
pub const DEFAULT_LINE_TOLERANCE: f64 = 0.3;

/// Decode percent-escaped fragment content. Malformed escapes are kept as-is.
pub fn decode_content(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

fn reading_order(a: &Fragment, b: &Fragment) -> Ordering {
    a.y()
        .total_cmp(&b.y())
        .then_with(|| a.x().total_cmp(&b.x()))
        .then_with(|| a.content.cmp(&b.content))
}

/// Group one page of fragments into visual lines, top to bottom.
pub fn reconstruct_lines(fragments: &[Fragment], tolerance: f64) -> Vec<String> {
    let mut sorted: Vec<&Fragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| reading_order(a, b));

    let mut lines = Vec::new();
    let mut current: Vec<Cow<'_, str>> = Vec::new();
    let mut last_y: Option<f64> = None;

    for fragment in sorted {
        let y = fragment.y();
        let same_line = last_y.map(|prev| (y - prev).abs() < tolerance).unwrap_or(true);
        if !same_line && !current.is_empty() {
            lines.push(current.join(" "));
            current.clear();
        }
        current.push(decode_content(&fragment.content));
        last_y = Some(y);
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Reconstruct every page, dropping pages with no visible text.
pub fn reconstruct_pages(pages: &[Vec<Fragment>], tolerance: f64) -> Vec<Vec<String>> {
    pages
        .iter()
        .enumerate()
        .filter_map(|(index, fragments)| {
            let lines = reconstruct_lines(fragments, tolerance);
            if lines.iter().all(|l| l.trim().is_empty()) {
                debug!(page = index + 1, "page has no text, skipping");
                return None;
            }
            debug!(page = index + 1, fragments = fragments.len(), lines = lines.len(), "page reconstructed");
            Some(lines)
        })
        .collect()
}
