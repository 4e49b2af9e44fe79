use once_cell::sync::Lazy;
use regex::Regex;

pub const GENERAL_COMPLIANCE: &str = "General Compliance";

/// Ordered keyword table; the first row with a hit names the category.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Anti-Money Laundering", &["aml", "money laundering", "غسل الأموال"]),
    (
        "Counter Financing of Terrorism",
        &["cft", "terrorism", "terrorist financing", "إرهاب"],
    ),
    (
        "Know Your Customer",
        &["kyc", "know your customer", "customer due diligence", "اعرف عميلك"],
    ),
    ("Record Keeping", &["record", "documentation", "سجلات"]),
    ("Risk Assessment", &["risk", "assessment", "مخاطر"]),
    ("Compliance", &["compliance", "امتثال"]),
    ("Reporting", &["report", "suspicious", "مشبوهة"]),
    ("Sanctions", &["sanction", "عقوبات"]),
    ("Cybersecurity", &["cyber", "security", "أمن سيبراني"]),
];

const OBLIGATION_KEYWORDS: &[&str] = &[
    "must",
    "shall",
    "should",
    "require",
    "ensure",
    "establish",
    "implement",
    "maintain",
    "conduct",
    "comply",
    "obligation",
    "responsibility",
    "يجب",
    "ينبغي",
    "التزام",
    "مسؤولية",
    "تطبيق",
    "الامتثال",
];

const DOMAIN_KEYWORDS: &[&str] = &[
    "financial institution",
    "bank",
    "customer",
    "transaction",
    "aml",
    "cft",
    "kyc",
    "cbuae",
    "مؤسسة مالية",
    "عميل",
    "معاملة",
];

static REFERENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+\.\d+\.\d+)",
        r"(\d+\.\d+)",
        r"(?i)Article\s+(\d+)",
        r"(?i)Chapter\s+(\d+)",
        r"(?i)Section\s+(\d+)",
        r"(\d+-\d+)",
        r"(?:المادة|ةداملا)\s+(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Keyword-based category for a line with no active section header.
pub fn infer_category(line: &str) -> &'static str {
    let text = line.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(GENERAL_COMPLIANCE)
}

/// Requires both an obligation keyword and a domain keyword, so prose that
/// only mentions compliance topics does not qualify.
pub fn is_regulatory_content(line: &str) -> bool {
    if line.chars().count() < 30 {
        return false;
    }
    let text = line.to_lowercase();
    contains_any(&text, OBLIGATION_KEYWORDS) && contains_any(&text, DOMAIN_KEYWORDS)
}

/// First embedded structural reference, most specific pattern first.
pub fn extract_reference(line: &str) -> Option<String> {
    REFERENCE_PATTERNS
        .iter()
        .find_map(|re| re.captures(line))
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()))
}
