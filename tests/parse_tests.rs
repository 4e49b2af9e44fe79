use std::collections::HashSet;

use regpdf_checklist::{
    diagnose_empty_result, document_title, ChecklistParser, Fragment, GlyphError, Language, ParseError,
    ParserOptions,
};

type Pages = Vec<Vec<Fragment>>;

/// One fragment per line, one unit apart.
fn fragments(lines: &[&str]) -> Vec<Fragment> {
    lines.iter().enumerate().map(|(i, l)| Fragment::new(*l, 1.0, i as f64)).collect()
}

fn fixed(pages: Pages) -> impl Fn(&[u8]) -> Result<Pages, GlyphError> {
    move |_buffer: &[u8]| -> Result<Pages, GlyphError> { Ok(pages.clone()) }
}

const BUFFER: &[u8] = b"%PDF-1.7 fake";

#[test]
fn parses_bilingual_checklist_end_to_end() {
    let pages = vec![
        fragments(&[
            "CUSTOMER DUE DILIGENCE",
            "1.1 The institution must maintain customer records.",
            "1.1.a Records shall be retained for 5 years.",
            "Page 1 of 2",
        ]),
        vec![],
        fragments(&["(b) Verify the passport of each applicant", "2"]),
    ];
    let parser = ChecklistParser::new(fixed(pages));
    let doc = parser.parse(BUFFER, "notice-5737.final.pdf", Language::En).unwrap();

    assert_eq!(doc.title, "notice-5737.final");
    assert_eq!(doc.file_name, "notice-5737.final.pdf");
    assert_eq!(doc.language, Language::En);
    assert_eq!(doc.items.len(), 3);

    let ids: Vec<&str> = doc.items.iter().map(|i| i.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["RULE-1", "RULE-2", "RULE-3"]);
    assert!(doc.items.iter().all(|i| i.category == "CUSTOMER DUE DILIGENCE"));
    assert_eq!(doc.items[2].doc_ref, "1.1.b");

    let refs: HashSet<&str> = doc.items.iter().map(|i| i.doc_ref.as_str()).collect();
    for item in &doc.items {
        assert!(item.has_text());
        if let Some(parent) = &item.parent {
            assert!(refs.contains(parent.as_str()), "dangling parent {parent}");
        }
    }
}

#[test]
fn fragments_on_one_visual_line_are_joined() {
    let pages = vec![vec![
        Fragment::new("customer", 3.0, 0.1),
        Fragment::new("1.1", 0.0, 0.0),
        Fragment::new("records.", 4.0, 0.05),
        Fragment::new("The", 1.0, 0.0),
        Fragment::new("bank", 2.0, 0.0),
        Fragment::new("must", 2.5, 0.0),
        Fragment::new("keep", 2.8, 0.0),
    ]];
    let doc = ChecklistParser::new(fixed(pages)).parse(BUFFER, "c.pdf", Language::En).unwrap();
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].doc_ref, "1.1");
    assert_eq!(doc.items[0].text_en, "The bank must keep records. customer");
}

#[test]
fn falls_back_to_content_extraction() {
    // Read as a section header by the structural pass.
    let pages = vec![fragments(&["Article 3 Every bank must verify the identity of each customer on onboarding"])];
    let doc = ChecklistParser::new(fixed(pages)).parse(BUFFER, "guidance.pdf", Language::En).unwrap();
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].rule_id, "RULE-1");
    assert_eq!(doc.items[0].doc_ref, "3");
    assert_eq!(doc.items[0].parent, None);
}

#[test]
fn empty_buffer_is_rejected_before_decoding() {
    let positioner = |_: &[u8]| -> Result<Pages, GlyphError> { panic!("positioner must not run") };
    let err = ChecklistParser::new(positioner).parse(&[], "a.pdf", Language::En).unwrap_err();
    assert!(matches!(err, ParseError::EmptyBuffer));
}

#[test]
fn decode_error_is_prefixed() {
    let positioner = |_: &[u8]| -> Result<Pages, GlyphError> { Err(GlyphError::Tool("bad xref table".into())) };
    let err = ChecklistParser::new(positioner).parse(BUFFER, "a.pdf", Language::En).unwrap_err();
    assert!(matches!(err, ParseError::Decode(_)));
    assert_eq!(err.to_string(), "PDF parsing error: pdftotext failed: bad xref table");
}

#[test]
fn blank_document_has_no_text_content() {
    let pages = vec![vec![], vec![Fragment::new("  ", 0.0, 0.0)]];
    let err = ChecklistParser::new(fixed(pages)).parse(BUFFER, "a.pdf", Language::En).unwrap_err();
    assert!(matches!(err, ParseError::NoTextContent));
    assert_eq!(err.to_string(), "No text content found in PDF");
}

#[test]
fn invoice_is_rejected_as_commercial_document() {
    let pages = vec![fragments(&["TAX INVOICE No 4411", "Amount payable including GST 450", "Thank you"])];
    let err = ChecklistParser::new(fixed(pages)).parse(BUFFER, "inv.pdf", Language::En).unwrap_err();
    assert!(matches!(err, ParseError::WrongDocumentType));
    assert!(err.to_string().contains("commercial document"));
}

#[test]
fn empty_result_diagnosis() {
    let page = |text: &str| vec![vec![text.to_string()]];
    assert!(matches!(diagnose_empty_result(&page("a recipe for bread")), ParseError::NotComplianceDocument));
    assert!(matches!(diagnose_empty_result(&page("KYC overview")), ParseError::UnsupportedFormat));
    assert!(matches!(
        diagnose_empty_result(&page("invoice for compliance review")),
        ParseError::UnsupportedFormat
    ));
    assert!(matches!(diagnose_empty_result(&page("Bill of Supply")), ParseError::WrongDocumentType));
}

#[test]
fn title_drops_only_last_extension() {
    assert_eq!(document_title("report.pdf"), "report");
    assert_eq!(document_title("a.b.PDF"), "a.b");
    assert_eq!(document_title("noext"), "noext");
}

#[test]
fn line_tolerance_option_controls_grouping() {
    let pages = vec![vec![
        Fragment::new("1.1 The bank must keep", 0.0, 0.0),
        Fragment::new("customer records.", 5.0, 0.5),
    ]];
    let wide = ParserOptions { line_tolerance: 1.0, ..ParserOptions::default() };
    let doc = ChecklistParser::with_options(fixed(pages.clone()), wide).parse(BUFFER, "a.pdf", Language::En).unwrap();
    assert_eq!(doc.items[0].text_en, "The bank must keep customer records.");

    let doc = ChecklistParser::new(fixed(pages)).parse(BUFFER, "a.pdf", Language::En).unwrap();
    assert_eq!(doc.items[0].text_en, "The bank must keep");
}

#[test]
fn same_buffer_parses_for_both_languages() {
    let pages = vec![fragments(&[
        "1.1 The bank must keep records يجب على البنك الاحتفاظ بالسجلات",
    ])];
    let parser = ChecklistParser::new(fixed(pages));
    let en = parser.parse(BUFFER, "a.pdf", Language::En).unwrap();
    let ar = parser.parse(BUFFER, "a.pdf", Language::Ar).unwrap();
    assert_eq!(en.items[0].text_en, "The bank must keep records");
    assert_eq!(en.items[0].text_ar, "يجب على البنك الاحتفاظ بالسجلات");
    assert_eq!(ar.items, en.items);
    assert_eq!(ar.language, Language::Ar);
}
