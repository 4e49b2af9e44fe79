use std::collections::HashSet;
use std::fs;

use regpdf_checklist::{doc_slug, document_meta, emit_document, sha256_hex, unique_slug, Language, ParsedDocument, ParsedItem};

fn document() -> ParsedDocument {
    ParsedDocument {
        title: "Notice 5737".to_string(),
        file_name: "Notice 5737.pdf".to_string(),
        language: Language::Ar,
        items: vec![
            ParsedItem {
                rule_id: "RULE-1".to_string(),
                doc_ref: "1.1".to_string(),
                text_en: "Banks must keep records".to_string(),
                text_ar: "يجب على البنوك الاحتفاظ بالسجلات".to_string(),
                category: "Record Keeping".to_string(),
                parent: None,
                parent_text: None,
            },
            ParsedItem {
                rule_id: "RULE-2".to_string(),
                doc_ref: "1.1.a".to_string(),
                text_en: String::new(),
                text_ar: "لمدة خمس سنوات".to_string(),
                category: "Record Keeping".to_string(),
                parent: Some("1.1".to_string()),
                parent_text: Some("يجب على البنوك الاحتفاظ بالسجلات".to_string()),
            },
        ],
    }
}

#[test]
fn slugs_are_ascii_and_unique() {
    assert_eq!(doc_slug("Notice 5737 (Final)"), "notice-5737-final");
    assert_eq!(doc_slug("تعميم"), "doc");
    let mut used = HashSet::new();
    assert_eq!(unique_slug("a".to_string(), &mut used), "a");
    assert_eq!(unique_slug("a".to_string(), &mut used), "a-1");
    assert_eq!(unique_slug("a".to_string(), &mut used), "a-2");
}

#[test]
fn meta_fingerprint_ignores_timestamps() {
    let doc = document();
    let sha = sha256_hex(b"%PDF");
    let first = document_meta(&doc, "notice-5737", &sha, 1, 2);
    let second = document_meta(&doc, "notice-5737", &sha, 10, 20);
    assert_eq!(first["meta_fingerprint"], second["meta_fingerprint"]);
    assert_ne!(first["timestamps"], second["timestamps"]);
    assert_eq!(first["items"], 2);
    assert_eq!(first["items_with_parent"], 1);
    assert_eq!(first["language"], "ar");
}

#[test]
fn emit_writes_document_and_meta() {
    let td = tempfile::tempdir().unwrap();
    let outdir = td.path().join("out/notice-5737");
    let doc = document();
    let meta = document_meta(&doc, "notice-5737", &sha256_hex(b"%PDF"), 1, 2);

    let paths = emit_document(&doc, &meta, outdir.to_str().unwrap(), "notice-5737").expect("emit ok");
    assert!(paths.json_path.ends_with("notice-5737.ar.json"));
    assert!(paths.meta_path.ends_with("notice-5737.ar.meta.json"));

    let written: ParsedDocument = serde_json::from_str(&fs::read_to_string(&paths.json_path).unwrap()).unwrap();
    assert_eq!(written, doc);
    let raw = fs::read_to_string(&paths.json_path).unwrap();
    assert!(raw.contains("\"parentText\""));
    assert!(raw.contains("\"fileName\""));

    let leftovers: Vec<_> = fs::read_dir(&outdir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn sha256_is_lowercase_hex() {
    assert_eq!(sha256_hex(b"abc"), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}
