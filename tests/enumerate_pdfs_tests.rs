use std::fs;
use std::path::PathBuf;

use regpdf_checklist::{enumerate_pdfs, EnumerateError};

#[test]
fn enumerate_pdfs_finds_nested_files_sorted() {
    let td = tempfile::tempdir().unwrap();
    let base = td.path();
    let circulars = base.join("input/circulars");
    let guidance = base.join("input/guidance");
    fs::create_dir_all(&circulars).unwrap();
    fs::create_dir_all(&guidance).unwrap();
    fs::write(guidance.join("aml-guidance.pdf"), b"%PDF-1.4\n").unwrap();
    fs::write(circulars.join("notice-5737.PDF"), b"%PDF-1.4\n").unwrap();
    fs::write(circulars.join("readme.txt"), b"not a pdf").unwrap();

    let pattern = format!("{}/input/**/*.pdf", base.display());
    let files = enumerate_pdfs(&pattern).expect("should find files");
    let files: Vec<PathBuf> = files.into_iter().map(|p| p.strip_prefix(base).unwrap().to_path_buf()).collect();
    assert_eq!(
        files,
        vec![PathBuf::from("input/circulars/notice-5737.PDF"), PathBuf::from("input/guidance/aml-guidance.pdf")]
    );
}

#[test]
fn enumerate_pdfs_empty_returns_error_with_guidance() {
    let td = tempfile::tempdir().unwrap();
    let pattern = format!("{}/input/**/*.pdf", td.path().display());
    let err = enumerate_pdfs(&pattern).err().expect("should be error");
    assert_eq!(format!("{}", err), "NoFilesFound");
    let EnumerateError::NoFilesFound { guidance } = err;
    assert!(guidance.contains("./input/circulars"));
}
