use proptest::prelude::*;
use regpdf_checklist::lines::{decode_content, reconstruct_lines, reconstruct_pages, DEFAULT_LINE_TOLERANCE};
use regpdf_checklist::Fragment;

#[test]
fn sorts_by_y_then_x_before_grouping() {
    let fragments = vec![
        Fragment::new("world", 5.0, 1.0),
        Fragment::new("second", 1.0, 2.0),
        Fragment::new("hello", 1.0, 1.1),
        Fragment::new("line", 4.0, 2.05),
    ];
    let lines = reconstruct_lines(&fragments, DEFAULT_LINE_TOLERANCE);
    assert_eq!(lines, vec!["world hello".to_string(), "second line".to_string()]);
}

#[test]
fn tolerance_is_relative_to_previous_fragment() {
    let fragments = vec![
        Fragment::new("a", 0.0, 1.0),
        Fragment::new("b", 0.0, 1.2),
        Fragment::new("c", 0.0, 1.4),
        Fragment::new("d", 0.0, 1.8),
    ];
    let lines = reconstruct_lines(&fragments, 0.3);
    assert_eq!(lines, vec!["a b c".to_string(), "d".to_string()]);
}

#[test]
fn missing_y_is_treated_as_top_of_page() {
    let fragments = vec![
        Fragment { content: "body".into(), x: Some(0.0), y: Some(3.0) },
        Fragment { content: "heading".into(), x: None, y: None },
    ];
    let lines = reconstruct_lines(&fragments, DEFAULT_LINE_TOLERANCE);
    assert_eq!(lines, vec!["heading".to_string(), "body".to_string()]);
}

#[test]
fn percent_escapes_are_decoded() {
    assert_eq!(decode_content("Know%20Your%20Customer"), "Know Your Customer");
    assert_eq!(decode_content("%D8%A7%D9%84%D9%85%D8%A7%D8%AF%D8%A9"), "المادة");
    assert_eq!(decode_content("plain"), "plain");
}

#[test]
fn malformed_escape_is_kept_verbatim() {
    assert_eq!(decode_content("100%"), "100%");
    assert_eq!(decode_content("%E0%A4%A"), "%E0%A4%A");
}

#[test]
fn empty_page_yields_no_lines() {
    assert!(reconstruct_lines(&[], DEFAULT_LINE_TOLERANCE).is_empty());
}

#[test]
fn blank_pages_are_dropped() {
    let pages = vec![
        vec![Fragment::new("first page", 0.0, 1.0)],
        vec![],
        vec![Fragment::new("   ", 0.0, 1.0)],
        vec![Fragment::new("last page", 0.0, 1.0)],
    ];
    let lines = reconstruct_pages(&pages, DEFAULT_LINE_TOLERANCE);
    assert_eq!(lines, vec![vec!["first page".to_string()], vec!["last page".to_string()]]);
}

proptest! {
    #[test]
    fn output_does_not_depend_on_fragment_order(
        words in prop::collection::vec(("[a-z]{1,8}", 0u8..20, 0u8..10), 1..30),
        seed in any::<u64>(),
    ) {
        let fragments: Vec<Fragment> = words
            .iter()
            .map(|(w, x, y)| Fragment::new(w.clone(), *x as f64, *y as f64 * 0.5))
            .collect();
        let mut shuffled = fragments.clone();
        let len = shuffled.len();
        for i in 0..len {
            let j = ((seed.wrapping_mul(6364136223846793005).wrapping_add(i as u64)) % len as u64) as usize;
            shuffled.swap(i, j);
        }
        prop_assert_eq!(
            reconstruct_lines(&fragments, DEFAULT_LINE_TOLERANCE),
            reconstruct_lines(&shuffled, DEFAULT_LINE_TOLERANCE)
        );
    }

    #[test]
    fn every_fragment_lands_in_exactly_one_line(
        words in prop::collection::vec(("[a-z]{1,8}", 0u8..20, 0u8..10), 0..30),
    ) {
        let fragments: Vec<Fragment> = words
            .iter()
            .map(|(w, x, y)| Fragment::new(w.clone(), *x as f64, *y as f64))
            .collect();
        let lines = reconstruct_lines(&fragments, DEFAULT_LINE_TOLERANCE);
        let tokens: usize = lines.iter().map(|l| l.split(' ').count()).sum();
        prop_assert_eq!(tokens, fragments.len());
    }
}
