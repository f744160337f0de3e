use ccld_etl::domain::model::Method;
use ccld_etl::ExtractionCascade;

// Tier priority is fixed: the first strategy to yield a field wins, even
// when a later tier would find a different number.

#[cfg(feature = "tree")]
#[test]
fn test_table_tier_outranks_document_regex() {
    let html = "<table><tr><td>Licensed Capacity</td><td>45</td></tr></table>\
                <p>Capacity: 99</p>";
    let found = ExtractionCascade::new(true).extract(html);
    assert_eq!(found.capacity.as_deref(), Some("45"));
    assert_eq!(found.method, Some(Method::Table));
}

#[cfg(feature = "tree")]
#[test]
fn test_label_tier_outranks_document_regex() {
    let html = "<p>Total Enrolled: 22</p><p><i>capacity</i>: 99</p>";
    let found = ExtractionCascade::new(true).extract(html);
    assert_eq!(found.total_enrolled.as_deref(), Some("22"));
    assert_eq!(found.method, Some(Method::LabelEnrolled));
}

#[cfg(feature = "tree")]
#[test]
fn test_tree_cascade_reports_capability() {
    assert!(ExtractionCascade::new(true).tree_enabled());
    assert!(!ExtractionCascade::new(false).tree_enabled());
}

#[test]
fn test_raw_list_runs_when_tree_disabled() {
    let found = ExtractionCascade::new(false).extract("CAPACITY</b>: 30");
    assert_eq!(found.capacity.as_deref(), Some("30"));
    assert_eq!(found.method, Some(Method::HtmlCapacity));
}

#[test]
fn test_raw_tag_aware_outranks_legacy_phrases() {
    let raw = "<b>CAPACITY</b>: 30 ... LICENSED FOR: 99";
    let found = ExtractionCascade::new(false).extract(raw);
    assert_eq!(found.capacity.as_deref(), Some("30"));
    assert_eq!(found.method, Some(Method::HtmlCapacity));
}

#[test]
fn test_raw_licensed_outranks_generic_regex() {
    let raw = "LICENSED TO SERVE: 45 and later Capacity: 99";
    let found = ExtractionCascade::new(false).extract(raw);
    assert_eq!(found.capacity.as_deref(), Some("45"));
    assert_eq!(found.method, Some(Method::Licensed));
}
