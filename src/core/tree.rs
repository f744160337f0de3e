//! Structured strategy list: table-row scan, labeled text-node proximity,
//! then a whole-document regex pass over the flattened text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::core::cascade::{CAPACITY_NEAR_RE, CAPACITY_RE, ENROLLED_RE};
use crate::domain::model::{Extraction, Method};
use crate::utils::text::{clip_chars, clip_from, normalize_digits, resolve_date};

static TR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());

static NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{1,4}(?:,[0-9]{3})*").unwrap());

static LABEL_NODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)capacity|licensed|total enrolled|enrolled").unwrap());

static ENROLL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)enroll").unwrap());

const CAPACITY_ROW_KEYWORDS: [&str; 5] = [
    "capacity",
    "licensed",
    "maximum",
    "licensed for",
    "licensed to serve",
];

const SNIPPET_MAX: usize = 200;

pub(crate) fn extract(raw: &str) -> Extraction {
    // html5ever is error-tolerant: malformed markup still yields a tree
    let doc = Html::parse_document(raw);

    if let Some(found) = scan_table_rows(&doc) {
        return found;
    }
    if let Some(found) = scan_labeled_nodes(&doc) {
        return found;
    }
    document_regex_pass(&element_text(doc.root_element()))
}

/// Rows with >=2 cells, visited in document order. A first cell naming a
/// capacity-like label wins over a total-enrolled label within the same row.
fn scan_table_rows(doc: &Html) -> Option<Extraction> {
    for row in doc.select(&TR_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 2 {
            continue;
        }
        let left = element_text(cells[0]).to_lowercase();
        let right = element_text(cells[1]);

        if CAPACITY_ROW_KEYWORDS.iter().any(|k| left.contains(k)) {
            if let Some(m) = NUM_RE.find(&right) {
                return Some(Extraction {
                    capacity: Some(normalize_digits(m.as_str())),
                    total_enrolled: None,
                    method: Some(Method::Table),
                    snippet: Some(clip_chars(&right, SNIPPET_MAX)),
                    report_date: resolve_date(&element_text(row)),
                });
            }
        }
        if left.contains("total enrolled") {
            if let Some(m) = NUM_RE.find(&right) {
                return Some(Extraction {
                    capacity: None,
                    total_enrolled: Some(normalize_digits(m.as_str())),
                    method: Some(Method::TableEnrolled),
                    snippet: Some(clip_chars(&right, SNIPPET_MAX)),
                    report_date: resolve_date(&element_text(row)),
                });
            }
        }
    }
    None
}

/// Text nodes mentioning a capacity-like keyword, in document order. The
/// enclosing element's text is checked for explicit labeled patterns first;
/// failing that, the next sibling element may hold the bare number.
fn scan_labeled_nodes(doc: &Html) -> Option<Extraction> {
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if !LABEL_NODE_RE.is_match(text) {
            continue;
        }
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let full = element_text(parent);
        // narrow the date search to the enclosing row when there is one
        let date_span = enclosing_row_text(parent).unwrap_or_else(|| full.clone());

        if let Some(c) = CAPACITY_RE.captures(&full) {
            return Some(Extraction {
                capacity: Some(normalize_digits(&c[1])),
                total_enrolled: None,
                method: Some(Method::Label),
                snippet: Some(clip_chars(&full, SNIPPET_MAX)),
                report_date: resolve_date(&date_span),
            });
        }
        if let Some(c) = ENROLLED_RE.captures(&full) {
            return Some(Extraction {
                capacity: None,
                total_enrolled: Some(normalize_digits(&c[1])),
                method: Some(Method::LabelEnrolled),
                snippet: Some(clip_chars(&full, SNIPPET_MAX)),
                report_date: resolve_date(&date_span),
            });
        }

        if let Some(sibling) = parent.next_siblings().find_map(ElementRef::wrap) {
            let sibling_text = element_text(sibling);
            if let Some(m) = NUM_RE.find(&sibling_text) {
                let number = normalize_digits(m.as_str());
                let enrolled = ENROLL_RE.is_match(&full) || ENROLL_RE.is_match(&sibling_text);
                return Some(Extraction {
                    capacity: (!enrolled).then(|| number.clone()),
                    total_enrolled: enrolled.then_some(number),
                    method: Some(if enrolled {
                        Method::LabelSiblingEnrolled
                    } else {
                        Method::LabelSibling
                    }),
                    snippet: Some(clip_chars(&sibling_text, SNIPPET_MAX)),
                    report_date: resolve_date(&date_span),
                });
            }
        }
    }
    None
}

/// Last structured tier: generic capacity regexes over the flattened text.
/// The total-enrolled number is captured before the capacity scan and only
/// emitted when no capacity pattern matched.
fn document_regex_pass(whole: &str) -> Extraction {
    let enrolled = ENROLLED_RE.captures(whole);

    if let Some(c) = CAPACITY_RE.captures(whole) {
        let start = c.get(0).expect("group 0 always present").start();
        return Extraction {
            capacity: Some(normalize_digits(&c[1])),
            total_enrolled: None,
            method: Some(Method::Regex),
            snippet: Some(clip_from(whole, start, SNIPPET_MAX)),
            report_date: resolve_date(whole),
        };
    }
    if let Some(c) = CAPACITY_NEAR_RE.captures(whole) {
        let start = c.get(0).expect("group 0 always present").start();
        return Extraction {
            capacity: Some(normalize_digits(&c[1])),
            total_enrolled: None,
            method: Some(Method::RegexNear),
            snippet: Some(clip_from(whole, start, SNIPPET_MAX)),
            report_date: resolve_date(whole),
        };
    }
    if let Some(c) = enrolled {
        let start = c.get(0).expect("group 0 always present").start();
        return Extraction {
            capacity: None,
            total_enrolled: Some(normalize_digits(&c[1])),
            method: Some(Method::RegexEnrolled),
            snippet: Some(clip_from(whole, start, SNIPPET_MAX)),
            report_date: resolve_date(whole),
        };
    }

    Extraction::default()
}

/// Flattened element text: descendant text nodes trimmed and joined with
/// single spaces, like the original's whitespace-separated text view.
fn element_text(el: ElementRef) -> String {
    let mut out = String::new();
    for piece in el.text() {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

fn enclosing_row_text(el: ElementRef) -> Option<String> {
    el.ancestors().find_map(|node| {
        let ancestor = ElementRef::wrap(node)?;
        (ancestor.value().name() == "tr").then(|| element_text(ancestor))
    })
}
