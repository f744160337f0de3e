use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::{Extraction, Method};
use crate::utils::text::{clip_from, normalize_digits, resolve_date};

// Patterns shared between the structured and raw strategy lists. Compiled
// once; all are hardcoded and known-valid.
pub(crate) static CAPACITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)capacity[:\s]*([0-9]{1,4}(?:,[0-9]{3})*)").unwrap());

pub(crate) static CAPACITY_NEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)capacity.{0,30}([0-9]{1,4}(?:,[0-9]{3})*)").unwrap());

pub(crate) static ENROLLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)total\s+enrolled(?:\s+children)?[:\s]*([0-9]{1,4}(?:,[0-9]{3})*)").unwrap()
});

static LICENSED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)licensed\s+(?:for|to\s+serve)[:\s]*([0-9]{1,4}(?:,[0-9]{3})*)").unwrap()
});

static MAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:maximum\s+capacity|max\.|maximum)[:\s]*([0-9]{1,4}(?:,[0-9]{3})*)").unwrap()
});

// Tag-aware patterns: the keyword must cross a closing tag boundary before
// the digits, which keeps numbers inside attributes (font sizes, widths)
// from matching.
static CAPACITY_HTML_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)capacity[^>]{0,200}>(?:[^>]*>)*[\s:]*([0-9]{1,4}(?:,[0-9]{3})*)").unwrap()
});

static ENROLLED_HTML_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)total\s+enrolled(?:\s+children)?[^>]{0,200}>(?:[^>]*>)*[\s:]*([0-9]{1,4}(?:,[0-9]{3})*)",
    )
    .unwrap()
});

const RAW_SNIPPET_MAX: usize = 400;
const TEXT_SNIPPET_MAX: usize = 200;

/// Ordered cascade of extraction strategies over one document.
///
/// Capability is resolved once at construction: when the `tree` feature is
/// compiled in and `use_tree` is set, the structured strategy list runs
/// (table rows, labeled nodes, document regexes); otherwise the raw-markup
/// list runs (tag-aware patterns, then legacy plain-text regexes). Exactly
/// one list is consulted per document, and the first tier to produce a
/// non-empty field wins.
pub struct ExtractionCascade {
    use_tree: bool,
}

impl ExtractionCascade {
    pub fn new(use_tree: bool) -> Self {
        let available = cfg!(feature = "tree");
        if use_tree && !available {
            tracing::warn!(
                "structured HTML parser not compiled in; falling back to raw-markup scanning"
            );
        }
        Self {
            use_tree: use_tree && available,
        }
    }

    pub fn tree_enabled(&self) -> bool {
        self.use_tree
    }

    /// Run the cascade over one document's text. Never fails: a document
    /// with no recognizable fields yields the all-absent extraction.
    pub fn extract(&self, raw: &str) -> Extraction {
        #[cfg(feature = "tree")]
        if self.use_tree {
            return crate::core::tree::extract(raw);
        }
        self.extract_raw(raw)
    }

    /// Raw-markup strategy list: tag-aware patterns first, then the legacy
    /// plain-text regexes.
    fn extract_raw(&self, raw: &str) -> Extraction {
        if let Some(c) = CAPACITY_HTML_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Capacity, Method::HtmlCapacity, RAW_SNIPPET_MAX);
        }
        if let Some(c) = ENROLLED_HTML_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Enrolled, Method::HtmlEnrolled, RAW_SNIPPET_MAX);
        }

        if let Some(c) = LICENSED_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Capacity, Method::Licensed, RAW_SNIPPET_MAX);
        }
        if let Some(c) = MAX_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Capacity, Method::Max, RAW_SNIPPET_MAX);
        }
        if let Some(c) = ENROLLED_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Enrolled, Method::Enrolled, RAW_SNIPPET_MAX);
        }
        if let Some(c) = CAPACITY_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Capacity, Method::Regex, TEXT_SNIPPET_MAX);
        }
        if let Some(c) = CAPACITY_NEAR_RE.captures(raw) {
            return raw_hit(raw, &c, Field::Capacity, Method::RegexNear, TEXT_SNIPPET_MAX);
        }

        Extraction::default()
    }
}

enum Field {
    Capacity,
    Enrolled,
}

fn raw_hit(
    raw: &str,
    captures: &regex::Captures<'_>,
    field: Field,
    method: Method,
    snippet_max: usize,
) -> Extraction {
    let whole_match = captures.get(0).expect("group 0 always present");
    let snippet = clip_from(raw, whole_match.start(), snippet_max);
    let report_date = resolve_date(&snippet);
    let value = normalize_digits(&captures[1]);

    let (capacity, total_enrolled) = match field {
        Field::Capacity => (Some(value), None),
        Field::Enrolled => (None, Some(value)),
    };

    Extraction {
        capacity,
        total_enrolled,
        method: Some(method),
        snippet: Some(snippet),
        report_date,
    }
}
