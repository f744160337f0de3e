use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Audit label identifying which cascade tier produced an extraction.
///
/// Priority is implicit in cascade execution order; the enum is not sorted
/// or compared, only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    Table,
    TableEnrolled,
    Label,
    LabelEnrolled,
    LabelSibling,
    LabelSiblingEnrolled,
    Regex,
    RegexNear,
    RegexEnrolled,
    HtmlCapacity,
    HtmlEnrolled,
    Licensed,
    Max,
    Enrolled,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Table => "table",
            Method::TableEnrolled => "table-enrolled",
            Method::Label => "label",
            Method::LabelEnrolled => "label-enrolled",
            Method::LabelSibling => "label-sibling",
            Method::LabelSiblingEnrolled => "label-sibling-enrolled",
            Method::Regex => "regex",
            Method::RegexNear => "regex-near",
            Method::RegexEnrolled => "regex-enrolled",
            Method::HtmlCapacity => "html-capacity",
            Method::HtmlEnrolled => "html-enrolled",
            Method::Licensed => "licensed",
            Method::Max => "max",
            Method::Enrolled => "enrolled",
        }
    }
}

/// What one document yielded. The all-absent value is the normal outcome for
/// a report with no recognizable capacity or enrollment figures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub capacity: Option<String>,
    pub total_enrolled: Option<String>,
    pub method: Option<Method>,
    pub snippet: Option<String>,
    pub report_date: Option<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.capacity.is_none() && self.total_enrolled.is_none()
    }
}

/// Best-known values for one facility; filled by the first document that
/// yields any field and never overwritten within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub capacity: Option<String>,
    pub total_enrolled: Option<String>,
    pub report_date: Option<String>,
}

/// One audit CSV row per scanned document, populated or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRow {
    pub facility_id: String,
    pub report_path: String,
    pub report_date: String,
    pub capacity: String,
    pub total_enrolled: String,
    pub method: String,
    pub snippet: String,
}

/// A decoded report document: display path plus lossily decoded text.
#[derive(Debug, Clone)]
pub struct ReportDoc {
    pub path: String,
    pub text: String,
}

/// One facility's reports, already sorted by source name.
#[derive(Debug, Clone)]
pub struct FacilityDocs {
    pub facility_id: String,
    pub reports: Vec<ReportDoc>,
}

/// Result of a full scan: one audit row per document plus the first-found
/// record per facility, keyed and iterated in stable order.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub audit_rows: Vec<AuditRow>,
    pub records: BTreeMap<String, FacilityRecord>,
}
