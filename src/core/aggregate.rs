use crate::core::cascade::ExtractionCascade;
use crate::domain::model::{AuditRow, FacilityRecord, ReportDoc};
use crate::utils::text::collapse_newlines;

/// Runs the cascade over one facility's documents and keeps the first
/// non-empty result as the facility's record.
///
/// Callers must pass `reports` already sorted by source name: earlier
/// documents are assumed more authoritative, so reordering the list changes
/// which result is kept.
pub struct FacilityAggregator<'a> {
    cascade: &'a ExtractionCascade,
}

impl<'a> FacilityAggregator<'a> {
    pub fn new(cascade: &'a ExtractionCascade) -> Self {
        Self { cascade }
    }

    /// One audit row per document unconditionally; the returned record is
    /// `None` when no document yielded any field.
    pub fn aggregate(
        &self,
        facility_id: &str,
        reports: &[ReportDoc],
    ) -> (Option<FacilityRecord>, Vec<AuditRow>) {
        let mut record = None;
        let mut audit = Vec::with_capacity(reports.len());

        for doc in reports {
            let found = self.cascade.extract(&doc.text);

            audit.push(AuditRow {
                facility_id: facility_id.to_string(),
                report_path: doc.path.clone(),
                report_date: found.report_date.clone().unwrap_or_default(),
                capacity: found.capacity.clone().unwrap_or_default(),
                total_enrolled: found.total_enrolled.clone().unwrap_or_default(),
                method: found.method.map(|m| m.as_str().to_string()).unwrap_or_default(),
                snippet: collapse_newlines(found.snippet.as_deref().unwrap_or_default()),
            });

            if record.is_none() && !found.is_empty() {
                record = Some(FacilityRecord {
                    capacity: found.capacity,
                    total_enrolled: found.total_enrolled,
                    report_date: found.report_date,
                });
            }
        }

        (record, audit)
    }
}
