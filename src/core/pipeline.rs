use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::aggregate::FacilityAggregator;
use crate::core::cascade::ExtractionCascade;
use crate::core::{ConfigProvider, Pipeline};
use crate::domain::model::{FacilityDocs, ReportDoc, ScanOutcome};
use crate::utils::error::{EtlError, Result};

/// Scans per-facility report directories, runs the extraction cascade, and
/// writes the per-document audit CSV.
pub struct ReportPipeline<C: ConfigProvider> {
    config: C,
    cascade: ExtractionCascade,
}

impl<C: ConfigProvider> ReportPipeline<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            cascade: ExtractionCascade::new(true),
        }
    }
}

impl<C: ConfigProvider> Pipeline for ReportPipeline<C> {
    /// Walk sorted facility subdirectories and read their `report-*.html`
    /// files in sorted order. Document order is what makes first-found-wins
    /// deterministic, so both levels sort lexicographically.
    fn extract(&self) -> Result<Vec<FacilityDocs>> {
        let root = Path::new(self.config.reports_dir());
        if !root.is_dir() {
            return Err(EtlError::ConfigError {
                message: format!("Reports directory not found: {}", root.display()),
            });
        }

        let mut facility_dirs: Vec<_> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        facility_dirs.sort();

        let mut sources = Vec::with_capacity(facility_dirs.len());
        for dir in facility_dirs {
            let facility_id = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Failed to list {}: {}", dir.display(), e);
                    continue;
                }
            };
            let mut report_files: Vec<_> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| is_report_file(path))
                .collect();
            report_files.sort();

            let mut reports = Vec::with_capacity(report_files.len());
            for file in report_files {
                match fs::read(&file) {
                    Ok(bytes) => reports.push(ReportDoc {
                        path: file.display().to_string(),
                        // lossy decoding: bad encoding never fails a document
                        text: String::from_utf8_lossy(&bytes).into_owned(),
                    }),
                    Err(e) => {
                        tracing::warn!("Failed to read {}: {}", file.display(), e);
                        continue;
                    }
                }
            }

            sources.push(FacilityDocs {
                facility_id,
                reports,
            });
        }

        Ok(sources)
    }

    fn transform(&self, sources: Vec<FacilityDocs>) -> Result<ScanOutcome> {
        let aggregator = FacilityAggregator::new(&self.cascade);
        let mut audit_rows = Vec::new();
        let mut records = BTreeMap::new();

        for facility in sources {
            let (record, rows) = aggregator.aggregate(&facility.facility_id, &facility.reports);
            tracing::debug!(
                "Facility {}: {} reports, extracted: {}",
                facility.facility_id,
                rows.len(),
                record.is_some()
            );
            audit_rows.extend(rows);
            if let Some(record) = record {
                records.insert(facility.facility_id, record);
            }
        }

        Ok(ScanOutcome {
            audit_rows,
            records,
        })
    }

    fn load(&self, outcome: &ScanOutcome) -> Result<String> {
        let out_path = Path::new(self.config.audit_out());
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(out_path)?;
        for row in &outcome.audit_rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::info!(
            "Wrote {} report rows to {} (facilities with capacity/enrollment info: {})",
            outcome.audit_rows.len(),
            out_path.display(),
            outcome.records.len()
        );

        Ok(out_path.display().to_string())
    }
}

fn is_report_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("report-") && name.ends_with(".html"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct MockConfig {
        reports_dir: String,
        audit_out: String,
    }

    impl ConfigProvider for MockConfig {
        fn reports_dir(&self) -> &str {
            &self.reports_dir
        }

        fn audit_out(&self) -> &str {
            &self.audit_out
        }

        fn merge_target(&self) -> Option<&str> {
            None
        }

        fn force(&self) -> bool {
            false
        }

        fn write_updated(&self) -> bool {
            false
        }
    }

    fn config_for(dir: &tempfile::TempDir) -> MockConfig {
        MockConfig {
            reports_dir: dir.path().join("reports").display().to_string(),
            audit_out: dir.path().join("out/capacities.csv").display().to_string(),
        }
    }

    fn write_report(root: &Path, facility: &str, file: &str, contents: &str) {
        let dir = root.join(facility);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), contents).unwrap();
    }

    #[test]
    fn test_extract_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ReportPipeline::new(config_for(&dir));
        assert!(pipeline.extract().is_err());
    }

    #[test]
    fn test_extract_sorts_facilities_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("reports");
        write_report(&root, "222", "report-2.html", "b");
        write_report(&root, "222", "report-1.html", "a");
        write_report(&root, "111", "report-1.html", "c");

        let pipeline = ReportPipeline::new(config_for(&dir));
        let sources = pipeline.extract().unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].facility_id, "111");
        assert_eq!(sources[1].facility_id, "222");
        assert!(sources[1].reports[0].path.ends_with("report-1.html"));
        assert!(sources[1].reports[1].path.ends_with("report-2.html"));
    }

    #[test]
    fn test_extract_ignores_non_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("reports");
        write_report(&root, "111", "report-1.html", "a");
        write_report(&root, "111", "notes.txt", "skip me");
        fs::write(root.join("stray.html"), "not in a facility dir").unwrap();

        let pipeline = ReportPipeline::new(config_for(&dir));
        let sources = pipeline.extract().unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].reports.len(), 1);
    }

    #[test]
    fn test_extract_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("reports");
        let facility = root.join("111");
        fs::create_dir_all(&facility).unwrap();
        fs::write(facility.join("report-1.html"), b"Capacity: 30 \xff\xfe").unwrap();

        let pipeline = ReportPipeline::new(config_for(&dir));
        let sources = pipeline.extract().unwrap();

        assert!(sources[0].reports[0].text.starts_with("Capacity: 30"));
    }

    #[test]
    fn test_transform_collects_records_and_audit() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ReportPipeline::new(config_for(&dir));

        let sources = vec![
            FacilityDocs {
                facility_id: "111".to_string(),
                reports: vec![ReportDoc {
                    path: "report-1.html".to_string(),
                    text: "<table><tr><td>Capacity</td><td>45</td></tr></table>".to_string(),
                }],
            },
            FacilityDocs {
                facility_id: "222".to_string(),
                reports: vec![ReportDoc {
                    path: "report-1.html".to_string(),
                    text: "nothing".to_string(),
                }],
            },
        ];

        let outcome = pipeline.transform(sources).unwrap();
        assert_eq!(outcome.audit_rows.len(), 2);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(
            outcome.records["111"].capacity.as_deref(),
            Some("45")
        );
    }

    #[test]
    fn test_load_writes_audit_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        let audit_out = PathBuf::from(config.audit_out.clone());
        let pipeline = ReportPipeline::new(config);

        let sources = vec![FacilityDocs {
            facility_id: "111".to_string(),
            reports: vec![ReportDoc {
                path: "report-1.html".to_string(),
                text: "Capacity: 30".to_string(),
            }],
        }];
        let outcome = pipeline.transform(sources).unwrap();
        let written = pipeline.load(&outcome).unwrap();

        assert_eq!(written, audit_out.display().to_string());
        let contents = fs::read_to_string(&audit_out).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "facility_id,report_path,report_date,capacity,total_enrolled,method,snippet"
        );
        assert!(lines.next().unwrap().starts_with("111,report-1.html,"));
    }
}
