use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::model::FacilityRecord;
use crate::utils::error::Result;

/// Key columns accepted in the details table, tried in order per row; an
/// empty value falls through to the next alias.
const KEY_COLUMNS: [&str; 3] = ["facility_id", "facility", "facility_number"];

/// Columns this reconciler manages, appended to the header when missing.
const MANAGED_COLUMNS: [&str; 3] = ["recent_capacity", "total_enrolled", "recent_report_date"];

/// Merges first-found facility values into a persisted details CSV.
///
/// `recent_capacity` is written when forcing or when currently blank, using
/// the facility's capacity or, failing that, its total-enrolled count as a
/// capacity proxy; `recent_report_date` travels with it. The
/// `total_enrolled` column is updated independently under the same
/// force/blank rule. Rows keyed to unknown facilities are left untouched.
pub struct MergeReconciler<'a> {
    records: &'a BTreeMap<String, FacilityRecord>,
    force: bool,
}

impl<'a> MergeReconciler<'a> {
    pub fn new(records: &'a BTreeMap<String, FacilityRecord>, force: bool) -> Self {
        Self { records, force }
    }

    /// Apply the merge policy to `details_csv`. With `write_updated` the
    /// original file is renamed to `<name>.bak` before the merged table is
    /// written; without it the table is left untouched and only the count
    /// of rows that would change is reported. Returns the number of rows
    /// whose `recent_capacity` was (or would be) written.
    pub fn reconcile(&self, details_csv: &Path, write_updated: bool) -> Result<usize> {
        let mut reader = csv::Reader::from_path(details_csv)?;
        let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows: Vec<HashMap<String, String>> = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }

        for column in MANAGED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                headers.push(column.to_string());
            }
        }

        let mut updated = 0;
        for row in &mut rows {
            let Some(facility_id) = row_key(row) else {
                continue;
            };
            let Some(entry) = self.records.get(&facility_id) else {
                continue;
            };

            let current = row.get("recent_capacity").map(String::as_str).unwrap_or("");
            if self.force || current.trim().is_empty() {
                // prefer explicit capacity, else use total_enrolled
                let value = entry.capacity.as_deref().or(entry.total_enrolled.as_deref());
                if let Some(value) = value {
                    row.insert("recent_capacity".to_string(), value.to_string());
                    row.insert(
                        "recent_report_date".to_string(),
                        entry.report_date.clone().unwrap_or_default(),
                    );
                    updated += 1;
                }
            }

            if let Some(enrolled) = entry.total_enrolled.as_deref() {
                let current = row.get("total_enrolled").map(String::as_str).unwrap_or("");
                if self.force || current.trim().is_empty() {
                    row.insert("total_enrolled".to_string(), enrolled.to_string());
                }
            }
        }

        if write_updated {
            let backup = backup_path(details_csv);
            fs::rename(details_csv, &backup)?;

            let mut writer = csv::Writer::from_path(details_csv)?;
            writer.write_record(&headers)?;
            for row in &rows {
                let values: Vec<&str> = headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or(""))
                    .collect();
                writer.write_record(&values)?;
            }
            writer.flush()?;

            tracing::info!(
                "Merged capacities into {} (backup at {}) - updated {} rows",
                details_csv.display(),
                backup.display(),
                updated
            );
        } else {
            tracing::info!(
                "Would update {} rows in {} (run with --write-updated to apply)",
                updated,
                details_csv.display()
            );
        }

        Ok(updated)
    }
}

fn row_key(row: &HashMap<String, String>) -> Option<String> {
    KEY_COLUMNS
        .iter()
        .find_map(|column| row.get(*column).filter(|value| !value.is_empty()))
        .cloned()
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}
