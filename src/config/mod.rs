use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ccld-etl")]
#[command(about = "Extract licensed capacities from saved CCLD facility inspection reports")]
pub struct CliConfig {
    #[arg(
        long,
        default_value = "data/ccld-reports",
        help = "Directory with saved report HTML by facility id"
    )]
    pub reports_dir: String,

    #[arg(
        long,
        default_value = "data/ccld-reports-capacities.csv",
        help = "Output CSV of per-report capacities"
    )]
    pub out: String,

    #[arg(long, help = "Path to details CSV to merge capacities into")]
    pub merge: Option<String>,

    #[arg(
        long,
        help = "Update the details CSV in place (a backup is created)"
    )]
    pub write_updated: bool,

    #[arg(long, help = "Overwrite existing recent_capacity values")]
    pub force: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn reports_dir(&self) -> &str {
        &self.reports_dir
    }

    fn audit_out(&self) -> &str {
        &self.out
    }

    fn merge_target(&self) -> Option<&str> {
        self.merge.as_deref()
    }

    fn force(&self) -> bool {
        self.force
    }

    fn write_updated(&self) -> bool {
        self.write_updated
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("reports_dir", &self.reports_dir)?;
        validate_non_empty_string("reports_dir", &self.reports_dir)?;
        validate_path("out", &self.out)?;
        validate_non_empty_string("out", &self.out)?;
        if let Some(merge) = &self.merge {
            validate_path("merge", merge)?;
            validate_non_empty_string("merge", merge)?;
        }
        Ok(())
    }
}
