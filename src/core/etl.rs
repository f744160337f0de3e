use crate::core::Pipeline;
use crate::domain::model::ScanOutcome;
use crate::utils::error::Result;

/// Drives the scan stages in order and returns the outcome for the
/// optional merge step.
pub struct CapacityEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CapacityEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<ScanOutcome> {
        println!("Starting capacity scan...");

        println!("Collecting reports...");
        let sources = self.pipeline.extract()?;
        let report_count: usize = sources.iter().map(|f| f.reports.len()).sum();
        println!(
            "Collected {} reports across {} facilities",
            report_count,
            sources.len()
        );

        println!("Extracting capacities...");
        let outcome = self.pipeline.transform(sources)?;
        println!(
            "Extracted values for {} facilities",
            outcome.records.len()
        );

        println!("Writing audit output...");
        let audit_path = self.pipeline.load(&outcome)?;
        println!("Audit saved to: {}", audit_path);

        Ok(outcome)
    }
}
