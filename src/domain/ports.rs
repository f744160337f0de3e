use crate::domain::model::{FacilityDocs, ScanOutcome};
use crate::utils::error::Result;

pub trait ConfigProvider {
    fn reports_dir(&self) -> &str;
    fn audit_out(&self) -> &str;
    fn merge_target(&self) -> Option<&str>;
    fn force(&self) -> bool;
    fn write_updated(&self) -> bool;
}

/// The scan runs strictly sequentially; stage order is a correctness
/// requirement for first-found-wins semantics, so the pipeline is sync.
pub trait Pipeline {
    fn extract(&self) -> Result<Vec<FacilityDocs>>;
    fn transform(&self, sources: Vec<FacilityDocs>) -> Result<ScanOutcome>;
    fn load(&self, outcome: &ScanOutcome) -> Result<String>;
}
