pub mod aggregate;
pub mod cascade;
pub mod etl;
pub mod merge;
pub mod pipeline;
#[cfg(feature = "tree")]
pub mod tree;

pub use crate::domain::model::{AuditRow, Extraction, FacilityRecord, Method, ScanOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline};
pub use crate::utils::error::Result;
