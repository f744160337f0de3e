pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::CliConfig;
pub use crate::core::aggregate::FacilityAggregator;
pub use crate::core::cascade::ExtractionCascade;
pub use crate::core::etl::CapacityEngine;
pub use crate::core::merge::MergeReconciler;
pub use crate::core::pipeline::ReportPipeline;
pub use crate::utils::error::{EtlError, Result};
