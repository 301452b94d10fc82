pub mod aggregator;
pub mod dataset_analyzer;

pub use aggregator::{peak_month, Aggregator};
pub use dataset_analyzer::{DatasetAnalyzer, DatasetSummary};
