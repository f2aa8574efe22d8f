// Analyzer module: indicator math, per-symbol snapshots and tier classification.

pub mod classification;
pub mod market_indicators;
pub mod price_analysis;

pub use classification::{Classification, Status};
pub use price_analysis::{Analyzer, AnalyzerImpl};
