// Report module: tier rows, ranking and spreadsheet export.

pub mod export;
pub mod rows;
pub mod writer;

pub use export::ReportExporter;
pub use rows::{RankedResultSet, ScanResultSet, Tier};
