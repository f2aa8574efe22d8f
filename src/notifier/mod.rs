pub mod progress;

pub use progress::{LogProgress, ScanProgress};
