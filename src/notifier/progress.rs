// notifier/progress.rs

use tracing::{debug, info};

/// Receives one call per universe symbol, after it was processed or skipped.
pub trait ScanProgress {
    fn on_symbol(&self, symbol: &str, current: usize, total: usize);
}

impl<F> ScanProgress for F
where
    F: Fn(&str, usize, usize),
{
    fn on_symbol(&self, symbol: &str, current: usize, total: usize) {
        self(symbol, current, total)
    }
}

/// Logs progress, with a percentage every tenth of the universe.
pub struct LogProgress;

impl ScanProgress for LogProgress {
    fn on_symbol(&self, symbol: &str, current: usize, total: usize) {
        let step = (total / 10).max(1);
        if current % step == 0 || current == total {
            info!("🔍 Scanning {} ({}/{}, {:.0}%)", symbol, current, total, current as f64 * 100.0 / total as f64);
        } else {
            debug!("🔍 Scanning {} ({}/{})", symbol, current, total);
        }
    }
}
