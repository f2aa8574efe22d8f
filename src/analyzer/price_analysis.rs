use crate::analyzer::classification::Classification;
use crate::analyzer::market_indicators::MarketAnalyzer;
use crate::config::ScanThresholds;
use crate::model::{IndicatorError, IndicatorSnapshot, PriceSeries};
use crate::utils::round2;

/// Minimum bars needed for a five-bar weekly return.
pub const MIN_BARS: usize = MarketAnalyzer::WEEK_BARS + 1;

/// Trait defining the interface for a symbol analyzer.
pub trait Analyzer {
    /// Derives the latest-bar indicator snapshot for one series.
    fn snapshot(&self, series: &PriceSeries) -> Result<IndicatorSnapshot, IndicatorError>;

    /// Tags a snapshot into tiers relative to the benchmark's weekly return.
    fn classify(
        &self,
        snapshot: IndicatorSnapshot,
        benchmark_weekly_return_pct: f64,
        thresholds: &ScanThresholds,
    ) -> Classification;
}

/// Implementation of the EMA/RSI/relative-strength analyzer.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalyzerImpl {
    fn snapshot(&self, series: &PriceSeries) -> Result<IndicatorSnapshot, IndicatorError> {
        let latest = match series.latest() {
            Some(bar) if series.len() >= MIN_BARS => bar,
            _ => {
                return Err(IndicatorError::InsufficientData {
                    bars: series.len(),
                    required: MIN_BARS,
                });
            }
        };

        let closes = series.closes();
        let weekly_return_pct =
            MarketAnalyzer::weekly_return_pct(&closes).ok_or(IndicatorError::NonFinite("weekly return"))?;
        let ema20 = finite(MarketAnalyzer::ema_latest(&closes, 20), "ema20")?;
        let ema50 = finite(MarketAnalyzer::ema_latest(&closes, 50), "ema50")?;
        let ema200 = finite(MarketAnalyzer::ema_latest(&closes, 200), "ema200")?;
        let rsi14 = MarketAnalyzer::rsi(&closes, MarketAnalyzer::RSI_PERIOD).map(round2);

        if !latest.close.is_finite() || !latest.low.is_finite() {
            return Err(IndicatorError::NonFinite("latest bar"));
        }

        Ok(IndicatorSnapshot {
            symbol: series.symbol.clone(),
            close: round2(latest.close),
            low: latest.low,
            ema20: round2(ema20),
            ema50: round2(ema50),
            ema200: round2(ema200),
            rsi14,
            volume: latest.volume.max(0.0).trunc() as u64,
            weekly_return_pct: round2(weekly_return_pct),
        })
    }

    fn classify(
        &self,
        snapshot: IndicatorSnapshot,
        benchmark_weekly_return_pct: f64,
        thresholds: &ScanThresholds,
    ) -> Classification {
        Classification::evaluate(snapshot, benchmark_weekly_return_pct, thresholds)
    }
}

fn finite(value: Option<f64>, name: &'static str) -> Result<f64, IndicatorError> {
    value
        .filter(|v| v.is_finite())
        .ok_or(IndicatorError::NonFinite(name))
}
