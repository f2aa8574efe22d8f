// Scan orchestration: benchmark once, then fetch -> snapshot -> classify per symbol
use crate::analyzer::market_indicators::MarketAnalyzer;
use crate::analyzer::price_analysis::MIN_BARS;
use crate::analyzer::{Analyzer, AnalyzerImpl};
use crate::config::{AppConfig, ScanThresholds};
use crate::model::{IndicatorError, IndicatorSnapshot, ScanError, SeriesRequest, SymbolError};
use crate::normalizer::display_name;
use crate::notifier::ScanProgress;
use crate::provider::MarketDataProvider;
use crate::report::{RankedResultSet, ReportExporter, ScanResultSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Provider query parameters shared by every request of a scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub benchmark_symbol: String,
    pub symbol_suffix: String,
    pub lookback: String,
    pub interval: String,
}

impl From<&AppConfig> for ScanSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            benchmark_symbol: cfg.benchmark_symbol.clone(),
            symbol_suffix: cfg.symbol_suffix.clone(),
            lookback: cfg.lookback.clone(),
            interval: cfg.interval.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub results: RankedResultSet,
    pub report_path: PathBuf,
    pub total: usize,
    pub classified: usize,
    pub skipped: usize,
}

pub struct Scanner<P: MarketDataProvider> {
    provider: P,
    analyzer: AnalyzerImpl,
    exporter: ReportExporter,
    settings: ScanSettings,
    universe: Vec<String>,
}

impl<P: MarketDataProvider> Scanner<P> {
    pub fn new(provider: P, universe: Vec<String>, settings: ScanSettings, exporter: ReportExporter) -> Self {
        Self {
            provider,
            analyzer: AnalyzerImpl::new(),
            exporter,
            settings,
            universe,
        }
    }

    /// Runs one full scan and writes the report.
    ///
    /// Symbols are processed one after another. A symbol that cannot be fetched or
    /// analysed is skipped; benchmark and report failures abort the scan.
    pub async fn run(&self, thresholds: &ScanThresholds, progress: &dyn ScanProgress) -> Result<ScanOutcome, ScanError> {
        let started = Instant::now();
        let total = self.universe.len();
        info!(
            "🚀 Scan started: {} symbols vs {}",
            total, self.settings.benchmark_symbol
        );

        let benchmark_weekly = self.benchmark_weekly_return().await?;
        info!("📊 Benchmark weekly return: {:.2}%", benchmark_weekly);

        let mut rows = ScanResultSet::new();
        let mut classified = 0;
        let mut skipped = 0;

        for (i, symbol) in self.universe.iter().enumerate() {
            let name = display_name(symbol, &self.settings.symbol_suffix);

            match self.evaluate_symbol(symbol).await {
                Ok(snapshot) => {
                    let classification = self.analyzer.classify(snapshot, benchmark_weekly, thresholds);
                    rows.record(name, &classification);
                    classified += 1;
                }
                Err(e) => {
                    debug!("⏭️ Skipping {}: {}", symbol, e);
                    skipped += 1;
                }
            }

            progress.on_symbol(name, i + 1, total);
        }

        let results = rows.rank();
        let report_path = self.exporter.export(&results)?;

        info!(
            "✅ Scan finished in {:.1}s: {} classified, {} skipped",
            started.elapsed().as_secs_f64(),
            classified,
            skipped
        );

        Ok(ScanOutcome {
            results,
            report_path,
            total,
            classified,
            skipped,
        })
    }

    fn request(&self, symbol: &str) -> SeriesRequest {
        SeriesRequest {
            symbol: symbol.to_string(),
            lookback: self.settings.lookback.clone(),
            interval: self.settings.interval.clone(),
        }
    }

    async fn benchmark_weekly_return(&self) -> Result<f64, ScanError> {
        let symbol = &self.settings.benchmark_symbol;
        let series = self
            .provider
            .fetch(&self.request(symbol))
            .await
            .map_err(|source| ScanError::BenchmarkFetch {
                symbol: symbol.clone(),
                source,
            })?;

        if series.len() < MIN_BARS {
            return Err(ScanError::BenchmarkData {
                symbol: symbol.clone(),
                source: IndicatorError::InsufficientData {
                    bars: series.len(),
                    required: MIN_BARS,
                },
            });
        }

        MarketAnalyzer::weekly_return_pct(&series.closes()).ok_or_else(|| ScanError::BenchmarkData {
            symbol: symbol.clone(),
            source: IndicatorError::NonFinite("weekly return"),
        })
    }

    async fn evaluate_symbol(&self, symbol: &str) -> Result<IndicatorSnapshot, SymbolError> {
        let series = self.provider.fetch(&self.request(symbol)).await?;
        Ok(self.analyzer.snapshot(&series)?)
    }
}
