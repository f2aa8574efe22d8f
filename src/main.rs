mod analyzer;
mod config;
mod model;
mod normalizer;
mod notifier;
mod provider;
mod report;
mod scanner;
mod universe;
mod utils;

use clap::Parser;
use config::{load_config, AppConfig, ScanThresholds};
use notifier::LogProgress;
use provider::YahooProvider;
use report::{RankedResultSet, ReportExporter, Tier};
use scanner::{ScanSettings, Scanner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use universe::{CsvUniverse, UniverseSource};

/// EMA + RSI + relative strength swing scanner.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON configuration file; defaults are used when it does not exist
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Ignore thresholds from the config file and start from the defaults
    #[arg(long)]
    reset: bool,

    /// Relative strength minimum (%)
    #[arg(long)]
    rel_return_min: Option<f64>,

    /// Relative strength maximum (%)
    #[arg(long)]
    rel_return_max: Option<f64>,

    #[arg(long)]
    rsi_min: Option<f64>,

    #[arg(long)]
    rsi_max: Option<f64>,

    /// Minimum volume of the latest session
    #[arg(long)]
    min_volume: Option<u64>,
}

impl Cli {
    fn thresholds(&self, configured: &ScanThresholds) -> ScanThresholds {
        let base = if self.reset {
            ScanThresholds::default()
        } else {
            configured.clone()
        };
        ScanThresholds {
            rel_return_min: self.rel_return_min.unwrap_or(base.rel_return_min),
            rel_return_max: self.rel_return_max.unwrap_or(base.rel_return_max),
            rsi_min: self.rsi_min.unwrap_or(base.rsi_min),
            rsi_max: self.rsi_max.unwrap_or(base.rsi_max),
            min_volume: self.min_volume.unwrap_or(base.min_volume),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        match load_config(&cli.config) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!("{} not found, using defaults", cli.config.display());
        AppConfig::default()
    };

    let thresholds = cli.thresholds(&config.thresholds);
    if let Err(e) = thresholds.validate() {
        error!("Invalid thresholds: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Thresholds: {:?}", thresholds);

    let symbols = match CsvUniverse::new(&config.universe_path, &config.symbol_suffix).symbols() {
        Ok(s) => s,
        Err(e) => {
            error!("Universe load error ({}): {}", config.universe_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    info!("Loaded {} symbols from {}", symbols.len(), config.universe_path.display());

    let provider = match YahooProvider::new(
        config.provider_base_url.clone(),
        Duration::from_secs(config.request_timeout_seconds),
    ) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize market data provider: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let exporter = ReportExporter::new(&config.output_dir, &config.report_name);
    let scanner = Scanner::new(provider, symbols, ScanSettings::from(&config), exporter);

    match scanner.run(&thresholds, &LogProgress).await {
        Ok(outcome) => {
            log_results(&outcome.results);
            info!(
                "Scanned {} symbols ({} classified, {} skipped)",
                outcome.total, outcome.classified, outcome.skipped
            );
            info!("📥 Report: {}", outcome.report_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Scan aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs each tier as a ranked list with a chart link per stock.
fn log_results(results: &RankedResultSet) {
    for tier in [Tier::WithC0, Tier::WithoutC0, Tier::WithC0Pullback, Tier::AllStocks] {
        let rows = results.summary(tier);
        info!("===== {} ({}) =====", tier.sheet_name(), rows.len());
        if rows.is_empty() {
            info!("No stocks found.");
            continue;
        }
        for (stock, rank, rel_return) in rows {
            info!(
                "{:>3}. {:<12} Rel% {:>6.2}  https://www.tradingview.com/chart/?symbol=NSE:{}",
                rank, stock, rel_return, stock
            );
        }
    }
}
