// Core structs: PriceBar, PriceSeries, IndicatorSnapshot and error types
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// One trading session.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bars of a single symbol, ascending by date.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Indicator values for the most recent bar of a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub close: f64,
    pub low: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    /// `None` while fewer than 14 bars are available.
    pub rsi14: Option<f64>,
    pub volume: u64,
    pub weekly_return_pct: f64,
}

/// What the scan asks a provider for.
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub symbol: String,
    pub lookback: String,
    pub interval: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing column: {0}")]
    MissingColumn(&'static str),
    #[error("no data for {0}")]
    NoData(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient data: {bars} bars, need at least {required}")]
    InsufficientData { bars: usize, required: usize },
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),
}

/// Why a single symbol was left out of the scan.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ProviderError),
    #[error("indicator computation failed: {0}")]
    Indicator(#[from] IndicatorError),
}

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("cannot read universe file: {0}")]
    Csv(#[from] csv::Error),
    #[error("universe file has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("universe is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("unknown sheet: {0}")]
    UnknownSheet(String),
    #[error("report file {path} could not be created after retry: {source}")]
    Contention {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("benchmark {symbol} fetch failed: {source}")]
    BenchmarkFetch {
        symbol: String,
        source: ProviderError,
    },
    #[error("benchmark {symbol} has unusable data: {source}")]
    BenchmarkData {
        symbol: String,
        source: IndicatorError,
    },
    #[error("report write failed: {0}")]
    Report(#[from] ReportError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
