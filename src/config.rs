use crate::model::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-tunable screening thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanThresholds {
    #[serde(default = "default_rel_return_min")]
    pub rel_return_min: f64,
    #[serde(default = "default_rel_return_max")]
    pub rel_return_max: f64,
    #[serde(default = "default_rsi_min")]
    pub rsi_min: f64,
    #[serde(default = "default_rsi_max")]
    pub rsi_max: f64,
    #[serde(default = "default_min_volume")]
    pub min_volume: u64,
}

impl Default for ScanThresholds {
    fn default() -> Self {
        Self {
            rel_return_min: default_rel_return_min(),
            rel_return_max: default_rel_return_max(),
            rsi_min: default_rsi_min(),
            rsi_max: default_rsi_max(),
            min_volume: default_min_volume(),
        }
    }
}

fn default_rel_return_min() -> f64 {
    0.5
}

fn default_rel_return_max() -> f64 {
    10.0
}

fn default_rsi_min() -> f64 {
    30.0
}

fn default_rsi_max() -> f64 {
    75.0
}

fn default_min_volume() -> u64 {
    300_000
}

impl ScanThresholds {
    /// Checks every threshold against the range the control surface allows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("rel_return_min", self.rel_return_min, 0.0, 10.0)?;
        check_range("rel_return_max", self.rel_return_max, 0.0, 15.0)?;
        check_range("rsi_min", self.rsi_min, 10.0, 50.0)?;
        check_range("rsi_max", self.rsi_max, 50.0, 90.0)?;
        check_range("min_volume", self.min_volume as f64, 100_000.0, 2_000_000.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// CSV file with a `Symbol` column.
    #[serde(default = "default_universe_path")]
    pub universe_path: PathBuf,
    /// Exchange qualifier appended to every universe symbol.
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,
    #[serde(default = "default_benchmark_symbol")]
    pub benchmark_symbol: String,
    #[serde(default = "default_lookback")]
    pub lookback: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Per-day report folders are created below this directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_report_name")]
    pub report_name: String,
    #[serde(default)]
    pub thresholds: ScanThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            universe_path: default_universe_path(),
            symbol_suffix: default_symbol_suffix(),
            benchmark_symbol: default_benchmark_symbol(),
            lookback: default_lookback(),
            interval: default_interval(),
            provider_base_url: default_provider_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
            output_dir: default_output_dir(),
            report_name: default_report_name(),
            thresholds: ScanThresholds::default(),
        }
    }
}

fn default_universe_path() -> PathBuf {
    PathBuf::from("nifty500.csv")
}

fn default_symbol_suffix() -> String {
    ".NS".to_string()
}

fn default_benchmark_symbol() -> String {
    "^NSEI".to_string()
}

fn default_lookback() -> String {
    "1y".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    15
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_report_name() -> String {
    "nifty500_scan".to_string()
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{ "benchmark_symbol": "^BSESN", "thresholds": { "rsi_max": 80 } }"#)
                .unwrap();
        assert_eq!(cfg.benchmark_symbol, "^BSESN");
        assert_eq!(cfg.symbol_suffix, ".NS");
        assert_eq!(cfg.report_name, "nifty500_scan");
        assert_eq!(cfg.thresholds.rsi_max, 80.0);
        assert_eq!(cfg.thresholds.rsi_min, 30.0);
        assert_eq!(cfg.thresholds.min_volume, 300_000);
    }

    #[test]
    fn default_thresholds_are_valid() {
        assert!(ScanThresholds::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let thresholds = ScanThresholds {
            rsi_max: 95.0,
            ..ScanThresholds::default()
        };
        match thresholds.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "rsi_max"),
            other => panic!("unexpected result: {:?}", other),
        }

        let thresholds = ScanThresholds {
            min_volume: 50_000,
            ..ScanThresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn load_config_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "output_dir": "reports" }"#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.thresholds, ScanThresholds::default());
    }
}
