// Ranked results -> styled multi-sheet report file
use crate::analyzer::Status;
use crate::model::ReportError;
use crate::report::rows::{RankedResultSet, Tier};
use crate::report::writer::{FillKind, TabularReportWriter, XlsxReportWriter};
use crate::utils::{Clock, SystemClock};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ReportExporter {
    output_dir: PathBuf,
    report_name: String,
    clock: Arc<dyn Clock>,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>, report_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            report_name: report_name.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Writes all four tiers into `writer`; only ALL_STOCKS rows are styled.
    pub fn render(results: &RankedResultSet, writer: &mut dyn TabularReportWriter) -> Result<(), ReportError> {
        for tier in Tier::ALL {
            writer.write_sheet(
                tier.sheet_name(),
                RankedResultSet::headers(tier),
                results.sheet_rows(tier),
            )?;
        }

        let sheet = Tier::AllStocks.sheet_name();
        for (i, ranked) in results.all_stocks.iter().enumerate() {
            let row_index = i as u32 + 1;
            let fill = match ranked.row.status {
                Status::Ok => FillKind::Pass,
                Status::NotOk => FillKind::Fail,
            };
            writer.style_row(sheet, row_index, fill)?;
            writer.style_border(sheet, row_index)?;
        }
        Ok(())
    }

    /// Renders the report and stores it in today's folder, returning its absolute path.
    pub fn export(&self, results: &RankedResultSet) -> Result<PathBuf, ReportError> {
        let mut writer = XlsxReportWriter::new();
        Self::render(results, &mut writer)?;
        let bytes = writer.render()?;
        self.store(&bytes)
    }

    fn store(&self, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let now = self.clock.now();
        let folder = self.day_folder(now);
        fs::create_dir_all(&folder).map_err(|source| ReportError::Io {
            path: folder.clone(),
            source,
        })?;

        let base = folder.join(format!("{}.xlsx", self.report_name));
        let first = if base.exists() {
            self.stamped_path(&folder, now)
        } else {
            base
        };

        let written = match create_new(&first, bytes) {
            Ok(()) => first,
            Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::PermissionDenied) => {
                warn!("⚠️ Report file {} unavailable ({}), retrying", first.display(), e);
                let retry = self.stamped_path(&folder, self.clock.now());
                create_new(&retry, bytes).map_err(|source| ReportError::Contention {
                    path: retry.clone(),
                    source,
                })?;
                retry
            }
            Err(source) => return Err(ReportError::Io { path: first, source }),
        };

        let absolute = std::path::absolute(&written).map_err(|source| ReportError::Io {
            path: written.clone(),
            source,
        })?;
        info!("📄 Report written: {}", absolute.display());
        Ok(absolute)
    }

    fn day_folder(&self, now: DateTime<Local>) -> PathBuf {
        self.output_dir.join(now.format("%d %b%y").to_string())
    }

    fn stamped_path(&self, folder: &Path, now: DateTime<Local>) -> PathBuf {
        folder.join(format!(
            "{}_{}.xlsx",
            self.report_name,
            now.format("%Y%m%d_%H%M%S")
        ))
    }
}

/// Creates `path` exclusively; an existing file is never overwritten.
fn create_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Classification;
    use crate::config::ScanThresholds;
    use crate::model::IndicatorSnapshot;
    use crate::report::rows::{CellValue, ScanResultSet};
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    /// Advances one second per call.
    struct SteppingClock(Mutex<DateTime<Local>>);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Local> {
            let mut current = self.0.lock().unwrap();
            let now = *current;
            *current = now + chrono::Duration::seconds(1);
            now
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 17, h, m, s).unwrap()
    }

    #[derive(Default)]
    struct RecordingWriter {
        sheets: Vec<(String, Vec<String>, usize)>,
        fills: Vec<(String, u32, FillKind)>,
        borders: Vec<(String, u32)>,
    }

    impl TabularReportWriter for RecordingWriter {
        fn write_sheet(&mut self, name: &str, header: &[&str], rows: Vec<Vec<CellValue>>) -> Result<(), ReportError> {
            self.sheets.push((
                name.to_string(),
                header.iter().map(|h| h.to_string()).collect(),
                rows.len(),
            ));
            Ok(())
        }

        fn style_row(&mut self, sheet: &str, row_index: u32, fill: FillKind) -> Result<(), ReportError> {
            self.fills.push((sheet.to_string(), row_index, fill));
            Ok(())
        }

        fn style_border(&mut self, sheet: &str, row_index: u32) -> Result<(), ReportError> {
            self.borders.push((sheet.to_string(), row_index));
            Ok(())
        }

        fn render(&self) -> Result<Vec<u8>, ReportError> {
            Ok(Vec::new())
        }
    }

    fn results() -> RankedResultSet {
        let mut set = ScanResultSet::new();
        for (sym, weekly, low) in [("PASS", 3.0, 94.0), ("FAIL", 6.0, 99.0)] {
            let c = Classification::evaluate(
                IndicatorSnapshot {
                    symbol: format!("{}.NS", sym),
                    close: 100.0,
                    low,
                    ema20: 95.0,
                    ema50: 90.0,
                    ema200: 85.0,
                    rsi14: Some(50.0),
                    volume: 500_000,
                    weekly_return_pct: weekly,
                },
                1.0,
                &ScanThresholds::default(),
            );
            set.record(sym, &c);
        }
        set.rank()
    }

    #[test]
    fn render_styles_only_all_stocks() {
        let mut writer = RecordingWriter::default();
        ReportExporter::render(&results(), &mut writer).unwrap();

        let names: Vec<&str> = writer.sheets.iter().map(|s| s.0.as_str()).collect();
        assert_eq!(names, vec!["ALL_STOCKS", "WITH_C0", "WITHOUT_C0", "WITH_C0_PULLBACK"]);
        assert_eq!(writer.sheets[0].1.last().map(String::as_str), Some("STATUS"));
        assert_eq!(writer.sheets[0].2, 2);
        assert_eq!(writer.sheets[3].2, 1);

        // FAIL ranks first on rel_return, PASS second
        assert_eq!(
            writer.fills,
            vec![
                ("ALL_STOCKS".to_string(), 1, FillKind::Fail),
                ("ALL_STOCKS".to_string(), 2, FillKind::Pass),
            ]
        );
        assert_eq!(writer.borders.len(), 2);
        assert!(writer.borders.iter().all(|(sheet, _)| sheet == "ALL_STOCKS"));
    }

    #[test]
    fn empty_results_render_header_only_sheets() {
        let mut writer = RecordingWriter::default();
        ReportExporter::render(&RankedResultSet::default(), &mut writer).unwrap();
        assert_eq!(writer.sheets.len(), 4);
        assert!(writer.sheets.iter().all(|(_, header, rows)| !header.is_empty() && *rows == 0));
        assert!(writer.fills.is_empty() && writer.borders.is_empty());
    }

    #[test]
    fn second_export_same_day_gets_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path(), "nifty500_scan")
            .with_clock(Arc::new(FixedClock(at(9, 30, 0))));

        let first = exporter.export(&results()).unwrap();
        let second = exporter.export(&RankedResultSet::default()).unwrap();

        assert_ne!(first, second);
        assert!(first.is_absolute());
        assert_eq!(first.parent().unwrap().file_name().unwrap(), "17 Oct26");
        assert_eq!(first.file_name().unwrap(), "nifty500_scan.xlsx");
        assert_eq!(second.file_name().unwrap(), "nifty500_scan_20261017_093000.xlsx");
        assert!(fs::read(&first).unwrap().starts_with(b"PK"));
        assert!(fs::read(&second).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn collision_retries_once_with_fresh_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("17 Oct26");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("scan.xlsx"), b"old").unwrap();
        fs::write(folder.join("scan_20261017_101500.xlsx"), b"old").unwrap();

        let exporter = ReportExporter::new(dir.path(), "scan")
            .with_clock(Arc::new(SteppingClock(Mutex::new(at(10, 15, 0)))));
        let path = exporter.export(&results()).unwrap();

        assert_eq!(path.file_name().unwrap(), "scan_20261017_101501.xlsx");
        assert_eq!(fs::read(folder.join("scan.xlsx")).unwrap(), b"old");
    }

    #[test]
    fn second_collision_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path(), "scan")
            .with_clock(Arc::new(FixedClock(at(11, 0, 0))));

        exporter.export(&results()).unwrap();
        exporter.export(&results()).unwrap();
        match exporter.export(&results()) {
            Err(ReportError::Contention { path, .. }) => {
                assert_eq!(path.file_name().unwrap(), "scan_20261017_110000.xlsx");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
