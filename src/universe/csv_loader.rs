// Symbol universe loading from a CSV file with a `Symbol` column
use crate::model::UniverseError;
use crate::normalizer::normalize_symbol;
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

pub trait UniverseSource {
    fn symbols(&self) -> Result<Vec<String>, UniverseError>;
}

pub struct CsvUniverse {
    path: PathBuf,
    suffix: String,
}

impl CsvUniverse {
    pub fn new(path: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            suffix: suffix.into(),
        }
    }
}

impl UniverseSource for CsvUniverse {
    fn symbols(&self) -> Result<Vec<String>, UniverseError> {
        let reader = csv::Reader::from_path(&self.path)?;
        collect_symbols(reader, &self.suffix)
    }
}

/// Reads the `Symbol` column, dropping blanks and duplicates in first-seen order.
pub fn parse_symbols<R: Read>(input: R, suffix: &str) -> Result<Vec<String>, UniverseError> {
    collect_symbols(csv::Reader::from_reader(input), suffix)
}

fn collect_symbols<R: Read>(mut reader: csv::Reader<R>, suffix: &str) -> Result<Vec<String>, UniverseError> {
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == "Symbol")
        .ok_or(UniverseError::MissingColumn("Symbol"))?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(symbol) = record.get(column).and_then(|raw| normalize_symbol(raw, suffix)) else {
            continue;
        };
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(symbols)
}
