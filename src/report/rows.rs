// Per-tier result rows, accumulation and ranking
use crate::analyzer::{Classification, Status};

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

fn yes_no(flag: bool) -> CellValue {
    CellValue::Text(if flag { "YES" } else { "NO" }.to_string())
}

fn optional_number(value: Option<f64>) -> CellValue {
    value.map_or(CellValue::Blank, CellValue::Number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    AllStocks,
    WithC0,
    WithoutC0,
    WithC0Pullback,
}

impl Tier {
    /// Sheet order of the report.
    pub const ALL: [Tier; 4] = [Tier::AllStocks, Tier::WithC0, Tier::WithoutC0, Tier::WithC0Pullback];

    pub fn sheet_name(self) -> &'static str {
        match self {
            Tier::AllStocks => "ALL_STOCKS",
            Tier::WithC0 => "WITH_C0",
            Tier::WithoutC0 => "WITHOUT_C0",
            Tier::WithC0Pullback => "WITH_C0_PULLBACK",
        }
    }
}

/// A row type with a fixed column layout.
pub trait TierRow {
    /// Column titles, starting with the rank column.
    const HEADERS: &'static [&'static str];

    fn rel_return(&self) -> f64;

    /// Cells after the rank column.
    fn cells(&self) -> Vec<CellValue>;
}

/// Fields shared by every tier; also the full WITHOUT_C0 layout.
#[derive(Debug, Clone, PartialEq)]
pub struct WithoutC0Row {
    pub stock: String,
    pub close: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub volume_ok: bool,
    pub rsi: Option<f64>,
    pub rel_return: f64,
}

impl WithoutC0Row {
    fn from_classification(stock: &str, c: &Classification) -> Self {
        Self {
            stock: stock.to_string(),
            close: c.snapshot.close,
            ema20: c.snapshot.ema20,
            ema50: c.snapshot.ema50,
            ema200: c.snapshot.ema200,
            volume_ok: c.volume_ok,
            rsi: c.snapshot.rsi14,
            rel_return: c.rel_return,
        }
    }
}

impl TierRow for WithoutC0Row {
    const HEADERS: &'static [&'static str] = &[
        "S.No.", "Stock", "Close", "EMA20", "EMA50", "EMA200", "VOL>MIN", "RSI", "Rel%",
    ];

    fn rel_return(&self) -> f64 {
        self.rel_return
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.stock.clone()),
            CellValue::Number(self.close),
            CellValue::Number(self.ema20),
            CellValue::Number(self.ema50),
            CellValue::Number(self.ema200),
            yes_no(self.volume_ok),
            optional_number(self.rsi),
            CellValue::Number(self.rel_return),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithC0Row {
    pub base: WithoutC0Row,
    pub structure_ok: bool,
}

impl TierRow for WithC0Row {
    const HEADERS: &'static [&'static str] = &[
        "S.No.", "Stock", "Close", "EMA20", "EMA50", "EMA200", "VOL>MIN", "RSI", "Rel%",
        "EMA Structure OK",
    ];

    fn rel_return(&self) -> f64 {
        self.base.rel_return
    }

    fn cells(&self) -> Vec<CellValue> {
        let mut cells = self.base.cells();
        cells.push(yes_no(self.structure_ok));
        cells
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithC0PullbackRow {
    pub base: WithoutC0Row,
    pub structure_ok: bool,
    pub pullback_ok: bool,
}

impl TierRow for WithC0PullbackRow {
    const HEADERS: &'static [&'static str] = &[
        "S.No.", "Stock", "Close", "EMA20", "EMA50", "EMA200", "VOL>MIN", "RSI", "Rel%",
        "EMA Structure OK", "Pullback EMA20/50",
    ];

    fn rel_return(&self) -> f64 {
        self.base.rel_return
    }

    fn cells(&self) -> Vec<CellValue> {
        let mut cells = self.base.cells();
        cells.push(yes_no(self.structure_ok));
        cells.push(yes_no(self.pullback_ok));
        cells
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllStocksRow {
    pub base: WithoutC0Row,
    pub structure_ok: bool,
    pub pullback_ok: bool,
    pub status: Status,
}

impl TierRow for AllStocksRow {
    const HEADERS: &'static [&'static str] = &[
        "S.No.", "Stock", "Close", "EMA20", "EMA50", "EMA200", "VOL>MIN", "RSI", "Rel%",
        "EMA Structure OK", "Pullback EMA20/50", "STATUS",
    ];

    fn rel_return(&self) -> f64 {
        self.base.rel_return
    }

    fn cells(&self) -> Vec<CellValue> {
        let mut cells = self.base.cells();
        cells.push(yes_no(self.structure_ok));
        cells.push(yes_no(self.pullback_ok));
        cells.push(CellValue::Text(self.status.label().to_string()));
        cells
    }
}

/// A row with its 1-based position after ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub row: T,
}

impl<T: TierRow> Ranked<T> {
    pub fn cells(&self) -> Vec<CellValue> {
        let mut cells = Vec::with_capacity(T::HEADERS.len());
        cells.push(CellValue::Number(self.rank as f64));
        cells.extend(self.row.cells());
        cells
    }
}

/// Sorts by relative return, highest first, keeping insertion order on ties.
pub fn rank_rows<T: TierRow>(mut rows: Vec<T>) -> Vec<Ranked<T>> {
    rows.sort_by(|a, b| b.rel_return().total_cmp(&a.rel_return()));
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| Ranked { rank: i + 1, row })
        .collect()
}

/// Rows accumulated during one scan, in processing order.
#[derive(Debug, Default)]
pub struct ScanResultSet {
    pub all_stocks: Vec<AllStocksRow>,
    pub with_c0: Vec<WithC0Row>,
    pub without_c0: Vec<WithoutC0Row>,
    pub with_c0_pullback: Vec<WithC0PullbackRow>,
}

impl ScanResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one classified symbol to every tier it qualifies for.
    pub fn record(&mut self, stock: &str, c: &Classification) {
        let base = WithoutC0Row::from_classification(stock, c);

        self.all_stocks.push(AllStocksRow {
            base: base.clone(),
            structure_ok: c.structure_ok,
            pullback_ok: c.pullback_ok,
            status: c.status(),
        });

        if c.in_without_c0() {
            self.without_c0.push(base.clone());
        }
        if c.in_with_c0() {
            self.with_c0.push(WithC0Row {
                base: base.clone(),
                structure_ok: c.structure_ok,
            });
        }
        if c.in_with_c0_pullback() {
            self.with_c0_pullback.push(WithC0PullbackRow {
                base,
                structure_ok: c.structure_ok,
                pullback_ok: c.pullback_ok,
            });
        }
    }

    pub fn rank(self) -> RankedResultSet {
        RankedResultSet {
            all_stocks: rank_rows(self.all_stocks),
            with_c0: rank_rows(self.with_c0),
            without_c0: rank_rows(self.without_c0),
            with_c0_pullback: rank_rows(self.with_c0_pullback),
        }
    }
}

/// The four tiers after ranking.
#[derive(Debug, Default)]
pub struct RankedResultSet {
    pub all_stocks: Vec<Ranked<AllStocksRow>>,
    pub with_c0: Vec<Ranked<WithC0Row>>,
    pub without_c0: Vec<Ranked<WithoutC0Row>>,
    pub with_c0_pullback: Vec<Ranked<WithC0PullbackRow>>,
}

impl RankedResultSet {
    pub fn len(&self, tier: Tier) -> usize {
        match tier {
            Tier::AllStocks => self.all_stocks.len(),
            Tier::WithC0 => self.with_c0.len(),
            Tier::WithoutC0 => self.without_c0.len(),
            Tier::WithC0Pullback => self.with_c0_pullback.len(),
        }
    }

    pub fn headers(tier: Tier) -> &'static [&'static str] {
        match tier {
            Tier::AllStocks => AllStocksRow::HEADERS,
            Tier::WithC0 => WithC0Row::HEADERS,
            Tier::WithoutC0 => WithoutC0Row::HEADERS,
            Tier::WithC0Pullback => WithC0PullbackRow::HEADERS,
        }
    }

    /// Sheet cells of a tier, rank column included.
    pub fn sheet_rows(&self, tier: Tier) -> Vec<Vec<CellValue>> {
        match tier {
            Tier::AllStocks => self.all_stocks.iter().map(Ranked::cells).collect(),
            Tier::WithC0 => self.with_c0.iter().map(Ranked::cells).collect(),
            Tier::WithoutC0 => self.without_c0.iter().map(Ranked::cells).collect(),
            Tier::WithC0Pullback => self.with_c0_pullback.iter().map(Ranked::cells).collect(),
        }
    }

    /// `(stock, rank, rel_return)` triples of a tier, in rank order.
    pub fn summary(&self, tier: Tier) -> Vec<(&str, usize, f64)> {
        fn pick<T: TierRow>(rows: &[Ranked<T>], stock: impl Fn(&T) -> &str) -> Vec<(&str, usize, f64)> {
            rows.iter()
                .map(|r| (stock(&r.row), r.rank, r.row.rel_return()))
                .collect()
        }
        match tier {
            Tier::AllStocks => pick(&self.all_stocks, |r| r.base.stock.as_str()),
            Tier::WithC0 => pick(&self.with_c0, |r| r.base.stock.as_str()),
            Tier::WithoutC0 => pick(&self.without_c0, |r| r.stock.as_str()),
            Tier::WithC0Pullback => pick(&self.with_c0_pullback, |r| r.base.stock.as_str()),
        }
    }
}
