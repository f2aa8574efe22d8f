use crate::model::{PriceBar, PriceSeries, ProviderError, SeriesRequest};
use crate::provider::traits::MarketDataProvider;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Chart-API client returning split/dividend adjusted daily bars.
pub struct YahooProvider {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl YahooProvider {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) SwingScanner/0.1")
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    fn build_url(&self, req: &SeriesRequest) -> String {
        let symbol = req.symbol.replace('^', "%5E");
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch(&self, req: &SeriesRequest) -> Result<PriceSeries, ProviderError> {
        let url = self.build_url(req);
        debug!("Fetching {} ({} / {})", req.symbol, req.lookback, req.interval);

        let send = self
            .client
            .get(&url)
            .query(&[("range", req.lookback.as_str()), ("interval", req.interval.as_str())])
            .send();

        let response = match timeout(self.request_timeout, send).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) if e.is_timeout() => return Err(ProviderError::Timeout),
            Ok(Err(e)) => return Err(ProviderError::Http(e.to_string())),
            Err(_) => return Err(ProviderError::Timeout),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NoData(req.symbol.clone()));
        }
        if !status.is_success() {
            return Err(ProviderError::InvalidResponse(format!("status {}", status)));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let series = normalize_chart(&req.symbol, body)?;
        debug!("Fetched {} bars for {}", series.len(), req.symbol);
        Ok(series)
    }
}

/// Flattens the nested chart payload into ascending bars.
///
/// Rows with any missing field are dropped. When an adjusted close column is
/// present, open/high/low/close are scaled by `adjclose / close`.
pub(crate) fn normalize_chart(symbol: &str, response: ChartResponse) -> Result<PriceSeries, ProviderError> {
    if let Some(err) = response.chart.error {
        return Err(ProviderError::InvalidResponse(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NoData(symbol.to_string()))?;

    if data.timestamp.is_empty() {
        return Err(ProviderError::NoData(symbol.to_string()));
    }

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(ProviderError::MissingColumn("quote"))?;

    let close = quote.close.ok_or(ProviderError::MissingColumn("close"))?;
    let open = quote.open.ok_or(ProviderError::MissingColumn("open"))?;
    let high = quote.high.ok_or(ProviderError::MissingColumn("high"))?;
    let low = quote.low.ok_or(ProviderError::MissingColumn("low"))?;
    let volume = quote.volume.ok_or(ProviderError::MissingColumn("volume"))?;
    let adjclose = data
        .indicators
        .adjclose
        .into_iter()
        .next()
        .and_then(|c| c.adjclose);

    let cell = |col: &Vec<Option<f64>>, i: usize| col.get(i).copied().flatten().filter(|v| v.is_finite());

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let (Some(o), Some(h), Some(l), Some(c), Some(v)) = (
            cell(&open, i),
            cell(&high, i),
            cell(&low, i),
            cell(&close, i),
            cell(&volume, i),
        ) else {
            continue;
        };

        let factor = match adjclose.as_ref().and_then(|col| cell(col, i)) {
            Some(adj) if c != 0.0 => adj / c,
            _ => 1.0,
        };

        bars.push(PriceBar {
            date,
            open: o * factor,
            high: h * factor,
            low: l * factor,
            close: c * factor,
            volume: v,
        });
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData(symbol.to_string()));
    }

    Ok(PriceSeries::new(symbol, bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn flattens_quote_columns_and_drops_gaps() {
        let body = parse(
            r#"{"chart":{"result":[{
                "timestamp":[1704153600,1704067200,1704240000],
                "indicators":{
                    "quote":[{"open":[10.0,9.0,null],"high":[11.0,10.0,12.0],"low":[9.5,8.5,10.5],
                              "close":[10.5,9.5,11.5],"volume":[1000,900,1100]}],
                    "adjclose":[{"adjclose":[21.0,19.0,23.0]}]
                }}],"error":null}}"#,
        );
        let series = normalize_chart("TEST.NS", body).unwrap();
        assert_eq!(series.len(), 2);
        // sorted ascending, adjusted by adjclose / close = 2
        assert_eq!(series.bars[0].close, 19.0);
        assert_eq!(series.bars[0].low, 17.0);
        assert_eq!(series.bars[1].close, 21.0);
        assert_eq!(series.bars[1].volume, 1000.0);
        assert!(series.bars[0].date < series.bars[1].date);
    }

    #[test]
    fn unadjusted_when_adjclose_missing() {
        let body = parse(
            r#"{"chart":{"result":[{"timestamp":[1704067200],
                "indicators":{"quote":[{"open":[1.0],"high":[2.0],"low":[0.5],"close":[1.5],"volume":[10]}]}}],
                "error":null}}"#,
        );
        let series = normalize_chart("X.NS", body).unwrap();
        assert_eq!(series.bars[0].close, 1.5);
    }

    #[test]
    fn missing_close_column_is_reported() {
        let body = parse(
            r#"{"chart":{"result":[{"timestamp":[1704067200],
                "indicators":{"quote":[{"open":[1.0],"high":[2.0],"low":[0.5],"volume":[10]}]}}],
                "error":null}}"#,
        );
        assert!(matches!(
            normalize_chart("X.NS", body),
            Err(ProviderError::MissingColumn("close"))
        ));
    }

    #[test]
    fn api_error_and_empty_result() {
        let body = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        assert!(matches!(
            normalize_chart("GONE.NS", body),
            Err(ProviderError::InvalidResponse(_))
        ));

        let body = parse(r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#);
        assert!(matches!(normalize_chart("EMPTY.NS", body), Err(ProviderError::NoData(_))));
    }

    #[test]
    fn index_symbols_are_escaped() {
        let provider = YahooProvider::new("https://example.test/", Duration::from_secs(1)).unwrap();
        let req = SeriesRequest {
            symbol: "^NSEI".into(),
            lookback: "1y".into(),
            interval: "1d".into(),
        };
        assert_eq!(provider.build_url(&req), "https://example.test/v8/finance/chart/%5ENSEI");
    }
}
