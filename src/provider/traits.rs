use crate::model::{PriceSeries, ProviderError, SeriesRequest};

/// Source of daily OHLCV history.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(&self, req: &SeriesRequest) -> Result<PriceSeries, ProviderError>;
}
