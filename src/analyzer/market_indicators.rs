/// Stateless trend and momentum indicators over close series.
pub struct MarketAnalyzer;

impl MarketAnalyzer {
    pub const RSI_PERIOD: usize = 14;
    pub const WEEK_BARS: usize = 5;

    /// Exponential moving average with `alpha = 2 / (span + 1)`.
    ///
    /// Bias-adjusted weighting: each value is the `(1 - alpha)^i` weighted mean of
    /// all closes so far, so the first value is the first close and every value
    /// stays inside the observed close range.
    pub fn ema(closes: &[f64], span: usize) -> Vec<f64> {
        let alpha = 2.0 / (span as f64 + 1.0);
        let decay = 1.0 - alpha;
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        closes
            .iter()
            .map(|&close| {
                weighted_sum = close + decay * weighted_sum;
                weight_total = 1.0 + decay * weight_total;
                weighted_sum / weight_total
            })
            .collect()
    }

    pub fn ema_latest(closes: &[f64], span: usize) -> Option<f64> {
        Self::ema(closes, span).last().copied()
    }

    /// Wilder RSI at the last close.
    ///
    /// Gains and losses are smoothed with factor `1 / period`, starting from zero on
    /// the first bar. Returns `None` until `period` bars exist.
    pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
        if period == 0 || closes.len() < period {
            return None;
        }

        let alpha = 1.0 / period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for w in closes.windows(2) {
            let delta = w[1] - w[0];
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;
        }

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }

    /// Percent change between the last close and the close `periods` bars earlier.
    pub fn pct_change(closes: &[f64], periods: usize) -> Option<f64> {
        if closes.len() <= periods {
            return None;
        }
        let last = closes[closes.len() - 1];
        let prior = closes[closes.len() - 1 - periods];
        let change = (last / prior - 1.0) * 100.0;
        change.is_finite().then_some(change)
    }

    pub fn weekly_return_pct(closes: &[f64]) -> Option<f64> {
        Self::pct_change(closes, Self::WEEK_BARS)
    }
}
