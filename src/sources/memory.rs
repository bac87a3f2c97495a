//! In-memory market data, for tests and offline runs.

use async_trait::async_trait;

use super::{take_last, MarketDataSource};
use crate::error::SourceError;
use crate::types::{PriceBar, Quote, Timeframe};

/// Fixed quote and bar history for a single symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    symbol: String,
    quote: Option<Quote>,
    hourly: Vec<PriceBar>,
    daily: Vec<PriceBar>,
}

impl StaticMarketData {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            ..Self::default()
        }
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_hourly(mut self, bars: Vec<PriceBar>) -> Self {
        self.hourly = bars;
        self
    }

    pub fn with_daily(mut self, bars: Vec<PriceBar>) -> Self {
        self.daily = bars;
        self
    }

    /// Hourly bars from closing prices, oldest first.
    pub fn hourly_closes(self, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                time: i as i64 * Timeframe::Hourly.seconds() * 1000,
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect();
        self.with_hourly(bars)
    }

    /// Daily bars from (high, low) pairs, oldest first.
    pub fn daily_ranges(self, ranges: &[(f64, f64)]) -> Self {
        let bars = ranges
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| PriceBar {
                time: i as i64 * Timeframe::Daily.seconds() * 1000,
                open: low,
                high,
                low,
                close: high,
            })
            .collect();
        self.with_daily(bars)
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    fn name(&self) -> &str {
        "static"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, SourceError> {
        if !symbol.eq_ignore_ascii_case(&self.symbol) {
            return Ok(None);
        }
        Ok(self.quote)
    }

    async fn bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<PriceBar>, SourceError> {
        if !symbol.eq_ignore_ascii_case(&self.symbol) {
            return Ok(Vec::new());
        }
        let series = match timeframe {
            Timeframe::Hourly => &self.hourly,
            Timeframe::Daily => &self.daily,
        };
        Ok(take_last(series.clone(), count))
    }
}
