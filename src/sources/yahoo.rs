//! Yahoo Finance chart API client.
//!
//! Used as a market data source when no brokerage terminal is available.
//! The quote is the regular market price, which stands in for the bid.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{take_last, MarketDataSource};
use crate::error::SourceError;
use crate::types::{PriceBar, Quote, Timeframe};

const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
}

/// Normalize a symbol for the Yahoo API.
/// Six-letter currency pairs get the `=X` suffix (EURUSD -> EURUSD=X).
fn normalize_yahoo_symbol(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    if upper.len() == 6 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
        format!("{}=X", upper)
    } else {
        upper.replace('.', "-")
    }
}

/// Smallest chart range expected to hold `count` bars of `timeframe`.
fn range_for(timeframe: Timeframe, count: usize) -> &'static str {
    match timeframe {
        Timeframe::Hourly => match count {
            0..=100 => "5d",
            101..=450 => "1mo",
            _ => "3mo",
        },
        Timeframe::Daily => match count {
            0..=20 => "1mo",
            21..=60 => "3mo",
            61..=120 => "6mo",
            121..=250 => "1y",
            _ => "2y",
        },
    }
}

fn interval_for(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Hourly => "60m",
        Timeframe::Daily => "1d",
    }
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(YAHOO_API_URL, timeout)
    }

    /// Create a client against a different host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one chart result. `Ok(None)` when Yahoo does not know the symbol.
    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Option<YahooResult>, SourceError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            normalize_yahoo_symbol(symbol)
        );

        debug!("Fetching Yahoo Finance data: {} range={} interval={}", url, range, interval);

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval), ("includePrePost", "false")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: "yahoo".to_string(),
                status: response.status().as_u16(),
            });
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(error) = data.chart.error {
            if error.code == "Not Found" {
                return Ok(None);
            }
            return Err(SourceError::Parse(format!(
                "Yahoo API error: {} - {}",
                error.code, error.description
            )));
        }

        Ok(data.chart.result.and_then(|r| r.into_iter().next()))
    }
}

/// Build bars from a chart result, skipping rows with missing prices.
fn bars_from_result(result: YahooResult) -> Vec<PriceBar> {
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = match result.indicators.quote.into_iter().next() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            let high = highs.get(i).copied().flatten()?;
            let low = lows.get(i).copied().flatten()?;
            let close = closes.get(i).copied().flatten()?;
            let open = opens.get(i).copied().flatten().unwrap_or(close);

            if close <= 0.0 {
                return None;
            }

            Some(PriceBar {
                time: timestamp * 1000,
                open,
                high,
                low,
                close,
            })
        })
        .collect()
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, SourceError> {
        let result = match self.fetch_chart(symbol, "1d", "1d").await? {
            Some(r) => r,
            None => return Ok(None),
        };

        Ok(result.meta.regular_market_price.map(|bid| Quote {
            bid,
            ask: None,
            time: result
                .meta
                .regular_market_time
                .map(|t| t * 1000)
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        }))
    }

    async fn bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<PriceBar>, SourceError> {
        let result = self
            .fetch_chart(symbol, range_for(timeframe, count), interval_for(timeframe))
            .await?;

        Ok(take_last(result.map(bars_from_result).unwrap_or_default(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // normalize_yahoo_symbol Tests
    // =========================================================================

    #[test]
    fn test_normalize_currency_pair() {
        assert_eq!(normalize_yahoo_symbol("EURUSD"), "EURUSD=X");
        assert_eq!(normalize_yahoo_symbol("gbpjpy"), "GBPJPY=X");
    }

    #[test]
    fn test_normalize_other_symbols() {
        assert_eq!(normalize_yahoo_symbol("brk.b"), "BRK-B");
        assert_eq!(normalize_yahoo_symbol("EURUSD=X"), "EURUSD=X");
    }

    // =========================================================================
    // Range selection Tests
    // =========================================================================

    #[test]
    fn test_range_for_default_periods() {
        assert_eq!(range_for(Timeframe::Hourly, 9), "5d");
        assert_eq!(range_for(Timeframe::Hourly, 21), "5d");
        assert_eq!(range_for(Timeframe::Daily, 14), "1mo");
    }

    #[test]
    fn test_range_for_long_windows() {
        assert_eq!(range_for(Timeframe::Hourly, 200), "1mo");
        assert_eq!(range_for(Timeframe::Hourly, 1000), "3mo");
        assert_eq!(range_for(Timeframe::Daily, 50), "3mo");
        assert_eq!(range_for(Timeframe::Daily, 200), "1y");
    }

    // =========================================================================
    // Response parsing Tests
    // =========================================================================

    #[test]
    fn test_bars_from_result_skips_null_rows() {
        let json = r#"{
            "meta": {"regularMarketPrice": 1.1055},
            "timestamp": [100, 200, 300],
            "indicators": {"quote": [{
                "open": [1.10, null, 1.12],
                "high": [1.11, null, 1.13],
                "low": [1.09, null, 1.11],
                "close": [1.105, null, 1.125]
            }]}
        }"#;
        let result: YahooResult = serde_json::from_str(json).unwrap();
        let bars = bars_from_result(result);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, 100_000);
        assert_eq!(bars[1].close, 1.125);
    }

    #[test]
    fn test_chart_with_error() {
        let json = r#"{
            "result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
        }"#;
        let chart: YahooChart = serde_json::from_str(json).unwrap();
        assert!(chart.result.is_none());
        assert_eq!(chart.error.unwrap().code, "Not Found");
    }
}
