use serde::Serialize;
use std::fmt;

/// Bar timeframe requested from a market data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Hourly,
    Daily,
}

impl Timeframe {
    /// Terminal timeframe code ("H1", "D1").
    pub fn terminal_code(&self) -> &'static str {
        match self {
            Timeframe::Hourly => "H1",
            Timeframe::Daily => "D1",
        }
    }

    /// Bar length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::Hourly => 3600,
            Timeframe::Daily => 86400,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Hourly => write!(f, "hourly"),
            Timeframe::Daily => write!(f, "daily"),
        }
    }
}

/// One OHLC bar. `time` is the bar open in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Trading range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Latest tradable price for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub bid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    /// Quote time in milliseconds.
    pub time: i64,
}

impl Quote {
    pub fn new(bid: f64) -> Self {
        Self {
            bid,
            ask: None,
            time: chrono::Utc::now().timestamp_millis(),
        }
    }
}
