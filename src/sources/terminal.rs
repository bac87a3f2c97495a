//! Client for the brokerage terminal's HTTP bridge.
//!
//! The bridge runs next to the trading terminal and exposes its tick and
//! rates queries over HTTP. The terminal session is initialized once at
//! startup with [`TerminalBridgeClient::connect`] and released with
//! [`TerminalBridgeClient::shutdown`]. The bridge answers `503` when it has
//! lost the terminal; the next request then initializes a fresh session.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{take_last, MarketDataSource};
use crate::error::SourceError;
use crate::types::{PriceBar, Quote, Timeframe};

/// Latest tick as reported by the bridge.
#[derive(Debug, Deserialize)]
struct TickResponse {
    bid: f64,
    ask: Option<f64>,
    /// Seconds since epoch.
    time: i64,
}

/// One rates row as reported by the bridge.
#[derive(Debug, Deserialize)]
struct RateRow {
    /// Bar open, seconds since epoch.
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl From<RateRow> for PriceBar {
    fn from(row: RateRow) -> Self {
        PriceBar {
            time: row.time * 1000,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        }
    }
}

/// Terminal bridge client.
pub struct TerminalBridgeClient {
    client: Client,
    base_url: String,
    connected: AtomicBool,
}

impl TerminalBridgeClient {
    /// Create a client. No request is made until [`connect`](Self::connect).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("fxsignal/0.1")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connected: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Attach to the terminal.
    pub async fn connect(&self) -> Result<(), SourceError> {
        let url = format!("{}/initialize", self.base_url);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: "terminal".to_string(),
                status: response.status().as_u16(),
            });
        }

        self.connected.store(true, Ordering::Release);
        info!("Terminal bridge connected at {}", self.base_url);
        Ok(())
    }

    /// Release the terminal session. Safe to call when not connected.
    pub async fn shutdown(&self) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }

        let url = format!("{}/shutdown", self.base_url);
        match self.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Terminal bridge session released");
            }
            Ok(response) => warn!("Terminal shutdown returned {}", response.status()),
            Err(e) => warn!("Terminal shutdown failed: {}", e),
        }
    }

    /// Reattach if the session was never established or has been released.
    async fn ensure_connected(&self) -> Result<(), SourceError> {
        if self.is_connected() {
            return Ok(());
        }
        debug!("Terminal bridge not connected, initializing");
        self.connect().await.map_err(|e| {
            warn!("Terminal initialize failed: {}", e);
            SourceError::NotConnected
        })
    }

    /// Map a failed tick or rates status, dropping the session on `503`.
    fn status_error(&self, status: StatusCode) -> SourceError {
        if status == StatusCode::SERVICE_UNAVAILABLE
            && self.connected.swap(false, Ordering::AcqRel)
        {
            warn!("Terminal bridge lost its session, will reinitialize");
        }
        SourceError::Status {
            source_name: "terminal".to_string(),
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl MarketDataSource for TerminalBridgeClient {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, SourceError> {
        self.ensure_connected().await?;

        let url = format!("{}/symbols/{}/tick", self.base_url, symbol);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Terminal has no tick for {}", symbol);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self.status_error(response.status()));
        }

        let tick: TickResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(Some(Quote {
            bid: tick.bid,
            ask: tick.ask,
            time: tick.time * 1000,
        }))
    }

    async fn bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<PriceBar>, SourceError> {
        self.ensure_connected().await?;

        let url = format!("{}/symbols/{}/rates", self.base_url, symbol);
        let count_param = count.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("timeframe", timeframe.terminal_code()),
                ("start", "0"),
                ("count", count_param.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(self.status_error(response.status()));
        }

        let rows: Vec<RateRow> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let mut bars: Vec<PriceBar> = rows.into_iter().map(PriceBar::from).collect();
        bars.sort_by_key(|b| b.time);

        debug!(
            "Terminal returned {} {} bars for {} (requested {})",
            bars.len(),
            timeframe,
            symbol,
            count
        );

        Ok(take_last(bars, count))
    }
}
