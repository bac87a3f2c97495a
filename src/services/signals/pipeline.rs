//! One signal evaluation: quote, ADR, moving averages, decision, targets.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{compute_adr, compute_sma, compute_targets, decide_trend};
use crate::config::SignalConfig;
use crate::error::{PipelineError, SourceError};
use crate::sources::MarketDataSource;
use crate::types::{EvaluationResult, PriceBar, Timeframe};

/// Runs evaluations against an injected market data source.
#[derive(Clone)]
pub struct SignalPipeline {
    config: Arc<SignalConfig>,
    source: Arc<dyn MarketDataSource>,
    timeout: Duration,
}

impl SignalPipeline {
    pub fn new(config: SignalConfig, source: Arc<dyn MarketDataSource>, timeout: Duration) -> Self {
        Self {
            config: Arc::new(config),
            source,
            timeout,
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Evaluate the signal for the configured symbol.
    ///
    /// Nothing is returned on failure; the first failing step aborts.
    pub async fn evaluate(&self) -> Result<EvaluationResult, PipelineError> {
        let config = &self.config;
        let symbol = config.symbol.as_str();

        let current_price = self.current_price(symbol).await?;

        let daily = self
            .fetch_bars(symbol, Timeframe::Daily, config.adr_period)
            .await?;
        let adr = compute_adr(&daily, config.adr_period)
            .map_err(|e| PipelineError::insufficient(Timeframe::Daily, e))?;

        // Two independent fetches, one per window.
        let short_bars = self
            .fetch_bars(symbol, Timeframe::Hourly, config.short_period)
            .await?;
        let short_sma = compute_sma(&short_bars, config.short_period)
            .map_err(|e| PipelineError::insufficient(Timeframe::Hourly, e))?;

        let long_bars = self
            .fetch_bars(symbol, Timeframe::Hourly, config.long_period)
            .await?;
        let long_sma = compute_sma(&long_bars, config.long_period)
            .map_err(|e| PipelineError::insufficient(Timeframe::Hourly, e))?;

        let action = decide_trend(short_sma, long_sma);

        debug!(
            symbol,
            current_price,
            adr,
            short_sma,
            long_sma,
            "Signal inputs computed"
        );

        let mut result = EvaluationResult::new(current_price, adr, action);
        if let Some(direction) = action.direction() {
            result = result.with_targets(compute_targets(
                current_price,
                adr,
                direction,
                config.adr_multiplier,
            ));
        }

        info!(
            symbol,
            action = %action,
            current_price,
            take_profit = ?result.take_profit,
            stop_loss = ?result.stop_loss,
            "Signal evaluated"
        );

        Ok(result)
    }

    /// Bid of the latest quote. Any failure here is reported as an unavailable quote.
    async fn current_price(&self, symbol: &str) -> Result<f64, PipelineError> {
        let unavailable = || PipelineError::QuoteUnavailable {
            symbol: symbol.to_string(),
        };

        match self.with_timeout(self.source.quote(symbol)).await {
            Ok(Ok(Some(quote))) => Ok(quote.bid),
            Ok(Ok(None)) => {
                warn!(symbol, source = self.source.name(), "No quote for symbol");
                Err(unavailable())
            }
            Ok(Err(e)) => {
                warn!(symbol, source = self.source.name(), error = %e, "Quote request failed");
                Err(unavailable())
            }
            Err(_) => {
                warn!(
                    symbol,
                    source = self.source.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Quote request timed out"
                );
                Err(unavailable())
            }
        }
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<PriceBar>, PipelineError> {
        let bars = self
            .with_timeout(self.source.bars(symbol, timeframe, count))
            .await
            .map_err(|_| PipelineError::Timeout {
                operation: format!("{} {} bars for {}", count, timeframe, symbol),
                after_ms: self.timeout.as_millis() as u64,
            })??;

        debug!(
            symbol,
            timeframe = %timeframe,
            requested = count,
            received = bars.len(),
            "Fetched bars"
        );

        Ok(bars)
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<Result<T, SourceError>, tokio::time::error::Elapsed> {
        tokio::time::timeout(self.timeout, fut).await
    }
}
