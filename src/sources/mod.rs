//! Market data sources feeding the signal pipeline.

pub mod memory;
pub mod terminal;
pub mod yahoo;

pub use memory::StaticMarketData;
pub use terminal::TerminalBridgeClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{PriceBar, Quote, Timeframe};

/// Supplier of quotes and historical bars.
///
/// Implementations must be safe for concurrent read-only use; requests may be
/// served in parallel by the HTTP layer.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &str;

    /// Latest quote, or `None` when the symbol is unknown to the source.
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, SourceError>;

    /// Up to `count` most recent bars, ordered oldest to newest.
    async fn bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<PriceBar>, SourceError>;
}

/// Keep the last `count` bars of an oldest-first series.
pub(crate) fn take_last(mut bars: Vec<PriceBar>, count: usize) -> Vec<PriceBar> {
    if bars.len() > count {
        bars.drain(..bars.len() - count);
    }
    bars
}
