//! Simple moving average over closing prices and the trend decision.

use crate::error::InsufficientData;
use crate::types::{PriceBar, TradeDecision};

/// Arithmetic mean of `close` over the `period` most recent bars.
///
/// Bars are ordered oldest to newest. Fails when `period` is zero or fewer
/// than `period` bars are available.
pub fn compute_sma(bars: &[PriceBar], period: usize) -> Result<f64, InsufficientData> {
    if period == 0 || bars.len() < period {
        return Err(InsufficientData {
            required: period.max(1),
            available: bars.len(),
        });
    }

    let sum: f64 = bars[bars.len() - period..].iter().map(|b| b.close).sum();
    Ok(sum / period as f64)
}

/// Compare the two averages.
///
/// Hold is only returned on exact equality. Two independently computed means
/// rarely compare equal, so in practice Hold is uncommon outside of flat data.
pub fn decide_trend(short_sma: f64, long_sma: f64) -> TradeDecision {
    if short_sma > long_sma {
        TradeDecision::Buy
    } else if short_sma < long_sma {
        TradeDecision::Sell
    } else {
        TradeDecision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_with_closes(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                time: i as i64 * 3_600_000,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
            })
            .collect()
    }

    #[test]
    fn test_sma_of_exact_window() {
        let bars = bars_with_closes(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(compute_sma(&bars, 4).unwrap(), 2.5);
    }

    #[test]
    fn test_sma_uses_most_recent_bars() {
        let bars = bars_with_closes(&[100.0, 1.0, 2.0, 3.0]);
        assert_eq!(compute_sma(&bars, 3).unwrap(), 2.0);
    }

    #[test]
    fn test_sma_single_bar() {
        let bars = bars_with_closes(&[1.1055]);
        assert_eq!(compute_sma(&bars, 1).unwrap(), 1.1055);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let bars = bars_with_closes(&[1.0, 2.0]);
        assert_eq!(
            compute_sma(&bars, 9),
            Err(InsufficientData {
                required: 9,
                available: 2
            })
        );
    }

    #[test]
    fn test_sma_empty_bars() {
        assert!(compute_sma(&[], 9).is_err());
    }

    #[test]
    fn test_sma_zero_period() {
        let bars = bars_with_closes(&[1.0, 2.0]);
        assert!(compute_sma(&bars, 0).is_err());
    }

    #[test]
    fn test_decide_trend() {
        assert_eq!(decide_trend(1.1050, 1.1020), TradeDecision::Buy);
        assert_eq!(decide_trend(1.1020, 1.1050), TradeDecision::Sell);
        assert_eq!(decide_trend(1.25, 1.25), TradeDecision::Hold);
    }

    #[test]
    fn test_decide_trend_exact_equality_only() {
        assert_eq!(decide_trend(1.25 + f64::EPSILON, 1.25), TradeDecision::Buy);
        assert_eq!(decide_trend(1.25, 1.25 + f64::EPSILON), TradeDecision::Sell);
    }
}
