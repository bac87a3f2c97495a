//! Average daily range.

use crate::error::InsufficientData;
use crate::types::PriceBar;

/// Arithmetic mean of `high - low` over the `period` most recent bars.
///
/// The caller is responsible for passing daily bars.
pub fn compute_adr(bars: &[PriceBar], period: usize) -> Result<f64, InsufficientData> {
    if period == 0 || bars.len() < period {
        return Err(InsufficientData {
            required: period.max(1),
            available: bars.len(),
        });
    }

    let sum: f64 = bars[bars.len() - period..].iter().map(PriceBar::range).sum();
    Ok(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64) -> PriceBar {
        PriceBar {
            time: 0,
            open: low,
            high,
            low,
            close: high,
        }
    }

    #[test]
    fn test_adr_mean_range() {
        let bars = vec![bar(2.0, 1.0), bar(3.0, 1.0), bar(4.5, 1.5)];
        assert_eq!(compute_adr(&bars, 3).unwrap(), 2.0);
    }

    #[test]
    fn test_adr_flat_bars_is_zero() {
        let bars = vec![bar(1.1, 1.1); 14];
        assert_eq!(compute_adr(&bars, 14).unwrap(), 0.0);
    }

    #[test]
    fn test_adr_uses_most_recent_bars() {
        let bars = vec![bar(10.0, 0.0), bar(2.0, 1.0), bar(2.0, 1.0)];
        assert_eq!(compute_adr(&bars, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_adr_insufficient_data() {
        let bars = vec![bar(2.0, 1.0); 5];
        let err = compute_adr(&bars, 14).unwrap_err();
        assert_eq!(err.required, 14);
        assert_eq!(err.available, 5);
    }

    #[test]
    fn test_adr_empty() {
        assert!(compute_adr(&[], 14).is_err());
    }
}
