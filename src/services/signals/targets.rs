//! Take-profit and stop-loss levels from ADR.

use crate::types::{Direction, Targets};

/// Place take-profit and stop-loss `adr * multiplier` away from the entry.
pub fn compute_targets(entry_price: f64, adr: f64, direction: Direction, multiplier: f64) -> Targets {
    let distance = adr * multiplier;
    match direction {
        Direction::Buy => Targets {
            take_profit: entry_price + distance,
            stop_loss: entry_price - distance,
        },
        Direction::Sell => Targets {
            take_profit: entry_price - distance,
            stop_loss: entry_price + distance,
        },
    }
}
