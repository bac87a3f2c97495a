use serde::Serialize;
use std::fmt;

/// Outcome of the moving average comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDecision {
    Buy,
    Sell,
    Hold,
}

impl TradeDecision {
    /// Tradable direction, `None` for hold.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TradeDecision::Buy => Some(Direction::Buy),
            TradeDecision::Sell => Some(Direction::Sell),
            TradeDecision::Hold => None,
        }
    }
}

impl fmt::Display for TradeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDecision::Buy => write!(f, "buy"),
            TradeDecision::Sell => write!(f, "sell"),
            TradeDecision::Hold => write!(f, "hold"),
        }
    }
}

/// Side of a hypothetical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

/// Take-profit and stop-loss levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Result of one signal evaluation, as returned by `/trade`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub current_price: f64,
    pub adr: f64,
    pub action: TradeDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
}

impl EvaluationResult {
    pub fn new(current_price: f64, adr: f64, action: TradeDecision) -> Self {
        Self {
            current_price,
            adr,
            action,
            take_profit: None,
            stop_loss: None,
        }
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.take_profit = Some(targets.take_profit);
        self.stop_loss = Some(targets.stop_loss);
        self
    }
}
