//! Moving average signal with ADR-based targets.

pub mod moving_average;
pub mod pipeline;
pub mod targets;
pub mod volatility;

pub use moving_average::{compute_sma, decide_trend};
pub use pipeline::SignalPipeline;
pub use targets::compute_targets;
pub use volatility::compute_adr;
