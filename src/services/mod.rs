//! Core services.

pub mod signals;

pub use signals::SignalPipeline;
