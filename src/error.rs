use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::Timeframe;

/// Message returned to HTTP callers when the current price cannot be fetched.
pub const QUOTE_UNAVAILABLE_MESSAGE: &str = "Error fetching price data";

/// Errors raised by market data sources.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{source_name} returned status {status}")]
    Status { source_name: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Market data source not connected")]
    NotConnected,
}

/// Fewer bars were available than a calculation needs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("need {required} bars, got {available}")]
pub struct InsufficientData {
    pub required: usize,
    pub available: usize,
}

/// Errors that abort a signal evaluation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Quote unavailable for {symbol}")]
    QuoteUnavailable { symbol: String },

    #[error("Insufficient {timeframe} price history: need {required} bars, got {available}")]
    InsufficientData {
        timeframe: Timeframe,
        required: usize,
        available: usize,
    },

    #[error("Market data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Market data request timed out after {after_ms}ms: {operation}")]
    Timeout { operation: String, after_ms: u64 },
}

impl PipelineError {
    pub fn insufficient(timeframe: Timeframe, err: InsufficientData) -> Self {
        PipelineError::InsufficientData {
            timeframe,
            required: err.required,
            available: err.available,
        }
    }
}

/// Invalid startup configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be at least 1")]
    ZeroPeriod { name: &'static str },

    #[error("short period ({short}) must be less than long period ({long})")]
    PeriodOrder { short: usize, long: usize },

    #[error("ADR multiplier must be a positive finite number, got {0}")]
    Multiplier(f64),

    #[error("Unknown market data source: {0}")]
    UnknownSource(String),

    #[error("SOURCE_TIMEOUT_MS must be at least 1")]
    ZeroTimeout,
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Pipeline(PipelineError::QuoteUnavailable { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                QUOTE_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::Pipeline(e @ PipelineError::InsufficientData { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Pipeline(e @ PipelineError::Source(_)) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::Pipeline(e @ PipelineError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, e.to_string())
            }
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_quote_unavailable_maps_to_500() {
        let err = AppError::from(PipelineError::QuoteUnavailable {
            symbol: "EURUSD".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let err = AppError::from(PipelineError::Timeout {
            operation: "daily bars".to_string(),
            after_ms: 5000,
        });
        assert_eq!(status_of(err), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_source_error_maps_to_502() {
        let err = AppError::from(PipelineError::Source(SourceError::NotConnected));
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = PipelineError::insufficient(
            Timeframe::Daily,
            InsufficientData {
                required: 14,
                available: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "Insufficient daily price history: need 14 bars, got 3"
        );
        assert_eq!(status_of(err.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::PeriodOrder { short: 21, long: 9 }.to_string(),
            "short period (21) must be less than long period (9)"
        );
        assert_eq!(
            ConfigError::ZeroPeriod { name: "ADR_PERIOD" }.to_string(),
            "ADR_PERIOD must be at least 1"
        );
        assert_eq!(
            ConfigError::ZeroTimeout.to_string(),
            "SOURCE_TIMEOUT_MS must be at least 1"
        );
    }
}
