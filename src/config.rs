use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Signal parameters, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    /// Traded symbol.
    pub symbol: String,
    /// Short moving average period (hourly bars).
    pub short_period: usize,
    /// Long moving average period (hourly bars).
    pub long_period: usize,
    /// Average daily range period (daily bars).
    pub adr_period: usize,
    /// ADR multiple used for take-profit and stop-loss distance.
    pub adr_multiplier: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            short_period: 9,
            long_period: 21,
            adr_period: 14,
            adr_multiplier: 1.25,
        }
    }
}

impl SignalConfig {
    /// Check the period and multiplier invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_period == 0 {
            return Err(ConfigError::ZeroPeriod {
                name: "SHORT_MA_PERIOD",
            });
        }
        if self.long_period == 0 {
            return Err(ConfigError::ZeroPeriod {
                name: "LONG_MA_PERIOD",
            });
        }
        if self.adr_period == 0 {
            return Err(ConfigError::ZeroPeriod { name: "ADR_PERIOD" });
        }
        if self.short_period >= self.long_period {
            return Err(ConfigError::PeriodOrder {
                short: self.short_period,
                long: self.long_period,
            });
        }
        if !self.adr_multiplier.is_finite() || self.adr_multiplier <= 0.0 {
            return Err(ConfigError::Multiplier(self.adr_multiplier));
        }
        Ok(())
    }
}

/// Which market data source backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Brokerage terminal reached through its HTTP bridge.
    Terminal,
    /// Yahoo Finance chart API.
    Yahoo,
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terminal" => Ok(SourceKind::Terminal),
            "yahoo" => Ok(SourceKind::Yahoo),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Terminal => write!(f, "terminal"),
            SourceKind::Yahoo => write!(f, "yahoo"),
        }
    }
}

/// Market data source configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Base URL of the terminal bridge.
    pub terminal_url: String,
    /// Upper bound on any single market data request (ms).
    pub timeout_ms: u64,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Terminal,
            terminal_url: "http://127.0.0.1:8228".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Emit JSON logs instead of human-readable ones.
    pub json_logs: bool,
    pub signal: SignalConfig,
    pub source: SourceConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults. An unknown
    /// `MARKET_DATA_SOURCE` is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let signal_defaults = SignalConfig::default();
        let source_defaults = SourceConfig::default();

        let kind = match env::var("MARKET_DATA_SOURCE") {
            Ok(v) => v.parse::<SourceKind>()?,
            Err(_) => source_defaults.kind,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            signal: SignalConfig {
                symbol: env::var("SYMBOL")
                    .map(|s| s.trim().to_uppercase())
                    .unwrap_or(signal_defaults.symbol),
                short_period: env::var("SHORT_MA_PERIOD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(signal_defaults.short_period),
                long_period: env::var("LONG_MA_PERIOD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(signal_defaults.long_period),
                adr_period: env::var("ADR_PERIOD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(signal_defaults.adr_period),
                adr_multiplier: env::var("ADR_MULTIPLIER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(signal_defaults.adr_multiplier),
            },
            source: SourceConfig {
                kind,
                terminal_url: env::var("TERMINAL_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(source_defaults.terminal_url),
                timeout_ms: env::var("SOURCE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(source_defaults.timeout_ms),
            },
        })
    }

    /// Check the signal invariants and that source requests can complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signal.validate()?;
        if self.source.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            json_logs: false,
            signal: SignalConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // SignalConfig Tests
    // =========================================================================

    #[test]
    fn test_signal_config_defaults() {
        let config = SignalConfig::default();
        assert_eq!(config.symbol, "EURUSD");
        assert_eq!(config.short_period, 9);
        assert_eq!(config.long_period, 21);
        assert_eq!(config.adr_period, 14);
        assert_eq!(config.adr_multiplier, 1.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_signal_config_rejects_inverted_periods() {
        let config = SignalConfig {
            short_period: 21,
            long_period: 9,
            ..SignalConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PeriodOrder { short: 21, long: 9 })
        );
    }

    #[test]
    fn test_signal_config_rejects_equal_periods() {
        let config = SignalConfig {
            short_period: 14,
            long_period: 14,
            ..SignalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PeriodOrder { .. })
        ));
    }

    #[test]
    fn test_signal_config_rejects_zero_periods() {
        let config = SignalConfig {
            adr_period: 0,
            ..SignalConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { name: "ADR_PERIOD" })
        );

        let config = SignalConfig {
            short_period: 0,
            ..SignalConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { .. })
        ));
    }

    #[test]
    fn test_signal_config_rejects_bad_multiplier() {
        for multiplier in [0.0, -1.25, f64::NAN, f64::INFINITY] {
            let config = SignalConfig {
                adr_multiplier: multiplier,
                ..SignalConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Multiplier(_))
            ));
        }
    }

    // =========================================================================
    // SourceKind Tests
    // =========================================================================

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("terminal".parse::<SourceKind>(), Ok(SourceKind::Terminal));
        assert_eq!(" Yahoo ".parse::<SourceKind>(), Ok(SourceKind::Yahoo));
        assert_eq!(
            "bloomberg".parse::<SourceKind>(),
            Err(ConfigError::UnknownSource("bloomberg".to_string()))
        );
    }

    #[test]
    fn test_source_kind_display() {
        assert_eq!(format!("{}", SourceKind::Terminal), "terminal");
        assert_eq!(format!("{}", SourceKind::Yahoo), "yahoo");
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.source.kind, SourceKind::Terminal);
        assert_eq!(config.source.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_source_timeout() {
        let mut config = Config::default();
        config.source.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        config.source.timeout_ms = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_signal_errors_take_precedence() {
        let mut config = Config::default();
        config.signal.long_period = 5;
        config.source.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PeriodOrder { short: 9, long: 5 })
        ));
    }
}
