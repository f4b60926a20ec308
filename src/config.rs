//! Backtest configuration: everything the driver and exchange need to run
//! a simulation, loaded from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::exchange::ExchangeConfig;

/// Top-level configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub symbol: String,
    pub candles_path: String,
    pub initial_balance: f64,
    pub quantity_step: f64,
    pub price_step: f64,
    pub leverage: f64,
    pub maker_fee: f64,
    pub taker_fee: f64,
    pub latency_ms: i64,
    pub strategy: StrategyConfig,
}

/// Which example strategy to run and its parameters. A real deployment
/// would grow this into an enum of strategy variants; the grid strategy
/// shipped here is the one worked example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub call_interval_secs: f64,
    pub grid_spacing_pct: f64,
    pub grid_levels: u32,
    pub order_qty: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "grid".to_string(),
            call_interval_secs: 3600.0,
            grid_spacing_pct: 0.01,
            grid_levels: 3,
            order_qty: 0.01,
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            candles_path: "data/BTCUSDT_1h.csv".to_string(),
            initial_balance: 10_000.0,
            quantity_step: 0.001,
            price_step: 0.01,
            leverage: 10.0,
            maker_fee: 0.0002,
            taker_fee: 0.0005,
            latency_ms: 500,
            strategy: StrategyConfig::default(),
        }
    }
}

impl BacktestConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: BacktestConfig = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leverage < 1.0 {
            return Err(ConfigError::Invalid("leverage must be >= 1".to_string()));
        }
        if self.quantity_step <= 0.0 {
            return Err(ConfigError::Invalid("quantity_step must be positive".to_string()));
        }
        if self.price_step <= 0.0 {
            return Err(ConfigError::Invalid("price_step must be positive".to_string()));
        }
        if self.initial_balance <= 0.0 {
            return Err(ConfigError::Invalid("initial_balance must be positive".to_string()));
        }
        if !self.maker_fee.is_finite() || !self.taker_fee.is_finite() {
            return Err(ConfigError::Invalid("fees must be finite".to_string()));
        }
        Ok(())
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            quantity_step: self.quantity_step,
            price_step: self.price_step,
            leverage: self.leverage,
            maker_fee: self.maker_fee,
            taker_fee: self.taker_fee,
            latency_ms: self.latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(BacktestConfig::default().validate().is_ok());
    }

    #[test]
    fn sub_unity_leverage_is_rejected() {
        let mut config = BacktestConfig::default();
        config.leverage = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unity_leverage_is_accepted() {
        let mut config = BacktestConfig::default();
        config.leverage = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_quantity_step_is_rejected() {
        let mut config = BacktestConfig::default();
        config.quantity_step = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_price_step_is_rejected() {
        let mut config = BacktestConfig::default();
        config.price_step = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_fees_are_accepted_non_finite_fees_are_not() {
        let mut config = BacktestConfig::default();
        config.maker_fee = -0.0001;
        assert!(config.validate().is_ok());
        config.taker_fee = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = BacktestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BacktestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.symbol, config.symbol);
        assert_eq!(parsed.leverage, config.leverage);
    }
}
