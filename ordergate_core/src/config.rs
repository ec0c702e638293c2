// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Noderr Protocol Foundation
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

//! Typed configuration surface. Layering, in increasing precedence:
//! built-in defaults, an optional file named by `ORDERGATE_CONFIG`, then
//! `ORDERGATE_*` environment variables (double-underscore separated for
//! nested keys, e.g. `ORDERGATE_RISK__MAX_DAILY_LOSS_PCT`). A `.env` file
//! in the working directory is loaded first so local development doesn't
//! need real environment variables exported.
//!
//! The raw layer only carries primitives `config` can deserialize
//! directly (numbers, strings, durations-as-seconds); [`AppConfig::load`]
//! converts that raw layer into the richer [`rust_decimal::Decimal`] and
//! [`std::time::Duration`] types the governance components actually use.

use std::time::Duration;

use config::{Config as ConfigSource, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::arbitrage::ArbitrageExecutorConfig;
use crate::capital::AllocatorConfig;
use crate::execution::SimulatedAdapterConfig;
use crate::health::HealthMonitorConfig;
use crate::regime::RuleBasedRegimeDetectorConfig;
use crate::risk::RiskGovernorConfig;
use crate::shadow::{ConfidenceGateConfig, ShadowTrackerConfig};
use crate::storage::{StorageConfig, StorageType};

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid decimal in configuration field {field}: {value}")]
    InvalidDecimal { field: &'static str, value: String },
}

/// The HTTP surface the operator API binds to (§4.14).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiServerRaw {
    pub host: String,
    pub port: u16,
}

impl Default for ApiServerRaw {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8088 }
    }
}

/// Mirrors [`StorageConfig`] but with a plain string for `storage_type`
/// so it round-trips through `config`'s environment-variable source
/// without a custom deserializer.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageRaw {
    pub storage_type: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageRaw {
    fn default() -> Self {
        Self { storage_type: "memory".to_string(), database_url: None, max_connections: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllocatorRaw {
    pub max_strategy_allocation_pct: String,
    pub arbitrage_min_floor: String,
    pub pool_min_floor_warning: String,
    pub probation_decay_rate: String,
    pub probation_decay_periods: u32,
}

impl Default for AllocatorRaw {
    fn default() -> Self {
        let d = AllocatorConfig::default();
        Self {
            max_strategy_allocation_pct: d.max_strategy_allocation_pct.to_string(),
            arbitrage_min_floor: d.arbitrage_min_floor.to_string(),
            pool_min_floor_warning: d.pool_min_floor_warning.to_string(),
            probation_decay_rate: d.probation_decay_rate.to_string(),
            probation_decay_periods: d.probation_decay_periods,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskRaw {
    pub max_daily_trades_per_account: u32,
    pub max_daily_loss_pct: String,
    pub max_position_size_pct: String,
    pub max_volatility: f64,
    pub max_leverage: String,
    pub max_exposure_per_symbol: String,
    pub max_exposure_per_venue: String,
}

impl Default for RiskRaw {
    fn default() -> Self {
        let d = RiskGovernorConfig::default();
        Self {
            max_daily_trades_per_account: d.max_daily_trades_per_account,
            max_daily_loss_pct: d.max_daily_loss_pct.to_string(),
            max_position_size_pct: d.max_position_size_pct.to_string(),
            max_volatility: d.max_volatility,
            max_leverage: d.max_leverage.to_string(),
            max_exposure_per_symbol: d.max_exposure_per_symbol.to_string(),
            max_exposure_per_venue: d.max_exposure_per_venue.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegimeRaw {
    pub favorable_trend_threshold: f64,
    pub unfavorable_trend_threshold: f64,
    pub volatility_ceiling: f64,
}

impl Default for RegimeRaw {
    fn default() -> Self {
        let d = RuleBasedRegimeDetectorConfig::default();
        Self {
            favorable_trend_threshold: d.favorable_trend_threshold,
            unfavorable_trend_threshold: d.unfavorable_trend_threshold,
            volatility_ceiling: d.volatility_ceiling,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthRaw {
    pub max_errors_per_minute: u64,
    pub market_data_freshness_secs: u64,
    pub event_log_freshness_secs: u64,
}

impl Default for HealthRaw {
    fn default() -> Self {
        let d = HealthMonitorConfig::default();
        Self {
            max_errors_per_minute: d.max_errors_per_minute,
            market_data_freshness_secs: d.market_data_freshness.as_secs(),
            event_log_freshness_secs: d.event_log_freshness.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceRaw {
    pub min_shadow_trades: u32,
    pub min_active_trading_days: u32,
    pub min_overall_confidence_score: f64,
    pub min_trades_per_regime: u32,
}

impl Default for ConfidenceRaw {
    fn default() -> Self {
        let d = ConfidenceGateConfig::default();
        Self {
            min_shadow_trades: d.min_shadow_trades,
            min_active_trading_days: d.min_active_trading_days,
            min_overall_confidence_score: d.min_overall_confidence_score,
            min_trades_per_regime: d.min_trades_per_regime,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShadowRaw {
    pub observation_window_secs: u64,
    pub sample_interval_secs: u64,
}

impl Default for ShadowRaw {
    fn default() -> Self {
        let d = ShadowTrackerConfig::default();
        Self {
            observation_window_secs: d.observation_window.as_secs(),
            sample_interval_secs: d.sample_interval.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageRaw {
    pub atomic_mode: bool,
    pub neutralization_enabled: bool,
    pub max_slippage_pct: String,
    pub max_execution_delay_ms: u64,
}

impl Default for ArbitrageRaw {
    fn default() -> Self {
        let d = ArbitrageExecutorConfig::default();
        Self {
            atomic_mode: d.atomic_mode,
            neutralization_enabled: d.neutralization_enabled,
            max_slippage_pct: d.max_slippage_pct.to_string(),
            max_execution_delay_ms: d.max_execution_delay_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatedAdapterRaw {
    pub fixed_latency_ms: u64,
    pub maker_fee_bps: String,
    pub taker_fee_bps: String,
    pub max_liquidity_fraction: String,
    pub base_bps: String,
    pub size_impact_exponent: f64,
}

impl Default for SimulatedAdapterRaw {
    fn default() -> Self {
        let d = SimulatedAdapterConfig::default();
        Self {
            fixed_latency_ms: d.fixed_latency_ms,
            maker_fee_bps: d.maker_fee_bps.to_string(),
            taker_fee_bps: d.taker_fee_bps.to_string(),
            max_liquidity_fraction: d.max_liquidity_fraction.to_string(),
            base_bps: d.base_bps.to_string(),
            size_impact_exponent: d.size_impact_exponent,
        }
    }
}

/// Everything `config` deserializes directly. Kept separate from
/// [`AppConfig`] because the sub-component types use [`Decimal`] and
/// [`Duration`], neither of which round-trips cleanly through an
/// environment-variable source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAppConfig {
    #[serde(default)]
    pub api: ApiServerRaw,
    #[serde(default)]
    pub storage: StorageRaw,
    #[serde(default)]
    pub allocator: AllocatorRaw,
    #[serde(default)]
    pub risk: RiskRaw,
    #[serde(default)]
    pub regime: RegimeRaw,
    #[serde(default)]
    pub health: HealthRaw,
    #[serde(default)]
    pub confidence: ConfidenceRaw,
    #[serde(default)]
    pub shadow: ShadowRaw,
    #[serde(default)]
    pub arbitrage: ArbitrageRaw,
    #[serde(default)]
    pub simulated_adapter: SimulatedAdapterRaw,
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, AppConfigError> {
    value
        .parse()
        .map_err(|_| AppConfigError::InvalidDecimal { field, value: value.to_string() })
}

/// Fully-typed configuration, assembled from [`RawAppConfig`]. Each field
/// is the concrete config type the matching component's constructor
/// already accepts, so wiring `AppConfig` into an [`crate::execution::ExecutionManagerDeps`]
/// is a direct field-by-field pass-through.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_host: String,
    pub api_port: u16,
    pub storage: StorageConfig,
    pub allocator: AllocatorConfig,
    pub risk: RiskGovernorConfig,
    pub regime: RuleBasedRegimeDetectorConfig,
    pub health: HealthMonitorConfig,
    pub confidence: ConfidenceGateConfig,
    pub shadow: ShadowTrackerConfig,
    pub arbitrage: ArbitrageExecutorConfig,
    pub simulated_adapter: SimulatedAdapterConfig,
}

impl AppConfig {
    /// Loads `.env` (if present), then layers defaults, an optional file
    /// named by `ORDERGATE_CONFIG`, and `ORDERGATE_*` environment
    /// variables, in that order of increasing precedence.
    pub fn load() -> Result<Self, AppConfigError> {
        let _ = dotenv::dotenv();

        let mut builder = ConfigSource::builder()
            .add_source(config::Config::try_from(&RawAppConfig::default())?);

        if let Ok(path) = std::env::var("ORDERGATE_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("ORDERGATE").separator("__").try_parsing(true),
        );

        let raw: RawAppConfig = builder.build()?.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawAppConfig) -> Result<Self, AppConfigError> {
        let storage_type = match raw.storage.storage_type.to_ascii_lowercase().as_str() {
            "postgres" => StorageType::Postgres,
            _ => StorageType::Memory,
        };

        Ok(Self {
            api_host: raw.api.host,
            api_port: raw.api.port,
            storage: StorageConfig {
                storage_type,
                database_url: raw.storage.database_url,
                max_connections: raw.storage.max_connections,
            },
            allocator: AllocatorConfig {
                max_strategy_allocation_pct: parse_decimal(
                    "allocator.max_strategy_allocation_pct",
                    &raw.allocator.max_strategy_allocation_pct,
                )?,
                arbitrage_min_floor: parse_decimal(
                    "allocator.arbitrage_min_floor",
                    &raw.allocator.arbitrage_min_floor,
                )?,
                pool_min_floor_warning: parse_decimal(
                    "allocator.pool_min_floor_warning",
                    &raw.allocator.pool_min_floor_warning,
                )?,
                probation_decay_rate: parse_decimal(
                    "allocator.probation_decay_rate",
                    &raw.allocator.probation_decay_rate,
                )?,
                probation_decay_periods: raw.allocator.probation_decay_periods,
            },
            risk: RiskGovernorConfig {
                max_daily_trades_per_account: raw.risk.max_daily_trades_per_account,
                max_daily_loss_pct: parse_decimal("risk.max_daily_loss_pct", &raw.risk.max_daily_loss_pct)?,
                max_position_size_pct: parse_decimal(
                    "risk.max_position_size_pct",
                    &raw.risk.max_position_size_pct,
                )?,
                max_volatility: raw.risk.max_volatility,
                max_leverage: parse_decimal("risk.max_leverage", &raw.risk.max_leverage)?,
                max_exposure_per_symbol: parse_decimal(
                    "risk.max_exposure_per_symbol",
                    &raw.risk.max_exposure_per_symbol,
                )?,
                max_exposure_per_venue: parse_decimal(
                    "risk.max_exposure_per_venue",
                    &raw.risk.max_exposure_per_venue,
                )?,
            },
            regime: RuleBasedRegimeDetectorConfig {
                favorable_trend_threshold: raw.regime.favorable_trend_threshold,
                unfavorable_trend_threshold: raw.regime.unfavorable_trend_threshold,
                volatility_ceiling: raw.regime.volatility_ceiling,
            },
            health: HealthMonitorConfig {
                max_errors_per_minute: raw.health.max_errors_per_minute,
                market_data_freshness: Duration::from_secs(raw.health.market_data_freshness_secs),
                event_log_freshness: Duration::from_secs(raw.health.event_log_freshness_secs),
            },
            confidence: ConfidenceGateConfig {
                min_shadow_trades: raw.confidence.min_shadow_trades,
                min_active_trading_days: raw.confidence.min_active_trading_days,
                min_overall_confidence_score: raw.confidence.min_overall_confidence_score,
                min_trades_per_regime: raw.confidence.min_trades_per_regime,
                ..ConfidenceGateConfig::default()
            },
            shadow: ShadowTrackerConfig {
                observation_window: Duration::from_secs(raw.shadow.observation_window_secs),
                sample_interval: Duration::from_secs(raw.shadow.sample_interval_secs),
            },
            arbitrage: ArbitrageExecutorConfig {
                atomic_mode: raw.arbitrage.atomic_mode,
                neutralization_enabled: raw.arbitrage.neutralization_enabled,
                max_slippage_pct: parse_decimal("arbitrage.max_slippage_pct", &raw.arbitrage.max_slippage_pct)?,
                max_execution_delay_ms: raw.arbitrage.max_execution_delay_ms,
            },
            simulated_adapter: SimulatedAdapterConfig {
                fixed_latency_ms: raw.simulated_adapter.fixed_latency_ms,
                maker_fee_bps: parse_decimal(
                    "simulated_adapter.maker_fee_bps",
                    &raw.simulated_adapter.maker_fee_bps,
                )?,
                taker_fee_bps: parse_decimal(
                    "simulated_adapter.taker_fee_bps",
                    &raw.simulated_adapter.taker_fee_bps,
                )?,
                max_liquidity_fraction: parse_decimal(
                    "simulated_adapter.max_liquidity_fraction",
                    &raw.simulated_adapter.max_liquidity_fraction,
                )?,
                base_bps: parse_decimal("simulated_adapter.base_bps", &raw.simulated_adapter.base_bps)?,
                size_impact_exponent: raw.simulated_adapter.size_impact_exponent,
                ..SimulatedAdapterConfig::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_defaults_round_trip_into_typed_config() {
        let config = AppConfig::from_raw(RawAppConfig::default()).unwrap();
        assert_eq!(config.storage.storage_type, StorageType::Memory);
        assert_eq!(config.risk.max_daily_trades_per_account, RiskGovernorConfig::default().max_daily_trades_per_account);
        assert_eq!(config.allocator.arbitrage_min_floor, AllocatorConfig::default().arbitrage_min_floor);
    }

    #[test]
    fn rejects_unparseable_decimal_fields() {
        let mut raw = RawAppConfig::default();
        raw.risk.max_daily_loss_pct = "not-a-number".to_string();
        let err = AppConfig::from_raw(raw).unwrap_err();
        assert!(matches!(err, AppConfigError::InvalidDecimal { field: "risk.max_daily_loss_pct", .. }));
    }
}
