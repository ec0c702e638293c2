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

//! Rule-based regime detector over trailing trend-strength and
//! realized-volatility bands, in the shape of the teacher's
//! `MarketRegimeDetector` (trend/volatility threshold classifier). Market
//! data ingestion is out of scope, so observations are pushed in by a
//! collaborator rather than pulled from a feed.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::market::Symbol;
use crate::regime::detector::{Regime, RegimeDetector, RegimeVerdict};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuleBasedRegimeDetectorConfig {
    /// Trend strength (-1.0..=1.0) above which the market is favorable.
    pub favorable_trend_threshold: f64,
    /// Trend strength below which the market is unfavorable.
    pub unfavorable_trend_threshold: f64,
    /// Realized volatility (0.0..=1.0) above which a regime is downgraded
    /// to Unfavorable regardless of trend.
    pub volatility_ceiling: f64,
}

impl Default for RuleBasedRegimeDetectorConfig {
    fn default() -> Self {
        Self {
            favorable_trend_threshold: 0.15,
            unfavorable_trend_threshold: -0.15,
            volatility_ceiling: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    trend_strength: f64,
    volatility: f64,
}

/// Rule-based `RegimeDetector`. Observations come from
/// [`RuleBasedRegimeDetector::push_observation`]; symbols with no
/// observation yield `Unknown` with zero confidence.
#[derive(Debug, Default)]
pub struct RuleBasedRegimeDetector {
    config: RuleBasedRegimeDetectorConfig,
    observations: DashMap<Symbol, Observation>,
}

impl RuleBasedRegimeDetector {
    pub fn new(config: RuleBasedRegimeDetectorConfig) -> Self {
        Self {
            config,
            observations: DashMap::new(),
        }
    }

    pub fn push_observation(&self, symbol: impl Into<Symbol>, trend_strength: f64, volatility: f64) {
        self.observations.insert(
            symbol.into(),
            Observation {
                trend_strength: trend_strength.clamp(-1.0, 1.0),
                volatility: volatility.clamp(0.0, 1.0),
            },
        );
    }

    fn classify(&self, symbol: &Symbol, obs: Observation) -> RegimeVerdict {
        if obs.volatility >= self.config.volatility_ceiling {
            // High dispersion erodes confidence even when the regime
            // call itself is clear.
            let confidence = (1.0 - obs.volatility).clamp(0.0, 1.0);
            return RegimeVerdict::new(Regime::Unfavorable, confidence.max(0.5), symbol.clone());
        }

        if obs.trend_strength >= self.config.favorable_trend_threshold {
            let confidence = (obs.trend_strength / 1.0).min(1.0) * (1.0 - obs.volatility * 0.5);
            RegimeVerdict::new(Regime::Favorable, confidence, symbol.clone())
        } else if obs.trend_strength <= self.config.unfavorable_trend_threshold {
            let confidence = (-obs.trend_strength).min(1.0) * (1.0 - obs.volatility * 0.5);
            RegimeVerdict::new(Regime::Unfavorable, confidence, symbol.clone())
        } else {
            RegimeVerdict::new(Regime::Unknown, 1.0 - obs.trend_strength.abs(), symbol.clone())
        }
    }
}

#[async_trait]
impl RegimeDetector for RuleBasedRegimeDetector {
    async fn current_regime(&self, symbol: &Symbol) -> RegimeVerdict {
        match self.observations.get(symbol) {
            Some(obs) => self.classify(symbol, *obs),
            None => RegimeVerdict::unknown(symbol.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_symbol_is_unknown() {
        let d = RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default());
        let v = d.current_regime(&"BTC/USD".to_string()).await;
        assert_eq!(v.regime, Regime::Unknown);
    }

    #[tokio::test]
    async fn strong_trend_low_vol_is_favorable_high_confidence() {
        let d = RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default());
        d.push_observation("BTC/USD", 0.9, 0.1);
        let v = d.current_regime(&"BTC/USD".to_string()).await;
        assert_eq!(v.regime, Regime::Favorable);
        assert!(v.confidence > 0.8);
    }

    #[tokio::test]
    async fn high_volatility_forces_unfavorable() {
        let d = RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default());
        d.push_observation("BTC/USD", 0.9, 0.95);
        let v = d.current_regime(&"BTC/USD".to_string()).await;
        assert_eq!(v.regime, Regime::Unfavorable);
    }
}
