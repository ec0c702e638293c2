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

//! Confidence Gate (§4.13). Hard precondition on live execution: blocks
//! unless every accumulated-evidence threshold is met. `enforce()` is a
//! hard block — it raises rather than returning a soft verdict, because
//! the Execution Manager must never reach the real adapter while any
//! threshold is unmet (§8 testable property).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashSet;
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;
use crate::regime::Regime;
use crate::runtime_tracker::RuntimeTracker;
use crate::shadow::tracker::ShadowTracker;
use crate::strategy::StrategyId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceGateConfig {
    pub min_shadow_trades: u32,
    pub min_active_trading_days: u32,
    pub min_overall_confidence_score: f64,
    pub min_trades_per_regime: u32,
    /// Every regime that must be covered for the gate to consider
    /// coverage complete. Defaults to the three contractual regimes.
    pub regimes_to_cover: Vec<Regime>,
}

impl Default for ConfidenceGateConfig {
    fn default() -> Self {
        Self {
            min_shadow_trades: 500,
            min_active_trading_days: 100,
            min_overall_confidence_score: 90.0,
            min_trades_per_regime: 50,
            regimes_to_cover: vec![Regime::Favorable, Regime::Unfavorable, Regime::Unknown],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceMetrics {
    pub shadow_trade_count: u32,
    pub active_trading_days: u32,
    pub overall_confidence_score: f64,
    pub regime_coverage: HashMap<String, u32>,
    pub unsafe_combinations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceGateResult {
    pub allowed: bool,
    pub reasons: Vec<String>,
    pub metrics: ConfidenceMetrics,
}

/// Hard precondition on live execution (§3 Confidence gate). Unsafe
/// (strategy x regime) combinations are marked externally by operator
/// tooling or automated parity analysis; this gate only consults the set.
pub struct ConfidenceGate {
    config: ConfidenceGateConfig,
    shadow_tracker: Arc<ShadowTracker>,
    runtime_tracker: Arc<RuntimeTracker>,
    unsafe_combinations: DashSet<(StrategyId, Regime)>,
}

impl ConfidenceGate {
    pub fn new(config: ConfidenceGateConfig, shadow_tracker: Arc<ShadowTracker>, runtime_tracker: Arc<RuntimeTracker>) -> Self {
        Self {
            config,
            shadow_tracker,
            runtime_tracker,
            unsafe_combinations: DashSet::new(),
        }
    }

    pub fn mark_unsafe(&self, strategy_id: impl Into<StrategyId>, regime: Regime) {
        self.unsafe_combinations.insert((strategy_id.into(), regime));
    }

    pub fn clear_unsafe(&self, strategy_id: &StrategyId, regime: Regime) {
        self.unsafe_combinations.remove(&(strategy_id.clone(), regime));
    }

    fn confidence_score(&self) -> f64 {
        let parity = self.shadow_tracker.average_parity();
        let slippage_penalty = parity.slippage_delta.abs().to_string().parse::<f64>().unwrap_or(0.0) * 100.0;
        let fill_rate_penalty = parity.fill_rate_delta.to_string().parse::<f64>().unwrap_or(0.0) * 100.0;
        (100.0 - slippage_penalty - fill_rate_penalty).clamp(0.0, 100.0)
    }

    /// Evaluates every threshold and returns a structured verdict. Never
    /// raises — use [`ConfidenceGate::enforce`] for the hard-block form
    /// the Execution Manager consults before the real adapter.
    pub fn check(&self) -> ConfidenceGateResult {
        let mut reasons = Vec::new();

        let shadow_trade_count = self.shadow_tracker.trade_count() as u32;
        if shadow_trade_count < self.config.min_shadow_trades {
            reasons.push(format!(
                "shadow trade count {} below minimum {}",
                shadow_trade_count, self.config.min_shadow_trades
            ));
        }

        let active_trading_days = self.runtime_tracker.active_trading_days() as u32;
        if active_trading_days < self.config.min_active_trading_days {
            reasons.push(format!(
                "active trading days {} below minimum {}",
                active_trading_days, self.config.min_active_trading_days
            ));
        }

        let overall_confidence_score = self.confidence_score();
        if overall_confidence_score < self.config.min_overall_confidence_score {
            reasons.push(format!(
                "overall confidence score {:.1} below minimum {:.1}",
                overall_confidence_score, self.config.min_overall_confidence_score
            ));
        }

        let regime_counts = self.shadow_tracker.regime_counts();
        let mut covered: HashSet<Regime> = HashSet::new();
        for regime in &self.config.regimes_to_cover {
            let count = regime_counts.get(regime).copied().unwrap_or(0);
            if count >= self.config.min_trades_per_regime {
                covered.insert(*regime);
            } else {
                reasons.push(format!(
                    "regime {regime} covered by {count} trades, below minimum {}",
                    self.config.min_trades_per_regime
                ));
            }
        }

        let unsafe_combinations: Vec<String> = self
            .unsafe_combinations
            .iter()
            .map(|entry| {
                let (strategy_id, regime) = entry.key();
                format!("{strategy_id}/{regime}")
            })
            .collect();
        if !unsafe_combinations.is_empty() {
            reasons.push(format!(
                "{} unsafe strategy/regime combination(s) remain: {}",
                unsafe_combinations.len(),
                unsafe_combinations.join(", ")
            ));
        }

        let metrics = ConfidenceMetrics {
            shadow_trade_count,
            active_trading_days,
            overall_confidence_score,
            regime_coverage: regime_counts.into_iter().map(|(r, c)| (r.to_string(), c)).collect(),
            unsafe_combinations,
        };

        ConfidenceGateResult {
            allowed: reasons.is_empty(),
            reasons,
            metrics,
        }
    }

    /// Hard block used by the Execution Manager before real-path adapter
    /// invocation (§4.13). Never raised for shadow or simulation paths.
    pub fn enforce(&self) -> Result<(), GovernanceError> {
        let result = self.check();
        if result.allowed {
            Ok(())
        } else {
            Err(GovernanceError::ConfidenceGate(result.reasons.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::StaticMarketDataSource;
    use crate::shadow::ShadowTrackerConfig;

    fn gate() -> ConfidenceGate {
        let market = Arc::new(StaticMarketDataSource::new());
        let shadow = Arc::new(ShadowTracker::new(ShadowTrackerConfig::default(), market, None));
        let runtime = Arc::new(RuntimeTracker::new());
        ConfidenceGate::new(ConfidenceGateConfig::default(), shadow, runtime)
    }

    #[test]
    fn blocks_when_no_evidence_accumulated() {
        let g = gate();
        let result = g.check();
        assert!(!result.allowed);
        assert!(!result.reasons.is_empty());
        assert!(g.enforce().is_err());
    }

    #[test]
    fn unsafe_combination_blocks_even_if_thresholds_met() {
        let g = gate();
        g.mark_unsafe("s1", Regime::Favorable);
        let result = g.check();
        assert!(!result.allowed);
        assert!(result.reasons.iter().any(|r| r.contains("unsafe")));
        g.clear_unsafe(&"s1".to_string(), Regime::Favorable);
    }
}
