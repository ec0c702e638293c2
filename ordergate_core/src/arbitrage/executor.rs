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

//! Arbitrage Executor (§4.11). Consumes a multi-leg arbitrage signal and
//! drives each leg through the full gate chain via the Execution
//! Manager — there is no separate, lighter-weight path for arbitrage
//! legs. Neutralization is a best-effort single pass: it is never
//! retried automatically, and failure escalates straight to a CRITICAL
//! alert rather than a silent log line.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::execution::{ExecutionManager, ExecutionMode};
use crate::health::alert::{AlertManager, AlertTrigger};
use crate::market::{Side, Symbol};
use crate::strategy::{StrategyId, TradeIntent, TradeOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageLeg {
    pub priority: u32,
    pub symbol: Symbol,
    pub side: Side,
    pub base_quantity: Decimal,
    pub estimated_value_quote: Decimal,
    pub limit_price: Option<Decimal>,
}

impl ArbitrageLeg {
    fn to_intent(&self, strategy_id: &StrategyId) -> TradeIntent {
        let mut intent = TradeIntent::new(
            strategy_id.clone(),
            self.symbol.clone(),
            self.side,
            self.base_quantity,
            self.estimated_value_quote,
        );
        if let Some(price) = self.limit_price {
            intent = intent.with_limit_price(price);
        }
        intent
    }

    fn opposite(&self) -> ArbitrageLeg {
        ArbitrageLeg {
            priority: self.priority,
            symbol: self.symbol.clone(),
            side: match self.side {
                Side::Buy => Side::Sell,
                Side::Sell => Side::Buy,
            },
            base_quantity: self.base_quantity,
            estimated_value_quote: self.estimated_value_quote,
            limit_price: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageSignal {
    pub strategy_id: StrategyId,
    pub arbitrage_type: String,
    pub expected_edge_bps: Decimal,
    pub legs: Vec<ArbitrageLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegOutcome {
    pub priority: u32,
    pub symbol: Symbol,
    pub outcome: TradeOutcome,
    pub slippage_pct: Decimal,
    pub latency: Duration,
    pub exceeded_thresholds: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageResult {
    pub aborted: bool,
    pub requires_neutralization: bool,
    pub leg_outcomes: Vec<LegOutcome>,
    pub neutralization_outcomes: Vec<LegOutcome>,
    pub neutralization_failed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArbitrageExecutorConfig {
    pub atomic_mode: bool,
    pub neutralization_enabled: bool,
    pub max_slippage_pct: Decimal,
    pub max_execution_delay_ms: u64,
}

impl Default for ArbitrageExecutorConfig {
    fn default() -> Self {
        Self {
            atomic_mode: true,
            neutralization_enabled: true,
            max_slippage_pct: Decimal::new(50, 2), // 0.50%
            max_execution_delay_ms: 2000,
        }
    }
}

pub struct ArbitrageExecutor {
    config: ArbitrageExecutorConfig,
    execution_manager: Arc<ExecutionManager>,
    alert_manager: Arc<AlertManager>,
}

impl ArbitrageExecutor {
    pub fn new(config: ArbitrageExecutorConfig, execution_manager: Arc<ExecutionManager>, alert_manager: Arc<AlertManager>) -> Self {
        Self {
            config,
            execution_manager,
            alert_manager,
        }
    }

    fn slippage_pct(&self, leg: &ArbitrageLeg, outcome: &TradeOutcome) -> Decimal {
        if !outcome.success {
            return Decimal::ZERO;
        }
        let Some(executed_price) = outcome.executed_price else {
            return Decimal::ZERO;
        };
        if leg.estimated_value_quote <= Decimal::ZERO || leg.base_quantity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let expected_price = leg.estimated_value_quote / leg.base_quantity;
        if expected_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((executed_price - expected_price) / expected_price * Decimal::ONE_HUNDRED).abs()
    }

    async fn run_leg(&self, strategy_id: &StrategyId, leg: &ArbitrageLeg, mode: ExecutionMode) -> LegOutcome {
        let intent = leg.to_intent(strategy_id);
        let started = Instant::now();
        let outcome = self.execution_manager.process_intent(&intent, mode).await;
        let latency = started.elapsed();

        let slippage_pct = self.slippage_pct(leg, &outcome);
        let exceeded_thresholds = slippage_pct > self.config.max_slippage_pct
            || latency.as_millis() as u64 > self.config.max_execution_delay_ms;

        LegOutcome {
            priority: leg.priority,
            symbol: leg.symbol.clone(),
            outcome,
            slippage_pct,
            latency,
            exceeded_thresholds,
        }
    }

    /// Runs every leg of `signal` in ascending priority order through the
    /// full gate chain, then neutralizes successful legs if the signal
    /// broke partway through (§4.11).
    pub async fn execute(&self, signal: &ArbitrageSignal, mode: ExecutionMode) -> ArbitrageResult {
        let mut legs = signal.legs.clone();
        legs.sort_by_key(|l| l.priority);

        let mut leg_outcomes = Vec::with_capacity(legs.len());
        let mut requires_neutralization = false;
        let mut aborted = false;
        let mut any_succeeded = false;

        for (idx, leg) in legs.iter().enumerate() {
            let result = self.run_leg(&signal.strategy_id, leg, mode).await;
            let succeeded = result.outcome.success;
            let exceeded = result.exceeded_thresholds;
            leg_outcomes.push(result);

            if !succeeded {
                if idx == 0 && self.config.atomic_mode {
                    aborted = true;
                    break;
                }
                if any_succeeded {
                    requires_neutralization = true;
                    break;
                }
                continue;
            }

            any_succeeded = true;
            if exceeded {
                requires_neutralization = true;
            }
        }

        let mut neutralization_outcomes = Vec::new();
        let mut neutralization_failed = false;

        if requires_neutralization && self.config.neutralization_enabled && !aborted {
            let successful_legs: Vec<&ArbitrageLeg> = leg_outcomes
                .iter()
                .filter(|r| r.outcome.success)
                .filter_map(|r| legs.iter().find(|l| l.priority == r.priority))
                .collect();

            for leg in successful_legs {
                let opposite = leg.opposite();
                let result = self.run_leg(&signal.strategy_id, &opposite, mode).await;
                if !result.outcome.success {
                    neutralization_failed = true;
                }
                neutralization_outcomes.push(result);
            }

            if neutralization_failed {
                self.alert_manager.raise(AlertTrigger::ArbitrageNeutralizationFailure {
                    strategy_id: signal.strategy_id.clone(),
                    detail: format!("{} of {} neutralization legs failed", neutralization_outcomes.iter().filter(|r| !r.outcome.success).count(), neutralization_outcomes.len()),
                });
            }
        }

        ArbitrageResult {
            aborted,
            requires_neutralization,
            leg_outcomes,
            neutralization_outcomes,
            neutralization_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capital::{AccountManager, AllocatorConfig, CapitalAllocator, CapitalGate, CapitalPool, PoolKind};
    use crate::eventlog::log::InMemoryEventLog;
    use crate::execution::simulated::SimulatedExecutionAdapter;
    use crate::execution::venue_adapter::NullVenueAdapter;
    use crate::execution::ExecutionManagerDeps;
    use crate::market::{StaticMarketDataSource, Ticker};
    use crate::mode::controller::ModeController;
    use crate::mode::gate::PermissionGate;
    use crate::regime::gate::RegimeGate;
    use crate::regime::rule_based::{RuleBasedRegimeDetector, RuleBasedRegimeDetectorConfig};
    use crate::risk::{RiskGovernor, RiskGovernorConfig};
    use crate::runtime_tracker::RuntimeTracker;
    use crate::shadow::{ConfidenceGate, ConfidenceGateConfig, ShadowTracker, ShadowTrackerConfig};
    use crate::strategy::{InMemoryStrategyRegistry, RiskProfile, StrategyMetadata, StrategyType};
    use rust_decimal_macros::dec;

    fn executor() -> ArbitrageExecutor {
        let registry = Arc::new(InMemoryStrategyRegistry::new());
        registry.register(StrategyMetadata {
            strategy_id: "arb1".to_string(),
            strategy_type: StrategyType::Arbitrage,
            risk_profile: RiskProfile::Conservative,
            regime_dependent: false,
        });

        let accounts = Arc::new(AccountManager::new());
        let pool = Arc::new(CapitalPool::new(PoolKind::Arbitrage, dec!(10000), dec!(20)));
        let directional_pool = Arc::new(CapitalPool::new(PoolKind::Directional, dec!(10000), dec!(20)));
        let allocator = CapitalAllocator::new(AllocatorConfig::default(), registry.clone(), accounts.clone());
        allocator.allocate(&"arb1".to_string(), &pool, dec!(10000), 0, None);

        let capital_gate = Arc::new(CapitalGate::new(accounts.clone()));
        let detector = Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
        let regime_gate = Arc::new(RegimeGate::new(detector.clone(), 0.6));
        let permission_gate = Arc::new(PermissionGate::new(Arc::new(ModeController::new())));
        let risk_governor = Arc::new(RiskGovernor::new(RiskGovernorConfig::default()));

        let market: Arc<dyn crate::market::MarketDataSource> = Arc::new(
            StaticMarketDataSource::new()
                .with_ticker(
                    "BTC-SPOT",
                    Ticker { bid: dec!(100), ask: dec!(100.1), last: dec!(100.05), timestamp: chrono::Utc::now() },
                )
                .with_ticker(
                    "BTC-PERP",
                    Ticker { bid: dec!(100.2), ask: dec!(100.3), last: dec!(100.25), timestamp: chrono::Utc::now() },
                ),
        );
        let simulated_adapter = Arc::new(SimulatedExecutionAdapter::new(Default::default(), market.clone()));
        let shadow_tracker = Arc::new(ShadowTracker::new(ShadowTrackerConfig::default(), market, None));
        let runtime_tracker = Arc::new(RuntimeTracker::new());
        let confidence_gate = Arc::new(ConfidenceGate::new(ConfidenceGateConfig::default(), shadow_tracker.clone(), runtime_tracker.clone()));

        let deps = ExecutionManagerDeps {
            registry,
            accounts,
            capital_gate,
            directional_pool,
            arbitrage_pool: pool,
            regime_gate,
            regime_detector: detector,
            permission_gate,
            risk_governor,
            confidence_gate,
            event_log: Arc::new(InMemoryEventLog::new()),
            venue_adapter: Arc::new(NullVenueAdapter),
            simulated_adapter,
            shadow_tracker,
            runtime_tracker,
            alert_manager: Arc::new(AlertManager::new()),
        };
        let alert_manager = Arc::new(AlertManager::new());
        let manager = Arc::new(ExecutionManager::new(deps));
        ArbitrageExecutor::new(ArbitrageExecutorConfig::default(), manager, alert_manager)
    }

    fn signal() -> ArbitrageSignal {
        ArbitrageSignal {
            strategy_id: "arb1".to_string(),
            arbitrage_type: "spot-perp".to_string(),
            expected_edge_bps: dec!(15),
            legs: vec![
                ArbitrageLeg {
                    priority: 1,
                    symbol: "BTC-SPOT".to_string(),
                    side: Side::Buy,
                    base_quantity: dec!(1),
                    estimated_value_quote: dec!(100),
                    limit_price: None,
                },
                ArbitrageLeg {
                    priority: 2,
                    symbol: "BTC-PERP".to_string(),
                    side: Side::Sell,
                    base_quantity: dec!(1),
                    estimated_value_quote: dec!(100.2),
                    limit_price: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn both_legs_succeeding_needs_no_neutralization() {
        let exec = executor();
        let result = exec.execute(&signal(), ExecutionMode::Simulation).await;
        assert!(!result.aborted);
        assert_eq!(result.leg_outcomes.len(), 2);
        assert!(result.neutralization_outcomes.is_empty());
    }

    #[tokio::test]
    async fn second_leg_failing_after_first_succeeds_requires_neutralization() {
        let exec = executor();
        let mut sig = signal();
        sig.legs[1].symbol = "NO-SUCH-MARKET".to_string();
        let result = exec.execute(&sig, ExecutionMode::Simulation).await;
        assert!(!result.aborted);
        assert!(result.requires_neutralization);
        assert_eq!(result.neutralization_outcomes.len(), 1);
    }

    #[tokio::test]
    async fn priority_one_failure_in_atomic_mode_aborts_without_neutralization() {
        let exec = executor();
        let mut sig = signal();
        sig.legs[0].symbol = "NO-SUCH-MARKET".to_string();
        let result = exec.execute(&sig, ExecutionMode::Simulation).await;
        assert!(result.aborted);
        assert!(result.neutralization_outcomes.is_empty());
    }
}
