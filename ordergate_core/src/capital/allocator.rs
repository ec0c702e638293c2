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

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capital::account::AccountManager;
use crate::capital::pool::{CapitalPool, PoolKind};
use crate::strategy::{LifecycleState, RiskProfile, StrategyId, StrategyRegistry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Fraction of a pool's total equity a single strategy may draw at most.
    pub max_strategy_allocation_pct: Decimal,
    /// Minimum non-zero allocation granted to an Arbitrage-pool strategy.
    pub arbitrage_min_floor: Decimal,
    /// Below this total pool equity, a warning is logged (not a denial) —
    /// the arbitrage floor is getting close to starving other strategies.
    pub pool_min_floor_warning: Decimal,
    /// Multiplicative decay applied to a probationary strategy's target
    /// allocation per elapsed probation period.
    pub probation_decay_rate: Decimal,
    /// Number of probation periods after which allocation is floored to
    /// zero regardless of decay rate.
    pub probation_decay_periods: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_strategy_allocation_pct: dec!(0.25),
            arbitrage_min_floor: dec!(50),
            pool_min_floor_warning: dec!(100),
            probation_decay_rate: dec!(0.5),
            probation_decay_periods: 2,
        }
    }
}

/// Confidence-band multiplier applied to Aggressive-profile strategies'
/// target allocation, keyed off the prevailing regime confidence.
fn aggressive_confidence_multiplier(confidence: Option<f64>) -> Decimal {
    match confidence {
        None => Decimal::ZERO,
        Some(c) if c < 0.4 => Decimal::ZERO,
        Some(c) if c < 0.6 => dec!(0.5),
        Some(c) if c < 0.8 => dec!(1.0),
        Some(_) => dec!(1.5),
    }
}

/// The only path by which a strategy's capital account changes. Pools
/// never mutate themselves; this is the sole caller of `allocate`/
/// `release` on [`CapitalPool`].
pub struct CapitalAllocator {
    config: AllocatorConfig,
    registry: Arc<dyn StrategyRegistry>,
    accounts: Arc<AccountManager>,
}

impl CapitalAllocator {
    pub fn new(
        config: AllocatorConfig,
        registry: Arc<dyn StrategyRegistry>,
        accounts: Arc<AccountManager>,
    ) -> Self {
        Self {
            config,
            registry,
            accounts,
        }
    }

    /// Resolves the strategy's target allocation against `pool` and
    /// applies it, releasing the prior allocation first. Returns the new
    /// allocation (zero if the strategy is unknown, disabled, paused, or
    /// fully decayed out of probation).
    ///
    /// `requested` is the caller's desired allocation size; it is capped
    /// by the pool-equity-based ceiling (`max_strategy_allocation_pct`)
    /// at every step rather than being replaced by it. `probation_periods_elapsed`
    /// and `regime_confidence` are supplied by the caller (the allocator
    /// has no notion of calendar time or market state of its own).
    pub fn allocate(
        &self,
        strategy_id: &StrategyId,
        pool: &CapitalPool,
        requested: Decimal,
        probation_periods_elapsed: u32,
        regime_confidence: Option<f64>,
    ) -> Decimal {
        let metadata = match self.registry.get(strategy_id) {
            Some(m) => m,
            None => {
                debug!(strategy_id, "unknown strategy, zeroing allocation");
                return self.zero_out(strategy_id, pool);
            }
        };

        if metadata.strategy_type.pool_kind() != pool.kind {
            warn!(strategy_id, expected = %metadata.strategy_type.pool_kind(), got = %pool.kind, "pool kind mismatch");
            return self.zero_out(strategy_id, pool);
        }

        let account = self.accounts.create(strategy_id, pool.kind);

        let target = match account.lifecycle_state {
            LifecycleState::Disabled | LifecycleState::Paused => Decimal::ZERO,
            LifecycleState::Probation => {
                self.probation_target(pool, requested, probation_periods_elapsed)
            }
            LifecycleState::Active => self.base_target(pool, requested),
        };

        let target = self.apply_profile_adjustments(&metadata.risk_profile, pool.kind, target, regime_confidence);

        self.release_then_allocate(strategy_id, pool, target)
    }

    fn zero_out(&self, strategy_id: &StrategyId, pool: &CapitalPool) -> Decimal {
        if let Some(account) = self.accounts.get(strategy_id) {
            pool.release(account.allocated);
        }
        self.accounts.update_allocation(strategy_id, Decimal::ZERO);
        Decimal::ZERO
    }

    /// `requested`, capped at the fraction of pool equity a single
    /// strategy may draw at most. The pool-equity figure is a ceiling on
    /// `requested`, never a target in its own right.
    fn base_target(&self, pool: &CapitalPool, requested: Decimal) -> Decimal {
        requested.min(pool.total_equity() * self.config.max_strategy_allocation_pct)
    }

    fn probation_target(&self, pool: &CapitalPool, requested: Decimal, periods_elapsed: u32) -> Decimal {
        if periods_elapsed >= self.config.probation_decay_periods {
            return Decimal::ZERO;
        }
        let mut decay = Decimal::ONE;
        for _ in 0..=periods_elapsed {
            decay *= self.config.probation_decay_rate;
        }
        self.base_target(pool, requested) * decay
    }

    fn apply_profile_adjustments(
        &self,
        risk_profile: &RiskProfile,
        pool_kind: PoolKind,
        target: Decimal,
        regime_confidence: Option<f64>,
    ) -> Decimal {
        let mut target = target;

        if *risk_profile == RiskProfile::Aggressive {
            target *= aggressive_confidence_multiplier(regime_confidence);
        }

        if pool_kind == PoolKind::Arbitrage && target > Decimal::ZERO && target < self.config.arbitrage_min_floor {
            target = self.config.arbitrage_min_floor;
        }

        target
    }

    fn release_then_allocate(&self, strategy_id: &StrategyId, pool: &CapitalPool, target: Decimal) -> Decimal {
        if let Some(account) = self.accounts.get(strategy_id) {
            pool.release(account.allocated);
        }

        let granted = if target > Decimal::ZERO {
            pool.allocate(target)
        } else {
            Decimal::ZERO
        };

        if pool.kind == PoolKind::Arbitrage && pool.total_equity() < self.config.pool_min_floor_warning {
            warn!(strategy_id, pool_equity = %pool.total_equity(), "arbitrage pool nearing minimum floor");
        }

        self.accounts.update_allocation(strategy_id, granted);
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{InMemoryStrategyRegistry, StrategyMetadata, StrategyType};

    fn setup(strategy_type: StrategyType, risk_profile: RiskProfile) -> (CapitalAllocator, CapitalPool) {
        let registry = Arc::new(InMemoryStrategyRegistry::new());
        registry.register(StrategyMetadata {
            strategy_id: "s1".to_string(),
            strategy_type,
            risk_profile,
            regime_dependent: false,
        });
        let pool_kind = strategy_type.pool_kind();
        let pool = CapitalPool::new(pool_kind, dec!(10000), dec!(20));
        let allocator = CapitalAllocator::new(
            AllocatorConfig::default(),
            registry,
            Arc::new(AccountManager::new()),
        );
        (allocator, pool)
    }

    #[test]
    fn active_balanced_strategy_is_capped_at_pool_equity_ceiling() {
        let (allocator, pool) = setup(StrategyType::Momentum, RiskProfile::Balanced);
        // requested far exceeds the 25% ceiling (2500), so the ceiling wins.
        let granted = allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, None);
        assert_eq!(granted, dec!(2500));
    }

    #[test]
    fn active_strategy_gets_requested_when_below_ceiling() {
        let (allocator, pool) = setup(StrategyType::Momentum, RiskProfile::Balanced);
        let granted = allocator.allocate(&"s1".to_string(), &pool, dec!(500), 0, None);
        assert_eq!(granted, dec!(500));
    }

    #[test]
    fn unknown_strategy_is_zeroed() {
        let registry = Arc::new(InMemoryStrategyRegistry::new());
        let pool = CapitalPool::new(PoolKind::Directional, dec!(10000), dec!(20));
        let allocator = CapitalAllocator::new(AllocatorConfig::default(), registry, Arc::new(AccountManager::new()));
        let granted = allocator.allocate(&"ghost".to_string(), &pool, dec!(1000), 0, None);
        assert_eq!(granted, dec!(0));
    }

    #[test]
    fn probation_decays_to_zero_after_configured_periods() {
        let (allocator, pool) = setup(StrategyType::Momentum, RiskProfile::Balanced);
        allocator.accounts.update_state(&"s1".to_string(), LifecycleState::Probation);
        // first allocate() call creates the account as Active by default,
        // so flip state after the account exists.
        allocator.accounts.create(&"s1".to_string(), pool.kind);
        allocator.accounts.update_state(&"s1".to_string(), LifecycleState::Probation);

        let period0 = allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, None);
        assert_eq!(period0, dec!(1250)); // 2500 * 0.5^1
        allocator.accounts.update_state(&"s1".to_string(), LifecycleState::Probation);
        let period1 = allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 1, None);
        assert_eq!(period1, dec!(625)); // 2500 * 0.5^2
        allocator.accounts.update_state(&"s1".to_string(), LifecycleState::Probation);
        let period2 = allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 2, None);
        assert_eq!(period2, dec!(0));
    }

    #[test]
    fn aggressive_profile_scales_with_regime_confidence() {
        let (allocator, pool) = setup(StrategyType::Momentum, RiskProfile::Aggressive);
        assert_eq!(allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, None), dec!(0));
        assert_eq!(allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, Some(0.3)), dec!(0));
        assert_eq!(allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, Some(0.5)), dec!(1250));
        assert_eq!(allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, Some(0.7)), dec!(2500));
        assert_eq!(allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, Some(0.9)), dec!(3750));
    }

    #[test]
    fn arbitrage_pool_enforces_minimum_floor() {
        let (allocator, pool) = setup(StrategyType::Arbitrage, RiskProfile::Conservative);
        // requested clears the $50 floor comfortably; shrink the pool so
        // the ceiling-capped target would fall under it instead.
        let small_pool = CapitalPool::new(PoolKind::Arbitrage, dec!(100), dec!(20));
        let granted = allocator.allocate(&"s1".to_string(), &small_pool, dec!(100_000), 0, None);
        assert_eq!(granted, dec!(50));
        let _ = pool;
    }

    #[test]
    fn disabled_strategy_releases_and_zeroes() {
        let (allocator, pool) = setup(StrategyType::Momentum, RiskProfile::Balanced);
        allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, None);
        assert_eq!(pool.allocated(), dec!(2500));
        allocator.accounts.update_state(&"s1".to_string(), LifecycleState::Disabled);
        let granted = allocator.allocate(&"s1".to_string(), &pool, dec!(100_000), 0, None);
        assert_eq!(granted, dec!(0));
        assert_eq!(pool.allocated(), dec!(0));
    }
}
