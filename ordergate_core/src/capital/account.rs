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

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::capital::pool::PoolKind;
use crate::strategy::{LifecycleState, StrategyId};

/// Per-strategy accounting record tied to exactly one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyCapitalAccount {
    pub strategy_id: StrategyId,
    pub pool_kind: PoolKind,
    pub allocated: Decimal,
    pub peak_allocated: Decimal,
    pub current_drawdown_pct: Decimal,
    pub lifecycle_state: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StrategyCapitalAccount {
    fn new(strategy_id: StrategyId, pool_kind: PoolKind) -> Self {
        let now = Utc::now();
        Self {
            strategy_id,
            pool_kind,
            allocated: Decimal::ZERO,
            peak_allocated: Decimal::ZERO,
            current_drawdown_pct: Decimal::ZERO,
            lifecycle_state: LifecycleState::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_capital(&self) -> bool {
        self.allocated > Decimal::ZERO
    }

    fn apply_allocation(&mut self, new_allocation: Decimal) {
        self.allocated = new_allocation;
        if new_allocation > self.peak_allocated {
            self.peak_allocated = new_allocation;
        }
        self.current_drawdown_pct = if self.peak_allocated > Decimal::ZERO {
            ((self.peak_allocated - new_allocation) / self.peak_allocated * Decimal::ONE_HUNDRED)
                .max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        self.updated_at = Utc::now();
    }
}

/// Keyed mapping strategy-id -> account. Lock-free reads via `DashMap`
/// so the Capital Gate's hot path never contends with allocator writes.
#[derive(Debug, Default)]
pub struct AccountManager {
    accounts: DashMap<StrategyId, StrategyCapitalAccount>,
}

impl AccountManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, strategy_id: &StrategyId, pool_kind: PoolKind) -> StrategyCapitalAccount {
        self.accounts
            .entry(strategy_id.clone())
            .or_insert_with(|| StrategyCapitalAccount::new(strategy_id.clone(), pool_kind))
            .clone()
    }

    pub fn get(&self, strategy_id: &StrategyId) -> Option<StrategyCapitalAccount> {
        self.accounts.get(strategy_id).map(|a| a.clone())
    }

    /// Updates allocation, recomputing peak-allocated and drawdown.
    pub fn update_allocation(&self, strategy_id: &StrategyId, new_allocation: Decimal) -> Option<StrategyCapitalAccount> {
        self.accounts.get_mut(strategy_id).map(|mut entry| {
            entry.apply_allocation(new_allocation);
            entry.clone()
        })
    }

    pub fn update_state(&self, strategy_id: &StrategyId, new_state: LifecycleState) -> Option<StrategyCapitalAccount> {
        self.accounts.get_mut(strategy_id).map(|mut entry| {
            entry.lifecycle_state = new_state;
            entry.updated_at = Utc::now();
            entry.clone()
        })
    }

    pub fn all(&self) -> Vec<StrategyCapitalAccount> {
        self.accounts.iter().map(|e| e.clone()).collect()
    }
}
