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

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which book a strategy draws capital from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Directional,
    Arbitrage,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Directional => write!(f, "directional"),
            PoolKind::Arbitrage => write!(f, "arbitrage"),
        }
    }
}

/// Point-in-time view of a pool, used for snapshots and the operator API.
/// Plain data, no lock held.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub pool_kind: PoolKind,
    pub total_equity: Decimal,
    pub allocated: Decimal,
    pub available: Decimal,
    pub peak_equity: Decimal,
    pub current_drawdown_pct: Decimal,
    pub max_drawdown_pct: Decimal,
}

struct PoolState {
    total_equity: Decimal,
    allocated: Decimal,
    available: Decimal,
    peak_equity: Decimal,
    current_drawdown_pct: Decimal,
}

/// Isolated bag of capital. The pool is the sole allocator of its
/// capital — strategies never mutate it directly, only through
/// [`crate::capital::CapitalAllocator`]. All operations are total: none
/// of them raise, per §4.1.
pub struct CapitalPool {
    pub kind: PoolKind,
    pub max_drawdown_pct: Decimal,
    state: Mutex<PoolState>,
}

impl CapitalPool {
    pub fn new(kind: PoolKind, initial_equity: Decimal, max_drawdown_pct: Decimal) -> Self {
        Self {
            kind,
            max_drawdown_pct,
            state: Mutex::new(PoolState {
                total_equity: initial_equity,
                allocated: Decimal::ZERO,
                available: initial_equity,
                peak_equity: initial_equity,
                current_drawdown_pct: Decimal::ZERO,
            }),
        }
    }

    /// granted = min(amount, available); refuses entirely once the pool
    /// has breached its max drawdown.
    pub fn allocate(&self, amount: Decimal) -> Decimal {
        let mut state = self.state.lock();
        if state.current_drawdown_pct >= self.max_drawdown_pct {
            return Decimal::ZERO;
        }
        let granted = amount.min(state.available).max(Decimal::ZERO);
        state.available -= granted;
        state.allocated += granted;
        granted
    }

    pub fn release(&self, amount: Decimal) -> Decimal {
        let mut state = self.state.lock();
        let released = amount.min(state.allocated).max(Decimal::ZERO);
        state.allocated -= released;
        state.available += released;
        released
    }

    /// total += pnl; available += pnl; peak is monotonically
    /// non-decreasing; drawdown recomputed from the new peak.
    pub fn update_equity(&self, pnl: Decimal) {
        let mut state = self.state.lock();
        state.total_equity += pnl;
        state.available += pnl;
        if state.total_equity > state.peak_equity {
            state.peak_equity = state.total_equity;
        }
        state.current_drawdown_pct = Self::drawdown_pct(state.peak_equity, state.total_equity);
    }

    fn drawdown_pct(peak: Decimal, total: Decimal) -> Decimal {
        if peak <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let raw = (peak - total) / peak * Decimal::ONE_HUNDRED;
        raw.max(Decimal::ZERO)
    }

    pub fn can_allocate(&self, amount: Decimal) -> bool {
        let state = self.state.lock();
        state.available >= amount && state.current_drawdown_pct < self.max_drawdown_pct
    }

    pub fn metrics(&self) -> PoolMetrics {
        let state = self.state.lock();
        PoolMetrics {
            pool_kind: self.kind,
            total_equity: state.total_equity,
            allocated: state.allocated,
            available: state.available,
            peak_equity: state.peak_equity,
            current_drawdown_pct: state.current_drawdown_pct,
            max_drawdown_pct: self.max_drawdown_pct,
        }
    }

    pub fn available(&self) -> Decimal {
        self.state.lock().available
    }

    pub fn allocated(&self) -> Decimal {
        self.state.lock().allocated
    }

    pub fn total_equity(&self) -> Decimal {
        self.state.lock().total_equity
    }

    pub fn current_drawdown_pct(&self) -> Decimal {
        self.state.lock().current_drawdown_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool() -> CapitalPool {
        CapitalPool::new(PoolKind::Directional, dec!(10000), dec!(20))
    }

    #[test]
    fn allocate_caps_at_available() {
        let p = pool();
        assert_eq!(p.allocate(dec!(4000)), dec!(4000));
        assert_eq!(p.available(), dec!(6000));
        assert_eq!(p.allocate(dec!(8000)), dec!(6000));
        assert_eq!(p.available(), dec!(0));
    }

    #[test]
    fn release_reverses_allocate() {
        let p = pool();
        p.allocate(dec!(3000));
        assert_eq!(p.release(dec!(1000)), dec!(1000));
        assert_eq!(p.allocated(), dec!(2000));
        assert_eq!(p.available(), dec!(8000));
    }

    #[test]
    fn drawdown_blocks_allocation_even_when_available() {
        let p = pool();
        // Crash equity by 25%, above the 20% max drawdown.
        p.update_equity(dec!(-2500));
        assert_eq!(p.current_drawdown_pct(), dec!(25));
        assert_eq!(p.allocate(dec!(100)), dec!(0));
        assert!(!p.can_allocate(dec!(1)));
    }

    #[test]
    fn peak_never_decreases() {
        let p = pool();
        p.update_equity(dec!(1000));
        assert_eq!(p.metrics().peak_equity, dec!(11000));
        p.update_equity(dec!(-500));
        assert_eq!(p.metrics().peak_equity, dec!(11000));
    }

    #[test]
    fn boundary_capital_exact_vs_epsilon() {
        let p = pool();
        p.allocate(dec!(9999.99));
        // available == requested -> fully granted
        let p2 = pool();
        assert_eq!(p2.allocate(dec!(10000)), dec!(10000));
        assert_eq!(p2.available(), dec!(0));
        // one more cent is denied down to whatever remains
        assert_eq!(p2.allocate(dec!(0.01)), dec!(0));
    }
}
