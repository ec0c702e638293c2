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
use serde::{Deserialize, Serialize};

use crate::capital::account::AccountManager;
use crate::gate::{GateLayer, GateVerdict};
use crate::strategy::StrategyId;

/// Detail returned alongside the tagged [`GateVerdict`], useful for
/// telemetry and the operator API without forcing callers to re-derive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalCheckResult {
    pub allowed: bool,
    pub reason: Option<String>,
    pub allocated: Decimal,
    pub requested: Decimal,
}

/// First gate in the chain. Denies a trade whose value exceeds the
/// strategy's currently allocated capital, or any trade from a strategy
/// with no account or zero allocation.
pub struct CapitalGate {
    accounts: Arc<AccountManager>,
}

impl CapitalGate {
    pub fn new(accounts: Arc<AccountManager>) -> Self {
        Self { accounts }
    }

    pub fn check(&self, strategy_id: &StrategyId, trade_value_quote: Decimal) -> (GateVerdict, CapitalCheckResult) {
        let account = match self.accounts.get(strategy_id) {
            Some(a) => a,
            None => {
                let result = CapitalCheckResult {
                    allowed: false,
                    reason: Some("no capital account for strategy".to_string()),
                    allocated: Decimal::ZERO,
                    requested: trade_value_quote,
                };
                return (
                    GateVerdict::deny(GateLayer::Capital, result.reason.clone().unwrap()),
                    result,
                );
            }
        };

        if account.allocated <= Decimal::ZERO {
            let result = CapitalCheckResult {
                allowed: false,
                reason: Some("strategy has zero allocated capital".to_string()),
                allocated: account.allocated,
                requested: trade_value_quote,
            };
            return (
                GateVerdict::deny(GateLayer::Capital, result.reason.clone().unwrap()),
                result,
            );
        }

        if trade_value_quote > account.allocated {
            let result = CapitalCheckResult {
                allowed: false,
                reason: Some(format!(
                    "trade value {} exceeds allocated capital {}",
                    trade_value_quote, account.allocated
                )),
                allocated: account.allocated,
                requested: trade_value_quote,
            };
            return (
                GateVerdict::deny(GateLayer::Capital, result.reason.clone().unwrap()),
                result,
            );
        }

        (
            GateVerdict::Allow,
            CapitalCheckResult {
                allowed: true,
                reason: None,
                allocated: account.allocated,
                requested: trade_value_quote,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capital::pool::PoolKind;
    use rust_decimal_macros::dec;

    #[test]
    fn no_account_is_denied() {
        let accounts = Arc::new(AccountManager::new());
        let gate = CapitalGate::new(accounts);
        let (verdict, _) = gate.check(&"ghost".to_string(), dec!(10));
        assert!(!verdict.is_allow());
    }

    #[test]
    fn zero_allocation_is_denied() {
        let accounts = Arc::new(AccountManager::new());
        accounts.create(&"s1".to_string(), PoolKind::Directional);
        let gate = CapitalGate::new(accounts);
        let (verdict, _) = gate.check(&"s1".to_string(), dec!(10));
        assert!(!verdict.is_allow());
    }

    #[test]
    fn trade_exceeding_allocation_is_denied() {
        let accounts = Arc::new(AccountManager::new());
        accounts.create(&"s1".to_string(), PoolKind::Directional);
        accounts.update_allocation(&"s1".to_string(), dec!(100));
        let gate = CapitalGate::new(accounts);
        let (verdict, _) = gate.check(&"s1".to_string(), dec!(150));
        assert!(!verdict.is_allow());
    }

    #[test]
    fn trade_at_exactly_allocated_capital_is_allowed() {
        let accounts = Arc::new(AccountManager::new());
        accounts.create(&"s1".to_string(), PoolKind::Directional);
        accounts.update_allocation(&"s1".to_string(), dec!(100));
        let gate = CapitalGate::new(accounts);
        let (verdict, result) = gate.check(&"s1".to_string(), dec!(100));
        assert!(verdict.is_allow());
        assert!(result.allowed);
    }
}
