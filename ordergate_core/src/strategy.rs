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

//! Strategy-facing data model: trade intents, trade outcomes, and the
//! strategy metadata the gate chain reads but never mutates. Signal
//! generation itself (indicators, arbitrage detection) is out of scope —
//! strategies are an external collaborator that hands intents to the
//! chain and receives outcomes back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::{Side, Symbol};

pub type StrategyId = String;

/// Coarse classification used by the Capital Allocator to resolve pool
/// kind (arbitrage types draw from the Arbitrage pool, everything else
/// from Directional).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyType {
    Directional,
    Arbitrage,
    MarketMaking,
    Momentum,
    MeanReversion,
}

impl StrategyType {
    pub fn pool_kind(&self) -> crate::capital::PoolKind {
        match self {
            StrategyType::Arbitrage => crate::capital::PoolKind::Arbitrage,
            _ => crate::capital::PoolKind::Directional,
        }
    }
}

/// Risk appetite used by the allocator's confidence-band scaling (§4.3.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Aggressive,
}

/// Lifecycle state of a strategy capital account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Disabled,
    Paused,
    Probation,
    Active,
}

/// Strategy metadata as read by the Capital Allocator and Regime Gate.
/// Supplied by the (out-of-scope) strategy registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMetadata {
    pub strategy_id: StrategyId,
    pub strategy_type: StrategyType,
    pub risk_profile: RiskProfile,
    pub regime_dependent: bool,
}

/// Registry of strategy metadata the allocator and regime gate consult to
/// resolve pool kind, risk profile, and regime applicability. This is the
/// external collaborator boundary named in §4.3 ("Resolve strategy; if
/// unknown -> 0"); production deployments back it with the real strategy
/// registry, tests back it with this in-memory map.
pub trait StrategyRegistry: Send + Sync {
    fn get(&self, strategy_id: &StrategyId) -> Option<StrategyMetadata>;
}

#[derive(Debug, Default)]
pub struct InMemoryStrategyRegistry {
    strategies: dashmap::DashMap<StrategyId, StrategyMetadata>,
}

impl InMemoryStrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, metadata: StrategyMetadata) {
        self.strategies.insert(metadata.strategy_id.clone(), metadata);
    }
}

impl StrategyRegistry for InMemoryStrategyRegistry {
    fn get(&self, strategy_id: &StrategyId) -> Option<StrategyMetadata> {
        self.strategies.get(strategy_id).map(|entry| entry.clone())
    }
}

/// Immutable once emitted by a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIntent {
    pub strategy_id: StrategyId,
    pub symbol: Symbol,
    pub side: Side,
    pub base_quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub estimated_value_quote: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TradeIntent {
    pub fn new(
        strategy_id: impl Into<StrategyId>,
        symbol: impl Into<Symbol>,
        side: Side,
        base_quantity: Decimal,
        estimated_value_quote: Decimal,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            side,
            base_quantity,
            limit_price: None,
            estimated_value_quote,
            timestamp: Utc::now(),
        }
    }

    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }
}

/// Produced by the execution adapter. Shape is identical whether the
/// adapter is real or simulated — that parity is load-bearing for the
/// shadow/confidence-gate machinery in §4.13.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub success: bool,
    pub order_id: Option<String>,
    pub executed_price: Option<Decimal>,
    pub executed_quantity: Option<Decimal>,
    pub fees: Decimal,
    pub slippage: Decimal,
    pub partial: bool,
    pub error: Option<String>,
}

impl TradeOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            order_id: None,
            executed_price: None,
            executed_quantity: None,
            fees: Decimal::ZERO,
            slippage: Decimal::ZERO,
            partial: false,
            error: Some(error.into()),
        }
    }
}
