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

//! Simulated Execution Adapter (§4.10). High-fidelity fill simulator
//! producing the exact same [`TradeOutcome`] shape as the real venue
//! adapter — that parity is load-bearing for the shadow tracker and
//! confidence gate. Determinism is parameterized by an explicit counter;
//! the fill algorithm reads no wall clock apart from stamping the
//! deterministic order id, per the §9 design note.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::{MarketDataSource, Side, Ticker};
use crate::strategy::{TradeIntent, TradeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlippageModel {
    Linear,
    SquareRoot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulatedAdapterConfig {
    pub fixed_latency_ms: u64,
    pub maker_fee_bps: Decimal,
    pub taker_fee_bps: Decimal,
    /// Fraction of simulated depth (`mid * 1000` quote units) fillable
    /// in a single intent.
    pub max_liquidity_fraction: Decimal,
    pub slippage_model: SlippageModel,
    pub base_bps: Decimal,
    pub size_impact_exponent: f64,
}

impl Default for SimulatedAdapterConfig {
    fn default() -> Self {
        Self {
            fixed_latency_ms: 50,
            maker_fee_bps: Decimal::new(10, 2),  // 0.10 bps... see note below
            taker_fee_bps: Decimal::new(20, 2),
            max_liquidity_fraction: Decimal::new(25, 2), // 0.25
            slippage_model: SlippageModel::Linear,
            base_bps: Decimal::new(5, 1), // 0.5 bps
            size_impact_exponent: 1.5,
        }
    }
}

/// High-fidelity simulator with identical outcome shape to the real
/// adapter. Market data comes only from an injected [`MarketDataSource`]
/// — never a synthetic price (§4.10 step 2).
pub struct SimulatedExecutionAdapter {
    config: SimulatedAdapterConfig,
    market_data: Arc<dyn MarketDataSource>,
    counter: AtomicU64,
}

impl SimulatedExecutionAdapter {
    pub fn new(config: SimulatedAdapterConfig, market_data: Arc<dyn MarketDataSource>) -> Self {
        Self {
            config,
            market_data,
            counter: AtomicU64::new(0),
        }
    }

    pub async fn fill(&self, intent: &TradeIntent) -> TradeOutcome {
        tokio::time::sleep(Duration::from_millis(self.config.fixed_latency_ms)).await;

        let ticker = match self.market_data.ticker(&intent.symbol).await {
            Ok(t) => t,
            Err(err) => return TradeOutcome::failure(format!("NoMarketData: {err}")),
        };

        let mid = ticker.mid();
        if mid <= Decimal::ZERO {
            return TradeOutcome::failure("NoMarketData: non-positive mid price");
        }

        let depth = mid * Decimal::from(1000);
        let max_fillable_qty = (depth * self.config.max_liquidity_fraction) / mid;
        let filled = intent.base_quantity.min(max_fillable_qty).max(Decimal::ZERO);
        let partial = filled < intent.base_quantity;

        let s = (intent.estimated_value_quote / depth).min(Decimal::ONE).max(Decimal::ZERO);
        let s_f64 = s.to_f64().unwrap_or(0.0);
        let base_bps_f64 = self.config.base_bps.to_f64().unwrap_or(0.0);
        let slippage_bps_f64 = match self.config.slippage_model {
            SlippageModel::Linear => base_bps_f64 * (1.0 + s_f64.powf(self.config.size_impact_exponent)),
            SlippageModel::SquareRoot => base_bps_f64 * (1.0 + s_f64.powf(self.config.size_impact_exponent)).sqrt(),
        };
        let slippage_bps = Decimal::from_f64_retain(slippage_bps_f64).unwrap_or(Decimal::ZERO);

        let avg_price = match intent.side {
            Side::Buy => mid + mid * slippage_bps / Decimal::from(10_000),
            Side::Sell => mid - mid * slippage_bps / Decimal::from(10_000),
        };

        let is_maker = match intent.side {
            Side::Buy => avg_price <= ticker.ask,
            Side::Sell => avg_price >= ticker.bid,
        };
        let fee_rate = if is_maker {
            self.config.maker_fee_bps
        } else {
            self.config.taker_fee_bps
        } / Decimal::from(10_000);
        let fees = filled * avg_price * fee_rate;

        let reference_side = match intent.side {
            Side::Buy => ticker.ask,
            Side::Sell => ticker.bid,
        };
        let slippage = avg_price - reference_side;

        let counter = self.counter.fetch_add(1, Ordering::SeqCst);
        let order_id = format!("SIM_{}_{}", ticker.timestamp.timestamp_millis(), counter);

        TradeOutcome {
            success: true,
            order_id: Some(order_id),
            executed_price: Some(avg_price),
            executed_quantity: Some(filled),
            fees,
            slippage,
            partial,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::StaticMarketDataSource;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn ticker() -> Ticker {
        Ticker {
            bid: dec!(100),
            ask: dec!(100.1),
            last: dec!(100.05),
            timestamp: Utc::now(),
        }
    }

    fn market() -> Arc<dyn MarketDataSource> {
        Arc::new(StaticMarketDataSource::new().with_ticker("BTC/USD", ticker()))
    }

    #[tokio::test]
    async fn fills_fully_within_liquidity_and_charges_fees() {
        let adapter = SimulatedExecutionAdapter::new(SimulatedAdapterConfig::default(), market());
        let intent = TradeIntent::new("s1", "BTC/USD", Side::Buy, dec!(1), dec!(100));
        let outcome = adapter.fill(&intent).await;
        assert!(outcome.success);
        assert!(!outcome.partial);
        assert!(outcome.fees > Decimal::ZERO);
        assert!(outcome.executed_quantity.unwrap() == dec!(1));
    }

    #[tokio::test]
    async fn large_order_partially_fills_against_simulated_depth() {
        let adapter = SimulatedExecutionAdapter::new(SimulatedAdapterConfig::default(), market());
        // max_fillable = 1000 * 0.25 = 250 units; ask for far more.
        let intent = TradeIntent::new("s1", "BTC/USD", Side::Buy, dec!(10000), dec!(1_000_000));
        let outcome = adapter.fill(&intent).await;
        assert!(outcome.partial);
        assert_eq!(outcome.executed_quantity.unwrap(), dec!(250));
    }

    #[tokio::test]
    async fn missing_market_data_is_a_failure_outcome() {
        let adapter = SimulatedExecutionAdapter::new(SimulatedAdapterConfig::default(), Arc::new(StaticMarketDataSource::new()));
        let intent = TradeIntent::new("s1", "ETH/USD", Side::Buy, dec!(1), dec!(100));
        let outcome = adapter.fill(&intent).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("NoMarketData"));
    }

    #[tokio::test]
    async fn deterministic_order_ids_increase_with_counter() {
        let adapter = SimulatedExecutionAdapter::new(SimulatedAdapterConfig::default(), market());
        let intent = TradeIntent::new("s1", "BTC/USD", Side::Buy, dec!(1), dec!(100));
        let o1 = adapter.fill(&intent).await;
        let o2 = adapter.fill(&intent).await;
        assert_ne!(o1.order_id, o2.order_id);
    }
}
