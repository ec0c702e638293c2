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

//! Daily Snapshot Generator (§4.12.1). Folds a day's events plus pool and
//! per-strategy state into an immutable record. Sealed at creation —
//! [`crate::storage::StorageBackend::write_snapshot`] refuses to
//! overwrite a date that already has one.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::capital::PoolKind;
use crate::events::{Event, EventType};
use crate::gate::GateLayer;
use crate::mode::SystemMode;
use crate::regime::Regime;
use crate::strategy::StrategyId;

/// Coarse, day-level risk posture. `Paused` if any account was paused by
/// the Risk Governor at any point during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskState {
    Normal,
    Paused,
}

/// Everything [`DailySnapshotGenerator::generate`] needs besides the
/// event log, since pool/account/allocation state does not live in the
/// log itself.
#[derive(Debug, Clone)]
pub struct DailySnapshotInputs {
    pub system_mode: SystemMode,
    pub risk_state: RiskState,
    pub total_equity: Decimal,
    pub pool_equity: HashMap<PoolKind, Decimal>,
    pub pool_drawdown_pct: HashMap<PoolKind, Decimal>,
    pub strategy_pnl: HashMap<StrategyId, Decimal>,
    pub strategy_drawdown_pct: HashMap<StrategyId, Decimal>,
    pub capital_allocation: HashMap<StrategyId, Decimal>,
}

/// Immutable, per-day summary (§3). `snapshot_id` is the ISO date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub snapshot_id: NaiveDate,
    pub system_mode: SystemMode,
    pub risk_state: RiskState,
    pub total_equity: Decimal,
    pub pool_equity: HashMap<String, Decimal>,
    pub pool_drawdown_pct: HashMap<String, Decimal>,
    pub strategy_pnl: HashMap<StrategyId, Decimal>,
    pub strategy_drawdowns: HashMap<StrategyId, Decimal>,
    pub regime_distribution: HashMap<String, u32>,
    pub trades_attempted: u32,
    pub trades_blocked: u32,
    pub trades_executed: u32,
    pub blocking_reason_histogram: HashMap<String, u32>,
    pub capital_allocation: HashMap<StrategyId, Decimal>,
    pub event_types: HashMap<String, u32>,
}

pub struct DailySnapshotGenerator;

impl DailySnapshotGenerator {
    /// Folds `events` (already filtered to `date`) and `inputs` into a
    /// sealed [`DailySnapshot`]. Pure: no clock reads, no I/O. Calling
    /// this twice with the same inputs yields a byte-equal record
    /// (field order is stable, `HashMap` serialization aside).
    pub fn generate(date: NaiveDate, events: &[Event], inputs: DailySnapshotInputs) -> DailySnapshot {
        let mut regime_distribution: HashMap<String, u32> = HashMap::new();
        let mut blocking_reason_histogram: HashMap<String, u32> = HashMap::new();
        let mut event_types: HashMap<String, u32> = HashMap::new();
        let mut trades_blocked = 0u32;
        let mut trades_executed = 0u32;

        for event in events {
            *event_types.entry(event.event_type.to_string()).or_insert(0) += 1;

            match event.event_type {
                EventType::TradeBlocked => {
                    trades_blocked += 1;
                    let layer = event
                        .blocking_layer
                        .map(|l: GateLayer| l.to_string())
                        .unwrap_or_else(|| "UNSPECIFIED".to_string());
                    *blocking_reason_histogram.entry(layer).or_insert(0) += 1;
                }
                EventType::TradeExecuted => trades_executed += 1,
                EventType::RegimeDetected => {
                    if let Some(regime_str) = event.metadata.get("regime").and_then(|v| v.as_str()) {
                        *regime_distribution.entry(regime_str.to_string()).or_insert(0) += 1;
                    }
                }
                _ => {}
            }
        }

        DailySnapshot {
            snapshot_id: date,
            system_mode: inputs.system_mode,
            risk_state: inputs.risk_state,
            total_equity: inputs.total_equity,
            pool_equity: inputs
                .pool_equity
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            pool_drawdown_pct: inputs
                .pool_drawdown_pct
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            strategy_pnl: inputs.strategy_pnl,
            strategy_drawdowns: inputs.strategy_drawdown_pct,
            regime_distribution,
            trades_attempted: trades_blocked + trades_executed,
            trades_blocked,
            trades_executed,
            blocking_reason_histogram,
            capital_allocation: inputs.capital_allocation,
            event_types,
        }
    }
}

/// All possible values of [`Regime`] as their canonical snapshot-key
/// strings, used by tests and the operator CLI to pre-seed histograms.
pub fn regime_key(regime: Regime) -> String {
    regime.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDraft;
    use rust_decimal_macros::dec;

    fn base_inputs() -> DailySnapshotInputs {
        DailySnapshotInputs {
            system_mode: SystemMode::ObserveOnly,
            risk_state: RiskState::Normal,
            total_equity: dec!(10000),
            pool_equity: HashMap::new(),
            pool_drawdown_pct: HashMap::new(),
            strategy_pnl: HashMap::new(),
            strategy_drawdown_pct: HashMap::new(),
            capital_allocation: HashMap::new(),
        }
    }

    #[test]
    fn counts_match_event_stream() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let ts = date.and_hms_opt(12, 0, 0).unwrap().and_utc();
        let events: Vec<Event> = vec![
            EventDraft::new(EventType::TradeExecuted).into_event(1, ts),
            EventDraft::new(EventType::TradeExecuted).into_event(2, ts),
            EventDraft::new(EventType::TradeExecuted)
                .with_blocking_layer(GateLayer::Capital)
                .into_event(3, ts),
            EventDraft::new(EventType::TradeBlocked)
                .with_blocking_layer(GateLayer::Capital)
                .into_event(4, ts),
            EventDraft::new(EventType::TradeBlocked)
                .with_blocking_layer(GateLayer::Risk)
                .into_event(5, ts),
        ];
        let snapshot = DailySnapshotGenerator::generate(date, &events, base_inputs());
        assert_eq!(snapshot.trades_executed, 3);
        assert_eq!(snapshot.trades_blocked, 2);
        assert_eq!(snapshot.trades_attempted, 5);
        assert_eq!(snapshot.blocking_reason_histogram.get("CAPITAL"), Some(&1));
        assert_eq!(snapshot.blocking_reason_histogram.get("RISK"), Some(&1));
    }

    #[test]
    fn generation_is_idempotent() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let ts = date.and_hms_opt(1, 0, 0).unwrap().and_utc();
        let events = vec![EventDraft::new(EventType::TradeExecuted).into_event(1, ts)];
        let a = DailySnapshotGenerator::generate(date, &events, base_inputs());
        let b = DailySnapshotGenerator::generate(date, &events, base_inputs());
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
