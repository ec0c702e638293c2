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

//! Replay Engine (§4.12.2). Pure reconstruction of a day's outcome from
//! the event stream: no clocks, no randomness, no adapters. Timestamps
//! come from the events themselves, never `now` (§9 design note).

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventType};
use crate::eventlog::snapshot::DailySnapshot;
use crate::mode::SystemMode;

/// Outcome of replaying a single day. `discrepancies` is empty when no
/// snapshot was supplied, or when the supplied snapshot agrees with the
/// reconstructed counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    pub date: NaiveDate,
    pub replayed: bool,
    pub trades_executed: u32,
    pub trades_blocked: u32,
    pub final_mode: Option<SystemMode>,
    pub max_drawdown_pct: Decimal,
    pub discrepancies: Vec<String>,
}

pub struct ReplayEngine;

impl ReplayEngine {
    /// `events` must already be the set for `date`; this function does
    /// not filter by date itself so it stays a pure function of its
    /// arguments, with no dependency on wall-clock "today".
    pub fn replay_day(date: NaiveDate, events: &[Event], snapshot: Option<&DailySnapshot>) -> ReplayResult {
        let mut ordered: Vec<&Event> = events.iter().collect();
        ordered.sort_by_key(|e| (e.timestamp, e.event_id));

        let mut trades_executed = 0u32;
        let mut trades_blocked = 0u32;
        let mut final_mode: Option<SystemMode> = None;
        let mut max_drawdown_pct = Decimal::ZERO;

        for event in ordered {
            match event.event_type {
                EventType::TradeExecuted => trades_executed += 1,
                EventType::TradeBlocked => trades_blocked += 1,
                EventType::SystemModeChange => {
                    if let Some(mode_str) = event.metadata.get("mode").and_then(|v| v.as_str()) {
                        final_mode = match mode_str {
                            "aggressive" => Some(SystemMode::Aggressive),
                            "observe_only" => Some(SystemMode::ObserveOnly),
                            _ => final_mode,
                        };
                    }
                }
                EventType::CapitalUpdate => {
                    if let Some(dd) = event
                        .metadata
                        .get("drawdown_pct")
                        .and_then(|v| v.as_str())
                        .and_then(|s| Decimal::from_str(s).ok())
                    {
                        if dd > max_drawdown_pct {
                            max_drawdown_pct = dd;
                        }
                    }
                }
                _ => {}
            }
        }

        let mut discrepancies = Vec::new();
        if let Some(snap) = snapshot {
            if snap.trades_executed != trades_executed {
                discrepancies.push(format!(
                    "trades_executed mismatch: snapshot={} replay={}",
                    snap.trades_executed, trades_executed
                ));
            }
            if snap.trades_blocked != trades_blocked {
                discrepancies.push(format!(
                    "trades_blocked mismatch: snapshot={} replay={}",
                    snap.trades_blocked, trades_blocked
                ));
            }
        }

        ReplayResult {
            date,
            replayed: true,
            trades_executed,
            trades_blocked,
            final_mode,
            max_drawdown_pct,
            discrepancies,
        }
    }

    /// Replays each date in `[start, end]` inclusive against the events
    /// that fall on it, with `lookup_events`/`lookup_snapshot` supplying
    /// the per-date inputs so the engine itself stays storage-agnostic.
    pub fn replay_range<'a>(
        start: NaiveDate,
        end: NaiveDate,
        lookup_events: impl Fn(NaiveDate) -> Vec<Event>,
        lookup_snapshot: impl Fn(NaiveDate) -> Option<&'a DailySnapshot>,
    ) -> Vec<ReplayResult> {
        let mut results = Vec::new();
        let mut day = start;
        while day <= end {
            let events = lookup_events(day);
            let snapshot = lookup_snapshot(day);
            results.push(Self::replay_day(day, &events, snapshot));
            day = day.succ_opt().expect("date overflow during replay range");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDraft;
    use crate::eventlog::snapshot::{DailySnapshotGenerator, DailySnapshotInputs, RiskState};
    use std::collections::HashMap;

    fn day_events(date: NaiveDate) -> Vec<Event> {
        let ts = date.and_hms_opt(9, 0, 0).unwrap().and_utc();
        vec![
            EventDraft::new(EventType::TradeExecuted).into_event(1, ts),
            EventDraft::new(EventType::TradeExecuted).into_event(2, ts),
            EventDraft::new(EventType::TradeExecuted).into_event(3, ts),
            EventDraft::new(EventType::TradeBlocked).into_event(4, ts),
            EventDraft::new(EventType::TradeBlocked).into_event(5, ts),
        ]
    }

    #[test]
    fn replay_matches_agreeing_snapshot() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let events = day_events(date);
        let snapshot = DailySnapshotGenerator::generate(
            date,
            &events,
            DailySnapshotInputs {
                system_mode: SystemMode::ObserveOnly,
                risk_state: RiskState::Normal,
                total_equity: Decimal::ZERO,
                pool_equity: HashMap::new(),
                pool_drawdown_pct: HashMap::new(),
                strategy_pnl: HashMap::new(),
                strategy_drawdown_pct: HashMap::new(),
                capital_allocation: HashMap::new(),
            },
        );
        let result = ReplayEngine::replay_day(date, &events, Some(&snapshot));
        assert!(result.replayed);
        assert!(result.discrepancies.is_empty());
        assert_eq!(result.trades_executed, 3);
        assert_eq!(result.trades_blocked, 2);
    }

    #[test]
    fn mutated_snapshot_surfaces_a_discrepancy_without_touching_inputs() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let events = day_events(date);
        let mut snapshot = DailySnapshotGenerator::generate(
            date,
            &events,
            DailySnapshotInputs {
                system_mode: SystemMode::ObserveOnly,
                risk_state: RiskState::Normal,
                total_equity: Decimal::ZERO,
                pool_equity: HashMap::new(),
                pool_drawdown_pct: HashMap::new(),
                strategy_pnl: HashMap::new(),
                strategy_drawdown_pct: HashMap::new(),
                capital_allocation: HashMap::new(),
            },
        );
        snapshot.trades_executed = 4; // mutate in-memory only
        let result = ReplayEngine::replay_day(date, &events, Some(&snapshot));
        assert_eq!(result.discrepancies.len(), 1);
        assert!(result.discrepancies[0].contains("trades_executed"));
    }

    #[test]
    fn replay_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let events = day_events(date);
        let a = ReplayEngine::replay_day(date, &events, None);
        let b = ReplayEngine::replay_day(date, &events, None);
        assert_eq!(a.trades_executed, b.trades_executed);
        assert_eq!(a.trades_blocked, b.trades_blocked);
    }
}
