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

//! Runtime Tracker (§4.14). Records distinct UTC calendar dates on which
//! at least one non-`Real` execution occurred, feeding the Confidence
//! Gate's `active-trading-days` threshold. Deterministic and
//! serializable so it can be reconstructed during replay.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::execution::ExecutionMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuntimeTrackerState {
    active_dates: BTreeSet<NaiveDate>,
}

/// Exclusive on mutation (§5): a single mutex guards the date set, since
/// `record_active_day` is rare (once per day per mode) compared to the
/// gate-chain hot path.
pub struct RuntimeTracker {
    state: Mutex<RuntimeTrackerState>,
}

impl Default for RuntimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RuntimeTrackerState {
                active_dates: BTreeSet::new(),
            }),
        }
    }

    /// Records `date` as active if `mode` is not `Real`. A no-op for
    /// `Real` executions, since the runtime tracker exists specifically
    /// to accumulate shadow/simulation evidence for the confidence gate.
    pub fn record_active_day(&self, mode: ExecutionMode, date: NaiveDate) {
        if mode == ExecutionMode::Real {
            return;
        }
        self.state.lock().active_dates.insert(date);
    }

    pub fn active_trading_days(&self) -> usize {
        self.state.lock().active_dates.len()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.state.lock().active_dates.iter().next().copied()
    }

    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.state.lock().active_dates.iter().next_back().copied()
    }

    /// Rehydrates the tracker from a serialized date set, e.g. replayed
    /// from the event log at startup.
    pub fn restore(&self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.state.lock().active_dates.extend(dates);
    }

    pub fn active_dates(&self) -> Vec<NaiveDate> {
        self.state.lock().active_dates.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_executions_never_count() {
        let tracker = RuntimeTracker::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        tracker.record_active_day(ExecutionMode::Real, date);
        assert_eq!(tracker.active_trading_days(), 0);
    }

    #[test]
    fn distinct_dates_accumulate_deterministically() {
        let tracker = RuntimeTracker::new();
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        tracker.record_active_day(ExecutionMode::Shadow, d1);
        tracker.record_active_day(ExecutionMode::Simulation, d1);
        tracker.record_active_day(ExecutionMode::Shadow, d2);
        assert_eq!(tracker.active_trading_days(), 2);
        assert_eq!(tracker.start_date(), Some(d1));
        assert_eq!(tracker.last_active_date(), Some(d2));
    }
}
