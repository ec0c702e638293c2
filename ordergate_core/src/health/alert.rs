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

//! Alert Manager (§4.15). Deliberately closed: the only way to produce
//! an [`Alert`] is through one of the [`AlertTrigger`] variants below.
//! Normal gate denials are never alerted (§4.15) — there is no generic
//! `raise(String)` escape hatch on purpose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

/// The closed set of conditions that may ever produce a CRITICAL alert
/// (§4.15, §9 "alerting discipline"). Anything else "interesting" is an
/// event, not an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertTrigger {
    Shutdown { reason: String },
    FailSafe { reason: String },
    StartupCheckFailure { check: String },
    HeartbeatLoss { component: String, since: DateTime<Utc> },
    CapitalIntegrityViolation { pool: String, detail: String },
    ArbitrageNeutralizationFailure { strategy_id: String, detail: String },
}

impl AlertTrigger {
    fn summary(&self) -> String {
        match self {
            AlertTrigger::Shutdown { reason } => format!("shutdown: {reason}"),
            AlertTrigger::FailSafe { reason } => format!("fail-safe engaged: {reason}"),
            AlertTrigger::StartupCheckFailure { check } => format!("startup check failed: {check}"),
            AlertTrigger::HeartbeatLoss { component, since } => {
                format!("heartbeat lost for {component} since {since}")
            }
            AlertTrigger::CapitalIntegrityViolation { pool, detail } => {
                format!("capital integrity violation in pool {pool}: {detail}")
            }
            AlertTrigger::ArbitrageNeutralizationFailure { strategy_id, detail } => {
                format!("arbitrage neutralization failed for {strategy_id}: {detail}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: u64,
    pub timestamp: DateTime<Utc>,
    pub trigger: AlertTrigger,
    pub summary: String,
}

/// Every emitted alert is CRITICAL by construction (§4.15) — there is no
/// severity field to mis-set, because this module only ever produces one
/// severity.
pub struct AlertManager {
    counter: std::sync::atomic::AtomicU64,
    history: parking_lot::Mutex<Vec<Alert>>,
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertManager {
    pub fn new() -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(0),
            history: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn raise(&self, trigger: AlertTrigger) -> Alert {
        let alert_id = self.counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        let summary = trigger.summary();
        let alert = Alert {
            alert_id,
            timestamp: Utc::now(),
            trigger,
            summary,
        };
        error!(alert_id, summary = %alert.summary, "CRITICAL alert raised");
        self.history.lock().push(alert.clone());
        alert
    }

    pub fn history(&self) -> Vec<Alert> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<Alert> {
        self.history.lock().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raising_an_alert_assigns_increasing_ids() {
        let manager = AlertManager::new();
        let a1 = manager.raise(AlertTrigger::Shutdown { reason: "operator request".to_string() });
        let a2 = manager.raise(AlertTrigger::StartupCheckFailure { check: "market-data-connectivity".to_string() });
        assert_eq!(a1.alert_id, 1);
        assert_eq!(a2.alert_id, 2);
        assert_eq!(manager.history().len(), 2);
    }

    #[test]
    fn capital_integrity_violation_summary_names_the_pool() {
        let manager = AlertManager::new();
        let alert = manager.raise(AlertTrigger::CapitalIntegrityViolation {
            pool: "directional".to_string(),
            detail: "available + allocated != total".to_string(),
        });
        assert!(alert.summary.contains("directional"));
    }
}
