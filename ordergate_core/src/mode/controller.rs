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

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::events::{EventDraft, EventType};

/// Process-wide, single-valued. Default is `ObserveOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemMode {
    ObserveOnly,
    Aggressive,
}

impl Default for SystemMode {
    fn default() -> Self {
        SystemMode::ObserveOnly
    }
}

impl std::fmt::Display for SystemMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemMode::ObserveOnly => write!(f, "observe_only"),
            SystemMode::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Closed set of startup checks gating the ObserveOnly -> Aggressive
/// transition. All three must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupCheck {
    ConfidenceGateReachable,
    StorageBackendWritable,
    AtLeastOnePoolInitialized,
}

impl std::fmt::Display for StartupCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StartupCheck::ConfidenceGateReachable => "confidence_gate_reachable",
            StartupCheck::StorageBackendWritable => "storage_backend_writable",
            StartupCheck::AtLeastOnePoolInitialized => "at_least_one_pool_initialized",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum ModeTransitionError {
    #[error("startup check failed: {0}")]
    StartupCheckFailed(StartupCheck),
    #[error("Aggressive mode already reached; use an explicit operator downgrade to leave it")]
    AlreadyAggressive,
}

struct State {
    mode: SystemMode,
    ever_aggressive: bool,
}

/// Owns the single system-mode value. `promote_to_aggressive` is gated by
/// startup checks and refuses re-entry once made (one-way per process
/// lifetime) except through `operator_downgrade`.
pub struct ModeController {
    state: RwLock<State>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                mode: SystemMode::ObserveOnly,
                ever_aggressive: false,
            }),
        }
    }

    pub fn current_mode(&self) -> SystemMode {
        self.state.read().mode
    }

    /// Runs the closed set of startup checks; the first failure short
    /// circuits and is returned (and should be recorded by the caller as
    /// a `StartupCheckFailure` alert).
    pub fn promote_to_aggressive(
        &self,
        checks_passed: &[StartupCheck],
    ) -> Result<EventDraft, ModeTransitionError> {
        let mut state = self.state.write();
        if state.mode == SystemMode::Aggressive {
            return Err(ModeTransitionError::AlreadyAggressive);
        }

        for required in [
            StartupCheck::ConfidenceGateReachable,
            StartupCheck::StorageBackendWritable,
            StartupCheck::AtLeastOnePoolInitialized,
        ] {
            if !checks_passed.contains(&required) {
                warn!(check = %required, "startup check failed, refusing promotion to Aggressive");
                return Err(ModeTransitionError::StartupCheckFailed(required));
            }
        }

        state.mode = SystemMode::Aggressive;
        state.ever_aggressive = true;
        info!("system mode -> Aggressive");

        Ok(EventDraft::new(EventType::SystemModeChange)
            .with_reason("promoted to aggressive")
            .with_metadata("mode", json!("aggressive")))
    }

    /// Explicit operator-issued downgrade back to ObserveOnly. Always
    /// succeeds and is always logged with `reason = "operator-downgrade"`.
    pub fn operator_downgrade(&self) -> EventDraft {
        let mut state = self.state.write();
        state.mode = SystemMode::ObserveOnly;
        info!("system mode -> ObserveOnly (operator downgrade)");

        EventDraft::new(EventType::SystemModeChange)
            .with_reason("operator-downgrade")
            .with_metadata("mode", json!("observe_only"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_observe_only() {
        let ctrl = ModeController::new();
        assert_eq!(ctrl.current_mode(), SystemMode::ObserveOnly);
    }

    #[test]
    fn promotion_requires_all_checks() {
        let ctrl = ModeController::new();
        let err = ctrl
            .promote_to_aggressive(&[StartupCheck::ConfidenceGateReachable])
            .unwrap_err();
        assert!(matches!(err, ModeTransitionError::StartupCheckFailed(_)));
        assert_eq!(ctrl.current_mode(), SystemMode::ObserveOnly);
    }

    #[test]
    fn promotion_succeeds_with_all_checks_and_is_one_way() {
        let ctrl = ModeController::new();
        let all = [
            StartupCheck::ConfidenceGateReachable,
            StartupCheck::StorageBackendWritable,
            StartupCheck::AtLeastOnePoolInitialized,
        ];
        ctrl.promote_to_aggressive(&all).unwrap();
        assert_eq!(ctrl.current_mode(), SystemMode::Aggressive);

        let err = ctrl.promote_to_aggressive(&all).unwrap_err();
        assert!(matches!(err, ModeTransitionError::AlreadyAggressive));
    }

    #[test]
    fn operator_downgrade_always_succeeds() {
        let ctrl = ModeController::new();
        let all = [
            StartupCheck::ConfidenceGateReachable,
            StartupCheck::StorageBackendWritable,
            StartupCheck::AtLeastOnePoolInitialized,
        ];
        ctrl.promote_to_aggressive(&all).unwrap();
        ctrl.operator_downgrade();
        assert_eq!(ctrl.current_mode(), SystemMode::ObserveOnly);
        // and can be promoted again after a downgrade
        ctrl.promote_to_aggressive(&all).unwrap();
        assert_eq!(ctrl.current_mode(), SystemMode::Aggressive);
    }
}
