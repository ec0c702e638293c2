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

use crate::gate::{GateLayer, GateVerdict};
use crate::mode::controller::{ModeController, SystemMode};
use crate::strategy::{LifecycleState, StrategyMetadata};

/// Third gate in the chain. In `ObserveOnly`, every real-execution
/// intent is denied regardless of strategy state — shadow and
/// simulation traffic never reach this gate, so they are unaffected. In
/// `Aggressive`, permission is a function of account lifecycle state.
pub struct PermissionGate {
    controller: Arc<ModeController>,
}

impl PermissionGate {
    pub fn new(controller: Arc<ModeController>) -> Self {
        Self { controller }
    }

    pub fn check(&self, strategy: &StrategyMetadata, lifecycle_state: LifecycleState) -> GateVerdict {
        match self.controller.current_mode() {
            SystemMode::ObserveOnly => GateVerdict::deny(
                GateLayer::Permission,
                "system mode is ObserveOnly, live execution is denied",
            ),
            SystemMode::Aggressive => {
                if lifecycle_state == LifecycleState::Active {
                    GateVerdict::Allow
                } else {
                    GateVerdict::deny(
                        GateLayer::Permission,
                        format!("strategy {} is not Active ({:?})", strategy.strategy_id, lifecycle_state),
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::controller::StartupCheck;
    use crate::strategy::{RiskProfile, StrategyType};

    fn strategy() -> StrategyMetadata {
        StrategyMetadata {
            strategy_id: "s1".to_string(),
            strategy_type: StrategyType::Momentum,
            risk_profile: RiskProfile::Balanced,
            regime_dependent: false,
        }
    }

    #[test]
    fn observe_only_denies_regardless_of_lifecycle_state() {
        let gate = PermissionGate::new(Arc::new(ModeController::new()));
        let verdict = gate.check(&strategy(), LifecycleState::Active);
        assert!(!verdict.is_allow());
    }

    #[test]
    fn aggressive_allows_active_strategy() {
        let controller = Arc::new(ModeController::new());
        controller
            .promote_to_aggressive(&[
                StartupCheck::ConfidenceGateReachable,
                StartupCheck::StorageBackendWritable,
                StartupCheck::AtLeastOnePoolInitialized,
            ])
            .unwrap();
        let gate = PermissionGate::new(controller);
        let verdict = gate.check(&strategy(), LifecycleState::Active);
        assert!(verdict.is_allow());
    }

    #[test]
    fn aggressive_denies_non_active_strategy() {
        let controller = Arc::new(ModeController::new());
        controller
            .promote_to_aggressive(&[
                StartupCheck::ConfidenceGateReachable,
                StartupCheck::StorageBackendWritable,
                StartupCheck::AtLeastOnePoolInitialized,
            ])
            .unwrap();
        let gate = PermissionGate::new(controller);
        let verdict = gate.check(&strategy(), LifecycleState::Probation);
        assert!(!verdict.is_allow());
    }
}
