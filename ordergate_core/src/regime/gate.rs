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
use crate::regime::detector::{Regime, RegimeDetector};
use crate::strategy::StrategyMetadata;

/// Second gate in the chain. Strategies not marked `regime_dependent`
/// pass through unconditionally — the regime call is only binding on
/// strategies that opted into it.
pub struct RegimeGate {
    detector: Arc<dyn RegimeDetector>,
    min_regime_confidence: f64,
}

impl RegimeGate {
    pub fn new(detector: Arc<dyn RegimeDetector>, min_regime_confidence: f64) -> Self {
        Self {
            detector,
            min_regime_confidence,
        }
    }

    pub async fn check(&self, strategy: &StrategyMetadata, symbol: &str) -> GateVerdict {
        if !strategy.regime_dependent {
            return GateVerdict::Allow;
        }

        let verdict = self.detector.current_regime(&symbol.to_string()).await;

        if verdict.regime != Regime::Favorable {
            return GateVerdict::deny(
                GateLayer::Regime,
                format!("regime is {} for {}", verdict.regime, symbol),
            );
        }

        if verdict.confidence < self.min_regime_confidence {
            return GateVerdict::deny(
                GateLayer::Regime,
                format!(
                    "regime confidence {:.2} below minimum {:.2}",
                    verdict.confidence, self.min_regime_confidence
                ),
            );
        }

        GateVerdict::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::rule_based::{RuleBasedRegimeDetector, RuleBasedRegimeDetectorConfig};
    use crate::strategy::{RiskProfile, StrategyType};

    fn strategy(regime_dependent: bool) -> StrategyMetadata {
        StrategyMetadata {
            strategy_id: "s1".to_string(),
            strategy_type: StrategyType::Momentum,
            risk_profile: RiskProfile::Balanced,
            regime_dependent,
        }
    }

    #[tokio::test]
    async fn non_regime_dependent_strategy_always_passes() {
        let detector = Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
        let gate = RegimeGate::new(detector, 0.6);
        let verdict = gate.check(&strategy(false), "BTC/USD").await;
        assert!(verdict.is_allow());
    }

    #[tokio::test]
    async fn unknown_regime_denies_dependent_strategy() {
        let detector = Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
        let gate = RegimeGate::new(detector, 0.6);
        let verdict = gate.check(&strategy(true), "BTC/USD").await;
        assert!(!verdict.is_allow());
    }

    #[tokio::test]
    async fn low_confidence_favorable_regime_still_denies() {
        let detector = Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
        detector.push_observation("BTC/USD", 0.16, 0.1);
        let gate = RegimeGate::new(detector.clone(), 0.95);
        let verdict = gate.check(&strategy(true), "BTC/USD").await;
        assert!(!verdict.is_allow());
    }

    #[tokio::test]
    async fn favorable_high_confidence_allows() {
        let detector = Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
        detector.push_observation("BTC/USD", 0.9, 0.05);
        let gate = RegimeGate::new(detector, 0.6);
        let verdict = gate.check(&strategy(true), "BTC/USD").await;
        assert!(verdict.is_allow());
    }
}
