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

//! Common gate verdict shared by every layer of the chain. A tagged
//! Allow/Deny value, never an exception, so the mainline stays total and
//! auditable (design note in §9).

use serde::{Deserialize, Serialize};

/// Which layer of the chain produced a denial. Mirrors the closed set of
/// `blockingLayer` labels the event log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateLayer {
    Capital,
    Regime,
    Permission,
    Risk,
    ConfidenceGate,
}

impl std::fmt::Display for GateLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GateLayer::Capital => "CAPITAL",
            GateLayer::Regime => "REGIME",
            GateLayer::Permission => "PERMISSION",
            GateLayer::Risk => "RISK",
            GateLayer::ConfidenceGate => "CONFIDENCE_GATE",
        };
        write!(f, "{s}")
    }
}

/// Verdict returned by every gate. `Allow` carries no payload; denial
/// carries a human reason plus the layer, which the Execution Manager
/// stamps onto the `TradeBlocked` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GateVerdict {
    Allow,
    Deny { layer: GateLayer, reason: String },
}

impl GateVerdict {
    pub fn deny(layer: GateLayer, reason: impl Into<String>) -> Self {
        GateVerdict::Deny {
            layer,
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, GateVerdict::Allow)
    }
}
