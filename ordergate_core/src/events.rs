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

//! The event record shape (§3). Defined at the crate root, not under
//! `eventlog`, because every gate-chain component emits events and
//! `eventlog` itself must not become a dependency of `capital`, `regime`,
//! `mode`, or `risk`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gate::GateLayer;
use crate::strategy::StrategyId;

/// Closed set of event kinds. Anything the chain does that matters for
/// replay or audit becomes one of these, never a log line alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EventType {
    SignalGenerated,
    TradeBlocked,
    TradeExecuted,
    RegimeDetected,
    SystemModeChange,
    StrategyStateChange,
    RiskCheck,
    ConfidenceGateBlocked,
    CapitalUpdate,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Append-only record. `event_id` is assigned by the event log at
/// insertion time and is monotonically increasing; nothing upstream of
/// the log assigns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub strategy_id: Option<StrategyId>,
    pub account_id: Option<StrategyId>,
    pub reason: Option<String>,
    pub blocking_layer: Option<GateLayer>,
    pub metadata: HashMap<String, Value>,
}

/// Builder used by gate-chain components; `event_id` is filled in by the
/// log on append, so callers never have to guess it.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub event_type: EventType,
    pub strategy_id: Option<StrategyId>,
    pub account_id: Option<StrategyId>,
    pub reason: Option<String>,
    pub blocking_layer: Option<GateLayer>,
    pub metadata: HashMap<String, Value>,
}

impl EventDraft {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            strategy_id: None,
            account_id: None,
            reason: None,
            blocking_layer: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_strategy(mut self, strategy_id: impl Into<StrategyId>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    pub fn with_account(mut self, account_id: impl Into<StrategyId>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_blocking_layer(mut self, layer: GateLayer) -> Self {
        self.blocking_layer = Some(layer);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn into_event(self, event_id: u64, timestamp: DateTime<Utc>) -> Event {
        Event {
            event_id,
            timestamp,
            event_type: self.event_type,
            strategy_id: self.strategy_id,
            account_id: self.account_id,
            reason: self.reason,
            blocking_layer: self.blocking_layer,
            metadata: self.metadata,
        }
    }
}
