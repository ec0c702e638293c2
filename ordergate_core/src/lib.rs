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

//! Governance pipeline core.
//!
//! A trade intent from a strategy passes through a fixed gate chain
//! (Capital, Regime, Permission, Risk, Confidence) before it is allowed
//! to reach a live venue. Every decision the chain makes — allow, deny,
//! mode change, capital update — is recorded to an append-only event
//! log, from which daily snapshots are sealed and the full system state
//! can be replayed. Strategies earn the right to trade for real by
//! accumulating evidence in shadow execution first.

pub mod api;
pub mod arbitrage;
pub mod capital;
pub mod config;
pub mod error;
pub mod events;
pub mod eventlog;
pub mod execution;
pub mod gate;
pub mod health;
pub mod market;
pub mod mode;
pub mod regime;
pub mod risk;
pub mod runtime_tracker;
pub mod shadow;
pub mod storage;
pub mod strategy;

pub use error::GovernanceError;
pub use events::{Event, EventDraft, EventType};
pub use gate::{GateLayer, GateVerdict};
pub use market::{MarketDataSource, Side, Symbol, Ticker};
pub use runtime_tracker::RuntimeTracker;
pub use strategy::{LifecycleState, RiskProfile, StrategyId, StrategyRegistry, StrategyType, TradeIntent, TradeOutcome};

pub use arbitrage::{ArbitrageExecutor, ArbitrageExecutorConfig, ArbitrageSignal};
pub use capital::{AccountManager, CapitalAllocator, CapitalGate, CapitalPool, PoolKind};
pub use eventlog::{EventLog, ReplayEngine, ReplayResult};
pub use execution::{ExecutionManager, ExecutionManagerDeps, ExecutionMode};
pub use health::{AlertManager, HealthMonitorConfig, SystemHealthMonitor};
pub use mode::{ModeController, PermissionGate, SystemMode};
pub use regime::{Regime, RegimeDetector, RegimeGate};
pub use risk::RiskGovernor;
pub use shadow::{ConfidenceGate, ShadowTracker};
pub use storage::{StorageBackend, StorageConfig};
