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

//! Self-contained in-memory environment the CLI wires up for its demo
//! commands. There is no long-lived daemon backing this binary — every
//! invocation builds a fresh governance stack, runs one scenario against
//! it, and prints the result. A real deployment would instead point the
//! CLI at a running process's storage backend and event log.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ordergate_core::arbitrage::{ArbitrageExecutor, ArbitrageExecutorConfig};
use ordergate_core::capital::{AccountManager, AllocatorConfig, CapitalAllocator, CapitalGate, CapitalPool, PoolKind};
use ordergate_core::eventlog::{InMemoryEventLog, ReplayEngine, ReplayResult};
use ordergate_core::execution::{ExecutionManager, ExecutionManagerDeps, SimulatedAdapterConfig, SimulatedExecutionAdapter};
use ordergate_core::execution::venue_adapter::NullVenueAdapter;
use ordergate_core::health::{AlertManager, HealthMonitorConfig, SystemHealthMonitor};
use ordergate_core::market::{StaticMarketDataSource, Ticker};
use ordergate_core::mode::{ModeController, PermissionGate};
use ordergate_core::regime::{RegimeDetector, RegimeGate, RuleBasedRegimeDetector, RuleBasedRegimeDetectorConfig};
use ordergate_core::risk::{RiskGovernor, RiskGovernorConfig};
use ordergate_core::shadow::{ConfidenceGate, ConfidenceGateConfig, ShadowTracker, ShadowTrackerConfig};
use ordergate_core::strategy::{InMemoryStrategyRegistry, RiskProfile, StrategyMetadata, StrategyType};
use ordergate_core::{EventLog, RuntimeTracker};
use rust_decimal_macros::dec;

/// Everything a CLI demo scenario needs. Each field is an `Arc` to the
/// same object the [`ExecutionManager`] was built from, so commands can
/// both drive the manager and inspect its collaborators afterward.
pub struct DemoEnvironment {
    pub execution_manager: Arc<ExecutionManager>,
    pub arbitrage_executor: Arc<ArbitrageExecutor>,
    pub event_log: Arc<dyn EventLog>,
    pub mode_controller: Arc<ModeController>,
    pub risk_governor: Arc<RiskGovernor>,
    pub shadow_tracker: Arc<ShadowTracker>,
    pub confidence_gate: Arc<ConfidenceGate>,
    pub health_monitor: Arc<SystemHealthMonitor>,
    pub pool: Arc<CapitalPool>,
    pub accounts: Arc<AccountManager>,
}

/// Builds a demo environment with one pre-registered momentum strategy
/// (`demo-strategy`, Directional pool, fully allocated) and a static
/// BTC/USD ticker, matching the wiring the core crate's own tests use.
pub fn build_demo_environment() -> DemoEnvironment {
    let registry = Arc::new(InMemoryStrategyRegistry::new());
    registry.register(StrategyMetadata {
        strategy_id: "demo-strategy".to_string(),
        strategy_type: StrategyType::Momentum,
        risk_profile: RiskProfile::Balanced,
        regime_dependent: false,
    });

    let accounts = Arc::new(AccountManager::new());
    let pool = Arc::new(CapitalPool::new(PoolKind::Directional, dec!(100_000), dec!(20)));
    let arbitrage_pool = Arc::new(CapitalPool::new(PoolKind::Arbitrage, dec!(100_000), dec!(20)));
    let allocator = CapitalAllocator::new(AllocatorConfig::default(), registry.clone(), accounts.clone());
    allocator.allocate(&"demo-strategy".to_string(), &pool, dec!(100_000), 0, None);

    let capital_gate = Arc::new(CapitalGate::new(accounts.clone()));

    let detector: Arc<dyn RegimeDetector> =
        Arc::new(RuleBasedRegimeDetector::new(RuleBasedRegimeDetectorConfig::default()));
    let regime_gate = Arc::new(RegimeGate::new(detector.clone(), 0.6));

    let mode_controller = Arc::new(ModeController::new());
    let permission_gate = Arc::new(PermissionGate::new(mode_controller.clone()));

    let risk_governor = Arc::new(RiskGovernor::new(RiskGovernorConfig::default()));

    let market = Arc::new(
        StaticMarketDataSource::new().with_ticker(
            "BTC/USD",
            Ticker { bid: dec!(100), ask: dec!(100.1), last: dec!(100.05), timestamp: Utc::now() },
        ),
    );
    let market_dyn: Arc<dyn ordergate_core::market::MarketDataSource> = market;

    let simulated_adapter =
        Arc::new(SimulatedExecutionAdapter::new(SimulatedAdapterConfig::default(), market_dyn.clone()));

    let shadow_tracker = Arc::new(ShadowTracker::new(
        ShadowTrackerConfig { observation_window: Duration::from_millis(5), sample_interval: Duration::from_millis(5) },
        market_dyn,
        None,
    ));
    let runtime_tracker = Arc::new(RuntimeTracker::new());
    let confidence_gate = Arc::new(ConfidenceGate::new(
        ConfidenceGateConfig::default(),
        shadow_tracker.clone(),
        runtime_tracker.clone(),
    ));

    let event_log: Arc<dyn EventLog> = Arc::new(InMemoryEventLog::new());
    let alert_manager = Arc::new(AlertManager::new());
    let health_monitor = Arc::new(SystemHealthMonitor::new(HealthMonitorConfig::default()));

    let deps = ExecutionManagerDeps {
        registry,
        accounts: accounts.clone(),
        capital_gate,
        directional_pool: pool.clone(),
        arbitrage_pool,
        regime_gate,
        regime_detector: detector,
        permission_gate,
        risk_governor: risk_governor.clone(),
        confidence_gate: confidence_gate.clone(),
        event_log: event_log.clone(),
        venue_adapter: Arc::new(NullVenueAdapter),
        simulated_adapter,
        shadow_tracker: shadow_tracker.clone(),
        runtime_tracker,
        alert_manager: alert_manager.clone(),
    };

    let execution_manager = Arc::new(ExecutionManager::new(deps));
    let arbitrage_executor = Arc::new(ArbitrageExecutor::new(
        ArbitrageExecutorConfig::default(),
        execution_manager.clone(),
        alert_manager,
    ));

    DemoEnvironment {
        execution_manager,
        arbitrage_executor,
        event_log,
        mode_controller,
        risk_governor,
        shadow_tracker,
        confidence_gate,
        health_monitor,
        pool,
        accounts,
    }
}

/// Replays every event currently in `event_log` for `date` against
/// whatever snapshot (if any) was generated for it. Demo-only: a real
/// deployment replays from durable storage, not an in-memory log.
pub async fn replay_date(event_log: &Arc<dyn EventLog>, date: chrono::NaiveDate) -> ReplayResult {
    let events = event_log.get_for_day(date).await;
    ReplayEngine::replay_day(date, &events, None)
}
