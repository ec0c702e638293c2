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

//! Operator read-only HTTP surface. Every route here is side-effect-free
//! and never reaches a venue adapter — this module only ever reads from
//! the event log, storage backend, and in-process trackers.

pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::eventlog::EventLog;
use crate::health::SystemHealthMonitor;
use crate::mode::ModeController;
use crate::risk::RiskGovernor;
use crate::shadow::{ConfidenceGate, ShadowTracker};
use crate::storage::StorageBackend;

/// Shared read-only handles the operator API is built on. Nothing here
/// is `&mut` — handlers only ever call getter/query methods.
pub struct ApiState {
    pub event_log: Arc<dyn EventLog>,
    pub storage: Arc<dyn StorageBackend>,
    pub health_monitor: Arc<SystemHealthMonitor>,
    pub mode_controller: Arc<ModeController>,
    pub risk_governor: Arc<RiskGovernor>,
    pub shadow_tracker: Arc<ShadowTracker>,
    pub confidence_gate: Arc<ConfidenceGate>,
}

/// Builds the full operator router (§6 external interfaces).
pub fn create_api_router(state: Arc<ApiState>) -> Router {
    info!("creating operator API router");

    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/status", get(handlers::get_status))
        .route("/events", get(handlers::get_events))
        .route("/snapshots", get(handlers::get_snapshots))
        .route("/replay", get(handlers::get_replay))
        .route("/parity-summary", get(handlers::get_parity_summary))
        .route("/validation-status", get(handlers::get_validation_status))
        .with_state(state)
}
