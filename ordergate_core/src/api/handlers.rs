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

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiState;
use crate::eventlog::replay::ReplayEngine;
use crate::eventlog::EventFilter;
use crate::events::EventType;
use crate::mode::SystemMode;

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid date in `{field}`: {value}")))
}

/// `GET /health` — healthy, uptime, freshness. Reads the lock-free
/// [`crate::health::HealthSnapshot`]; never blocks behind pipeline
/// activity.
pub async fn get_health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.health_monitor.snapshot();
    Json(json!({
        "healthy": snapshot.healthy,
        "uptime_secs": snapshot.uptime.as_secs(),
        "errors_last_minute": snapshot.errors_last_minute,
        "last_market_data_at": snapshot.last_market_data_at,
        "last_event_log_write_at": snapshot.last_event_log_write_at,
        "execution_queue_status": snapshot.execution_queue_status,
        "memory_bytes": snapshot.memory_bytes,
    }))
}

/// `GET /status` — mode, risk-state, trading-allowed.
pub async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let mode = state.mode_controller.current_mode();
    let paused = state.risk_governor.paused_strategies();
    let risk_state = if paused.is_empty() { "normal" } else { "paused" };
    let healthy = state.health_monitor.snapshot().healthy;
    let trading_allowed = mode == SystemMode::Aggressive && healthy;

    Json(json!({
        "mode": mode,
        "risk_state": risk_state,
        "paused_strategies": paused,
        "trading_allowed": trading_allowed,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub strategy: Option<String>,
    pub account: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// `GET /events?type&strategy&account&from&to&limit`.
pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let filter = EventFilter {
        event_type: query.event_type,
        strategy_id: query.strategy,
        account_id: query.account,
        from: query.from,
        to: query.to,
    };

    let mut events = state.event_log.filter(&filter).await;
    if let Some(limit) = query.limit {
        events.truncate(limit);
    }

    Json(json!({ "events": events, "count": events.len() }))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub date: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    fn resolve(&self) -> Result<Vec<NaiveDate>, ApiError> {
        if let Some(date) = &self.date {
            return Ok(vec![parse_date("date", date)?]);
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            let start = parse_date("startDate", start)?;
            let end = parse_date("endDate", end)?;
            if end < start {
                return Err(ApiError::BadRequest("endDate precedes startDate".to_string()));
            }
            let mut dates = Vec::new();
            let mut cursor = start;
            while cursor <= end {
                dates.push(cursor);
                cursor += chrono::Duration::days(1);
            }
            return Ok(dates);
        }
        Err(ApiError::BadRequest("must supply `date` or `startDate`+`endDate`".to_string()))
    }
}

/// `GET /snapshots?date` or `?startDate&endDate`.
pub async fn get_snapshots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dates = query.resolve()?;
    let mut snapshots = Vec::new();
    for date in dates {
        let raw = state
            .storage
            .read_snapshot(date)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if let Some(body) = raw {
            let parsed = serde_json::from_str::<serde_json::Value>(&body)
                .unwrap_or_else(|_| serde_json::Value::String(body));
            snapshots.push(parsed);
        }
    }
    Ok(Json(json!({ "snapshots": snapshots, "count": snapshots.len() })))
}

/// `GET /replay?date` or `?startDate&endDate`. Pure reconstruction from
/// the event stream; never reads `now`, never touches an adapter.
pub async fn get_replay(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dates = query.resolve()?;
    let mut results = Vec::new();
    for date in dates {
        let events = state.event_log.get_for_day(date).await;
        let snapshot_json = state
            .storage
            .read_snapshot(date)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let snapshot = snapshot_json.and_then(|s| serde_json::from_str(&s).ok());
        results.push(ReplayEngine::replay_day(date, &events, snapshot.as_ref()));
    }
    Ok(Json(json!({ "replays": results })))
}

/// `GET /parity-summary` — shadow-vs-real parity evidence accumulated so
/// far, the same figures the Confidence Gate reads.
pub async fn get_parity_summary(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let parity = state.shadow_tracker.average_parity();
    let regime_counts = state.shadow_tracker.regime_counts();
    Json(json!({
        "shadow_trade_count": state.shadow_tracker.trade_count(),
        "regime_counts": regime_counts,
        "average_slippage_delta": parity.slippage_delta,
        "average_fill_rate_delta": parity.fill_rate_delta,
        "average_latency_delta": parity.latency_delta,
    }))
}

/// `GET /validation-status` — the Confidence Gate's current verdict,
/// without enforcing it (this surface is read-only by construction).
pub async fn get_validation_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(state.confidence_gate.check())
}
