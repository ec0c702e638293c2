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

//! System Health Monitor (§4.15). Read-only and cheap: every public
//! accessor is a lock-free snapshot read off an [`arc_swap::ArcSwap`],
//! never a computation that could itself stall. The healthy signal folds
//! four independent freshness/rate checks; any one failing flips the
//! whole snapshot unhealthy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionQueueStatus {
    Idle,
    Processing,
    Stalled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthMonitorConfig {
    pub max_errors_per_minute: u64,
    pub market_data_freshness: Duration,
    pub event_log_freshness: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            max_errors_per_minute: 10,
            market_data_freshness: Duration::from_secs(5 * 60),
            event_log_freshness: Duration::from_secs(10 * 60),
        }
    }
}

/// Point-in-time read-only view. Cloned out of the monitor's
/// [`ArcSwap`] on every read so callers never block a writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub uptime: Duration,
    pub errors_last_minute: u64,
    pub last_market_data_at: Option<DateTime<Utc>>,
    pub last_event_log_write_at: Option<DateTime<Utc>>,
    pub execution_queue_status: ExecutionQueueStatus,
    pub memory_bytes: u64,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            healthy: true,
            uptime: Duration::ZERO,
            errors_last_minute: 0,
            last_market_data_at: None,
            last_event_log_write_at: None,
            execution_queue_status: ExecutionQueueStatus::Idle,
            memory_bytes: 0,
        }
    }
}

struct ErrorWindow {
    timestamps: Vec<DateTime<Utc>>,
}

/// Single-writer, lock-free-read health view (§5). Only the monitor's
/// own background loop calls [`SystemHealthMonitor::record_error`] and
/// the `record_*` setters; every other caller only reads
/// [`SystemHealthMonitor::snapshot`].
pub struct SystemHealthMonitor {
    config: HealthMonitorConfig,
    started_at: DateTime<Utc>,
    snapshot: ArcSwap<HealthSnapshot>,
    errors: parking_lot::Mutex<ErrorWindow>,
    memory_bytes: AtomicU64,
}

impl SystemHealthMonitor {
    pub fn new(config: HealthMonitorConfig) -> Self {
        Self {
            config,
            started_at: Utc::now(),
            snapshot: ArcSwap::from_pointee(HealthSnapshot::default()),
            errors: parking_lot::Mutex::new(ErrorWindow { timestamps: Vec::new() }),
            memory_bytes: AtomicU64::new(0),
        }
    }

    pub fn record_error(&self) {
        let mut window = self.errors.lock();
        window.timestamps.push(Utc::now());
        self.recompute();
    }

    pub fn record_market_data_tick(&self, at: DateTime<Utc>) {
        let mut next = (**self.snapshot.load()).clone();
        next.last_market_data_at = Some(at);
        self.snapshot.store(Arc::new(next));
        self.recompute();
    }

    pub fn record_event_log_write(&self, at: DateTime<Utc>) {
        let mut next = (**self.snapshot.load()).clone();
        next.last_event_log_write_at = Some(at);
        self.snapshot.store(Arc::new(next));
        self.recompute();
    }

    pub fn record_execution_queue_status(&self, status: ExecutionQueueStatus) {
        let mut next = (**self.snapshot.load()).clone();
        next.execution_queue_status = status;
        self.snapshot.store(Arc::new(next));
        self.recompute();
    }

    pub fn record_memory_bytes(&self, bytes: u64) {
        self.memory_bytes.store(bytes, Ordering::Relaxed);
        self.recompute();
    }

    fn recompute(&self) {
        let now = Utc::now();
        let errors_last_minute = {
            let mut window = self.errors.lock();
            window.timestamps.retain(|t| now - *t <= chrono::Duration::minutes(1));
            window.timestamps.len() as u64
        };

        let prior = self.snapshot.load();
        let market_data_fresh = prior
            .last_market_data_at
            .map(|t| (now - t).to_std().unwrap_or(Duration::MAX) < self.config.market_data_freshness)
            .unwrap_or(true);
        let event_log_fresh = prior
            .last_event_log_write_at
            .map(|t| (now - t).to_std().unwrap_or(Duration::MAX) < self.config.event_log_freshness)
            .unwrap_or(true);
        let queue_ok = prior.execution_queue_status != ExecutionQueueStatus::Stalled;
        let error_rate_ok = errors_last_minute < self.config.max_errors_per_minute;

        let healthy = market_data_fresh && event_log_fresh && queue_ok && error_rate_ok;

        let next = HealthSnapshot {
            healthy,
            uptime: (now - self.started_at).to_std().unwrap_or(Duration::ZERO),
            errors_last_minute,
            last_market_data_at: prior.last_market_data_at,
            last_event_log_write_at: prior.last_event_log_write_at,
            execution_queue_status: prior.execution_queue_status,
            memory_bytes: self.memory_bytes.load(Ordering::Relaxed),
        };
        self.snapshot.store(Arc::new(next));
    }

    /// Read-only, cheap (§4.15). Never reaches an adapter.
    pub fn snapshot(&self) -> HealthSnapshot {
        self.recompute();
        (**self.snapshot.load()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_healthy_with_no_observations() {
        let monitor = SystemHealthMonitor::new(HealthMonitorConfig::default());
        assert!(monitor.snapshot().healthy);
    }

    #[test]
    fn stalled_queue_flips_unhealthy() {
        let monitor = SystemHealthMonitor::new(HealthMonitorConfig::default());
        monitor.record_execution_queue_status(ExecutionQueueStatus::Stalled);
        assert!(!monitor.snapshot().healthy);
    }

    #[test]
    fn excessive_error_rate_flips_unhealthy() {
        let mut config = HealthMonitorConfig::default();
        config.max_errors_per_minute = 2;
        let monitor = SystemHealthMonitor::new(config);
        monitor.record_error();
        monitor.record_error();
        monitor.record_error();
        assert!(!monitor.snapshot().healthy);
    }

    #[test]
    fn stale_market_data_flips_unhealthy() {
        let mut config = HealthMonitorConfig::default();
        config.market_data_freshness = Duration::from_secs(1);
        let monitor = SystemHealthMonitor::new(config);
        monitor.record_market_data_tick(Utc::now() - chrono::Duration::seconds(10));
        assert!(!monitor.snapshot().healthy);
    }
}
