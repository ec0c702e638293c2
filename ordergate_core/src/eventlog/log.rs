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

//! Append-only event log. Exposes only `append` and read queries — there
//! is no update or delete anywhere in this module, by construction
//! rather than by convention (§9 design note).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::events::{Event, EventDraft, EventType};
use crate::storage::StorageBackend;
use crate::strategy::StrategyId;

/// Filter predicate for [`EventLog::filter`]. Every field is optional and
/// conjunctive — an absent field matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub strategy_id: Option<StrategyId>,
    pub account_id: Option<StrategyId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventFilter {
    fn matches(&self, event: &Event) -> bool {
        if let Some(t) = self.event_type {
            if event.event_type != t {
                return false;
            }
        }
        if let Some(sid) = &self.strategy_id {
            if event.strategy_id.as_ref() != Some(sid) {
                return false;
            }
        }
        if let Some(aid) = &self.account_id {
            if event.account_id.as_ref() != Some(aid) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if event.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Append-only contract (§4.12). `append` is the only mutator; every
/// other method is a read query over a consistent prefix.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, draft: EventDraft) -> Event;
    async fn get_all(&self) -> Vec<Event>;
    async fn get_for_day(&self, date: NaiveDate) -> Vec<Event>;
    async fn filter(&self, filter: &EventFilter) -> Vec<Event>;
}

struct LogState {
    events: Vec<Event>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Reference implementation: not durable across restarts, used by tests
/// and CLI demos, and as the read-path cache inside
/// [`PersistedEventLog`]. The monotonic `event_id` comes from a single
/// `AtomicU64`, the single serialization point §5 requires.
pub struct InMemoryEventLog {
    counter: AtomicU64,
    state: Mutex<LogState>,
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            state: Mutex::new(LogState {
                events: Vec::new(),
                last_timestamp: None,
            }),
        }
    }

    /// Stamps and stores the event, returning the sealed copy. Kept
    /// synchronous and lock-scoped so the timestamp-monotonicity
    /// invariant holds without an `.await` held across the guard.
    fn append_sync(&self, draft: EventDraft) -> Event {
        let event_id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock();
        let now = Utc::now();
        let timestamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        state.last_timestamp = Some(timestamp);
        let event = draft.into_event(event_id, timestamp);
        state.events.push(event.clone());
        event
    }

    fn snapshot(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, draft: EventDraft) -> Event {
        self.append_sync(draft)
    }

    async fn get_all(&self) -> Vec<Event> {
        self.snapshot()
    }

    async fn get_for_day(&self, date: NaiveDate) -> Vec<Event> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.timestamp.date_naive() == date)
            .collect()
    }

    async fn filter(&self, filter: &EventFilter) -> Vec<Event> {
        self.snapshot()
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect()
    }
}

/// Durable event log: write-through to a [`StorageBackend`] as
/// newline-delimited JSON (§6), backed by an in-memory cache for the
/// read path so queries never block on storage I/O.
pub struct PersistedEventLog {
    cache: InMemoryEventLog,
    backend: Arc<dyn StorageBackend>,
}

impl PersistedEventLog {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            cache: InMemoryEventLog::new(),
            backend,
        }
    }

    /// Rehydrates the in-memory cache from durable storage at startup.
    /// Returns the number of events loaded.
    pub async fn load_from_storage(&self) -> Result<usize, crate::storage::StorageError> {
        let lines = self.backend.read_event_lines().await?;
        let mut state = self.cache.state.lock();
        let mut max_id = 0u64;
        for line in &lines {
            if let Ok(event) = serde_json::from_str::<Event>(line) {
                max_id = max_id.max(event.event_id);
                state.last_timestamp = Some(match state.last_timestamp {
                    Some(last) if last > event.timestamp => last,
                    _ => event.timestamp,
                });
                state.events.push(event);
            }
        }
        self.cache.counter.fetch_max(max_id, Ordering::SeqCst);
        Ok(lines.len())
    }
}

#[async_trait]
impl EventLog for PersistedEventLog {
    async fn append(&self, draft: EventDraft) -> Event {
        let event = self.cache.append_sync(draft);
        let line = serde_json::to_string(&event).expect("Event serialization is infallible");
        if let Err(err) = self.backend.append_event_line(line).await {
            tracing::error!(error = %err, event_id = event.event_id, "failed to durably persist event");
        }
        event
    }

    async fn get_all(&self) -> Vec<Event> {
        self.cache.get_all().await
    }

    async fn get_for_day(&self, date: NaiveDate) -> Vec<Event> {
        self.cache.get_for_day(date).await
    }

    async fn filter(&self, filter: &EventFilter) -> Vec<Event> {
        self.cache.filter(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateLayer;

    #[tokio::test]
    async fn event_ids_are_monotonically_increasing() {
        let log = InMemoryEventLog::new();
        let e1 = log.append(EventDraft::new(EventType::SignalGenerated)).await;
        let e2 = log.append(EventDraft::new(EventType::TradeExecuted)).await;
        assert!(e1.event_id < e2.event_id);
        assert!(e1.timestamp <= e2.timestamp);
    }

    #[tokio::test]
    async fn filter_by_type_and_strategy() {
        let log = InMemoryEventLog::new();
        log.append(EventDraft::new(EventType::SignalGenerated).with_strategy("s1")).await;
        log.append(
            EventDraft::new(EventType::TradeBlocked)
                .with_strategy("s1")
                .with_blocking_layer(GateLayer::Capital),
        )
        .await;
        log.append(EventDraft::new(EventType::TradeBlocked).with_strategy("s2")).await;

        let filtered = log
            .filter(&EventFilter {
                event_type: Some(EventType::TradeBlocked),
                strategy_id: Some("s1".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn persisted_log_writes_through_and_reloads() {
        let backend: Arc<dyn StorageBackend> = Arc::new(crate::storage::InMemoryStorageBackend::new());
        let log = PersistedEventLog::new(backend.clone());
        log.append(EventDraft::new(EventType::SignalGenerated).with_strategy("s1")).await;
        log.append(EventDraft::new(EventType::TradeExecuted).with_strategy("s1")).await;

        let reloaded = PersistedEventLog::new(backend);
        let count = reloaded.load_from_storage().await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(reloaded.get_all().await.len(), 2);
    }
}
