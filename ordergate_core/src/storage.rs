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

//! Durability backend for the event log, daily snapshots, and shadow
//! records (§4.12, §4.13). Mirrors the teacher's `StrategyStorage` split
//! between an in-memory dev backend and a durable production backend,
//! narrowed to the three append/read surfaces this crate actually needs:
//! JSON-Lines event append, one-snapshot-per-day storage, and JSON-Lines
//! shadow record append.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("snapshot already sealed for {0}")]
    SnapshotAlreadySealed(NaiveDate),

    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Durability contract for the append-only logs this crate produces.
/// Every method is append-or-read, never update-in-place — the event
/// log and shadow records are append-only by construction (§4.12), and a
/// sealed snapshot is immutable once written (§3 lifecycle).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn append_event_line(&self, line: String) -> Result<(), StorageError>;
    async fn read_event_lines(&self) -> Result<Vec<String>, StorageError>;

    async fn write_snapshot(&self, date: NaiveDate, json: String) -> Result<(), StorageError>;
    async fn read_snapshot(&self, date: NaiveDate) -> Result<Option<String>, StorageError>;
    async fn snapshot_dates(&self) -> Result<Vec<NaiveDate>, StorageError>;

    async fn append_shadow_record_line(&self, line: String) -> Result<(), StorageError>;
    async fn read_shadow_record_lines(&self) -> Result<Vec<String>, StorageError>;
}

/// Reference backend for tests and CLI demos. Not durable across
/// restarts — production deployments use [`PostgresStorageBackend`].
#[derive(Debug, Default)]
pub struct InMemoryStorageBackend {
    events: RwLock<Vec<String>>,
    snapshots: RwLock<HashMap<NaiveDate, String>>,
    shadow_records: RwLock<Vec<String>>,
}

impl InMemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorageBackend {
    async fn append_event_line(&self, line: String) -> Result<(), StorageError> {
        self.events.write().await.push(line);
        Ok(())
    }

    async fn read_event_lines(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.events.read().await.clone())
    }

    async fn write_snapshot(&self, date: NaiveDate, json: String) -> Result<(), StorageError> {
        let mut snapshots = self.snapshots.write().await;
        if snapshots.contains_key(&date) {
            return Err(StorageError::SnapshotAlreadySealed(date));
        }
        snapshots.insert(date, json);
        Ok(())
    }

    async fn read_snapshot(&self, date: NaiveDate) -> Result<Option<String>, StorageError> {
        Ok(self.snapshots.read().await.get(&date).cloned())
    }

    async fn snapshot_dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let mut dates: Vec<NaiveDate> = self.snapshots.read().await.keys().copied().collect();
        dates.sort();
        Ok(dates)
    }

    async fn append_shadow_record_line(&self, line: String) -> Result<(), StorageError> {
        self.shadow_records.write().await.push(line);
        Ok(())
    }

    async fn read_shadow_record_lines(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.shadow_records.read().await.clone())
    }
}

/// Production backend. Events and shadow records land in append-only
/// tables; snapshots in a table keyed by date with a uniqueness
/// constraint standing in for "sealed at creation".
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StorageError::Database("no database_url configured".to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        info!("connected to postgres storage backend");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ordergate_events (id BIGSERIAL PRIMARY KEY, line TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ordergate_snapshots (snapshot_date DATE PRIMARY KEY, body TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ordergate_shadow_records (id BIGSERIAL PRIMARY KEY, line TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn append_event_line(&self, line: String) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO ordergate_events (line) VALUES ($1)")
            .bind(line)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    async fn read_event_lines(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT line FROM ordergate_events ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|(line,)| line).collect())
    }

    async fn write_snapshot(&self, date: NaiveDate, json: String) -> Result<(), StorageError> {
        let result = sqlx::query(
            "INSERT INTO ordergate_snapshots (snapshot_date, body) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(date)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::SnapshotAlreadySealed(date));
        }
        Ok(())
    }

    async fn read_snapshot(&self, date: NaiveDate) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM ordergate_snapshots WHERE snapshot_date = $1")
                .bind(date)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(row.map(|(body,)| body))
    }

    async fn snapshot_dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let rows: Vec<(NaiveDate,)> =
            sqlx::query_as("SELECT snapshot_date FROM ordergate_snapshots ORDER BY snapshot_date")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    async fn append_shadow_record_line(&self, line: String) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO ordergate_shadow_records (line) VALUES ($1)")
            .bind(line)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    async fn read_shadow_record_lines(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT line FROM ordergate_shadow_records ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|(line,)| line).collect())
    }
}

/// Constructs the configured backend. Kept as a free function (rather
/// than a `From<StorageConfig>` impl) because Postgres construction is
/// fallibly async.
pub async fn build_storage_backend(
    config: &StorageConfig,
) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.storage_type {
        StorageType::Memory => {
            debug!("using in-memory storage backend");
            Ok(Arc::new(InMemoryStorageBackend::new()))
        }
        StorageType::Postgres => {
            let backend = PostgresStorageBackend::connect(config).await?;
            backend.run_migrations().await?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_backend_round_trips_events() {
        let backend = InMemoryStorageBackend::new();
        backend.append_event_line("{\"a\":1}".to_string()).await.unwrap();
        backend.append_event_line("{\"a\":2}".to_string()).await.unwrap();
        let lines = backend.read_event_lines().await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn snapshot_cannot_be_overwritten_once_sealed() {
        let backend = InMemoryStorageBackend::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        backend.write_snapshot(date, "{}".to_string()).await.unwrap();
        let err = backend.write_snapshot(date, "{}".to_string()).await.unwrap_err();
        assert!(matches!(err, StorageError::SnapshotAlreadySealed(_)));
    }
}
