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

//! Crate-wide error categories (§7). Gate denials never reach here — they
//! are structured [`crate::gate::GateVerdict`] values, not errors. This
//! enum is for the handful of cases that are genuinely exceptional:
//! malformed input, adapter faults, and invariant violations.

use thiserror::Error;

/// Top-level error surfaced by components that can fail outright, as
/// opposed to producing a structured denial. Gate denials and blocked
/// outcomes are values, not this type; `GovernanceError` is for the
/// error categories in §7 that abort a task or require operator
/// attention rather than flowing back to the caller as a trade outcome.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("malformed trade intent: {0}")]
    InputInvalid(String),

    #[error("adapter transient failure: {0}")]
    AdapterTransient(String),

    #[error("adapter permanent failure: {0}")]
    AdapterPermanent(String),

    #[error("no market data available for {0}")]
    NoMarketData(String),

    #[error("per-intent deadline elapsed after {0:?}")]
    Timeout(std::time::Duration),

    #[error("confidence gate blocks live execution: {0}")]
    ConfidenceGate(String),

    #[error("capital integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    #[error("storage backend error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}
