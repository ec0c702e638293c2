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

//! Venue Adapter (§4.9): external collaborator interface. This crate
//! ships no venue-specific HTTP client, authentication, nonce, or
//! request-signing logic — that is explicitly out of scope (§1). Only
//! the contract collaborators must implement is specified here, plus a
//! [`NullVenueAdapter`] test double for wiring tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::{OhlcBar, OrderDescriptor, Symbol, Ticker};
use crate::strategy::TradeOutcome;

/// Structured failures a venue adapter may surface. Never
/// exceptions-as-control-flow (§4.9): every failure mode the adapter can
/// hit becomes one of these variants, which the Execution Manager turns
/// into a [`TradeOutcome`] rather than propagating a panic or raw string.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum VenueError {
    #[error("transient venue error: {0}")]
    Transient(String),

    #[error("permanent venue error: {0}")]
    Permanent(String),

    #[error("venue call exceeded deadline of {0:?}")]
    Timeout(Duration),
}

/// All operations are potentially blocking on network I/O and must be
/// cancellable with a deadline (§4.9) — every method here takes one
/// explicitly rather than relying on a caller-side timeout wrapper, so
/// implementations can cancel in-flight venue requests, not just stop
/// waiting on them.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    async fn buy(
        &self,
        symbol: &Symbol,
        qty: Decimal,
        price: Option<Decimal>,
        deadline: Duration,
    ) -> Result<TradeOutcome, VenueError>;

    async fn sell(
        &self,
        symbol: &Symbol,
        qty: Decimal,
        price: Option<Decimal>,
        deadline: Duration,
    ) -> Result<TradeOutcome, VenueError>;

    async fn add_order(&self, descriptor: OrderDescriptor, deadline: Duration) -> Result<TradeOutcome, VenueError>;

    async fn ticker(&self, symbol: &Symbol, deadline: Duration) -> Result<Ticker, VenueError>;

    async fn ticker_info(
        &self,
        symbols: &[Symbol],
        deadline: Duration,
    ) -> Result<HashMap<Symbol, Ticker>, VenueError>;

    async fn ohlc(&self, symbol: &Symbol, interval: &str, deadline: Duration) -> Result<Vec<OhlcBar>, VenueError>;

    async fn balance(&self, deadline: Duration) -> Result<Decimal, VenueError>;
}

/// Test double standing in for a venue-specific client. Every order
/// method returns a permanent "not wired" failure so a test that
/// reaches the real adapter by mistake fails loudly instead of
/// silently succeeding.
#[derive(Debug, Default)]
pub struct NullVenueAdapter;

#[async_trait]
impl VenueAdapter for NullVenueAdapter {
    async fn buy(&self, _: &Symbol, _: Decimal, _: Option<Decimal>, _: Duration) -> Result<TradeOutcome, VenueError> {
        Err(VenueError::Permanent("NullVenueAdapter has no venue wired".to_string()))
    }

    async fn sell(&self, _: &Symbol, _: Decimal, _: Option<Decimal>, _: Duration) -> Result<TradeOutcome, VenueError> {
        Err(VenueError::Permanent("NullVenueAdapter has no venue wired".to_string()))
    }

    async fn add_order(&self, _: OrderDescriptor, _: Duration) -> Result<TradeOutcome, VenueError> {
        Err(VenueError::Permanent("NullVenueAdapter has no venue wired".to_string()))
    }

    async fn ticker(&self, symbol: &Symbol, _: Duration) -> Result<Ticker, VenueError> {
        Err(VenueError::Permanent(format!("no ticker for {symbol}")))
    }

    async fn ticker_info(&self, _: &[Symbol], _: Duration) -> Result<HashMap<Symbol, Ticker>, VenueError> {
        Ok(HashMap::new())
    }

    async fn ohlc(&self, _: &Symbol, _: &str, _: Duration) -> Result<Vec<OhlcBar>, VenueError> {
        Ok(Vec::new())
    }

    async fn balance(&self, _: Duration) -> Result<Decimal, VenueError> {
        Ok(Decimal::ZERO)
    }
}
