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

//! Market-facing value types shared by the gate chain, the simulator, and
//! the venue adapter contract. Ingestion itself is out of scope; this
//! module only defines the shapes collaborators exchange.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading pair identifier, e.g. "BTC/USD".
pub type Symbol = String;

/// Side of a trade intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Best bid/ask/last snapshot for a symbol. This is the minimal shape the
/// simulator and the parity tracker need; it carries no venue identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ticker {
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// One OHLC bar for a symbol/interval pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OhlcBar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// A single leg of a venue order, used by [`crate::execution::VenueAdapter::add_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDescriptor {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
}

/// Errors surfaced by a market data source.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum MarketDataError {
    #[error("no data available for {0}")]
    NoData(Symbol),

    #[error("market data source unavailable: {0}")]
    Unavailable(String),
}

/// External collaborator interface: anything that can answer "what is the
/// market doing right now" for a symbol. Market-data ingestion proper
/// (exchange websockets, aggregation, caching) lives outside this crate;
/// only this narrow read contract is specified here because the simulated
/// execution adapter and the shadow tracker both depend on it.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn ticker(&self, symbol: &Symbol) -> Result<Ticker, MarketDataError>;
}

/// Fixed in-memory market data source for tests and CLI demos. Never
/// synthesizes a price for a symbol it wasn't given.
#[derive(Debug, Default, Clone)]
pub struct StaticMarketDataSource {
    tickers: std::collections::HashMap<Symbol, Ticker>,
}

impl StaticMarketDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticker(mut self, symbol: impl Into<Symbol>, ticker: Ticker) -> Self {
        self.tickers.insert(symbol.into(), ticker);
        self
    }

    pub fn set_ticker(&mut self, symbol: impl Into<Symbol>, ticker: Ticker) {
        self.tickers.insert(symbol.into(), ticker);
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketDataSource {
    async fn ticker(&self, symbol: &Symbol) -> Result<Ticker, MarketDataError> {
        self.tickers
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::NoData(symbol.clone()))
    }
}
