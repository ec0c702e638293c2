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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::market::Symbol;

/// Categorical classification of market state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Favorable,
    Unfavorable,
    Unknown,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Favorable => write!(f, "FAVORABLE"),
            Regime::Unfavorable => write!(f, "UNFAVORABLE"),
            Regime::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeVerdict {
    pub regime: Regime,
    pub confidence: f64,
    pub symbol: Symbol,
    pub timestamp: DateTime<Utc>,
}

impl RegimeVerdict {
    pub fn new(regime: Regime, confidence: f64, symbol: impl Into<Symbol>) -> Self {
        Self {
            regime,
            confidence: confidence.clamp(0.0, 1.0),
            symbol: symbol.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn unknown(symbol: impl Into<Symbol>) -> Self {
        Self::new(Regime::Unknown, 0.0, symbol)
    }
}

/// Classifies market state for a symbol. Internal mechanism is
/// deliberately unspecified; only this contract is binding.
#[async_trait]
pub trait RegimeDetector: Send + Sync {
    async fn current_regime(&self, symbol: &Symbol) -> RegimeVerdict;
}
