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

//! Execution Manager & adapter boundary (§4.8-§4.10). Owns the sum type
//! over execution modes so dispatch is a `match`, never a branch on a
//! string (§9 design note): there is no implicit default mode and no
//! "uninitialized" state that silently behaves like one of the three.

pub mod manager;
pub mod simulated;
pub mod venue_adapter;

pub use manager::{ExecutionManager, ExecutionManagerDeps};
pub use simulated::{SimulatedAdapterConfig, SimulatedExecutionAdapter, SlippageModel};
pub use venue_adapter::{NullVenueAdapter, VenueAdapter, VenueError};

use serde::{Deserialize, Serialize};

/// Which path a trade intent is routed through. The Execution Manager
/// dispatches on this rather than branching on strategy configuration,
/// per the §9 design note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Live venue adapter. Hard-blocked by the Confidence Gate and
    /// subject to the Permission Gate.
    Real,
    /// High-fidelity simulator, isolated from the live book.
    Simulation,
    /// Simulator plus parity recording for confidence-gate evidence.
    Shadow,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Real => write!(f, "real"),
            ExecutionMode::Simulation => write!(f, "simulation"),
            ExecutionMode::Shadow => write!(f, "shadow"),
        }
    }
}
