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

//! Regime Detector & Regime Gate (§4.5). The detector's internal
//! mechanism is deliberately unspecified by the governance contract —
//! only the verdict shape is contractual — so this module ships one
//! concrete rule-based implementation behind the `RegimeDetector` trait
//! and keeps the door open for others (e.g. an HMM-based detector).

pub mod detector;
pub mod gate;
pub mod rule_based;

pub use detector::{Regime, RegimeDetector, RegimeVerdict};
pub use gate::RegimeGate;
pub use rule_based::{RuleBasedRegimeDetector, RuleBasedRegimeDetectorConfig};
