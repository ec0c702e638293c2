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

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use ordergate_core::mode::SystemMode;

use crate::demo_env::build_demo_environment;

/// Read-only convenience command mirroring `GET /status`. Builds a fresh
/// demo environment, since this binary has no running process to query.
pub async fn run() -> Result<()> {
    let env = build_demo_environment();

    let mode = env.mode_controller.current_mode();
    let paused = env.risk_governor.paused_strategies();
    let risk_state = if paused.is_empty() { "normal" } else { "paused" };
    let healthy = env.health_monitor.snapshot().healthy;
    let trading_allowed = mode == SystemMode::Aggressive && healthy;

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Mode"), Cell::new(mode.to_string())]);
    table.add_row(vec![Cell::new("Risk state"), Cell::new(risk_state)]);
    table.add_row(vec![Cell::new("Healthy"), Cell::new(healthy)]);
    table.add_row(vec![
        Cell::new("Trading allowed"),
        Cell::new(trading_allowed).fg(if trading_allowed { Color::Green } else { Color::Yellow }),
    ]);
    if !paused.is_empty() {
        table.add_row(vec![Cell::new("Paused strategies"), Cell::new(paused.join(", "))]);
    }

    println!("{}", "Operator status".bold());
    println!("{table}");

    Ok(())
}
