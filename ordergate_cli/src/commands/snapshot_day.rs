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

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};
use ordergate_core::eventlog::snapshot::{DailySnapshotGenerator, DailySnapshotInputs, RiskState};
use ordergate_core::execution::ExecutionMode;
use ordergate_core::market::Side;
use ordergate_core::strategy::TradeIntent;
use rust_decimal_macros::dec;

use crate::demo_env::build_demo_environment;

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("expected YYYY-MM-DD, got {s:?}"))
}

/// Seeds a handful of shadow trades then seals a snapshot for `date`
/// from them, exercising the same generator a real deployment runs at
/// end-of-day. Demo-only, same caveat as `replay-range`.
pub async fn run(date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let env = build_demo_environment();

    for i in 0..5u32 {
        let quantity = dec!(1) + rust_decimal::Decimal::from(i % 3);
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let intent = TradeIntent::new("demo-strategy", "BTC/USD", side, quantity, quantity * dec!(100));
        env.execution_manager.process_intent(&intent, ExecutionMode::Shadow).await;
    }

    let account = env.accounts.get(&"demo-strategy".to_string());
    let mut strategy_pnl = HashMap::new();
    let mut strategy_drawdown_pct = HashMap::new();
    let mut capital_allocation = HashMap::new();
    if let Some(account) = &account {
        strategy_pnl.insert("demo-strategy".to_string(), rust_decimal::Decimal::ZERO);
        strategy_drawdown_pct.insert("demo-strategy".to_string(), account.current_drawdown_pct);
        capital_allocation.insert("demo-strategy".to_string(), account.allocated);
    }

    let inputs = DailySnapshotInputs {
        system_mode: env.mode_controller.current_mode(),
        risk_state: if env.risk_governor.paused_strategies().is_empty() { RiskState::Normal } else { RiskState::Paused },
        total_equity: env.pool.total_equity(),
        pool_equity: HashMap::from([(env.pool.kind, env.pool.total_equity())]),
        pool_drawdown_pct: HashMap::new(),
        strategy_pnl,
        strategy_drawdown_pct,
        capital_allocation,
    };

    let events = env.event_log.get_for_day(date).await;
    let snapshot = DailySnapshotGenerator::generate(date, &events, inputs);

    println!("{}", format!("Snapshot for {date}").bold());

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("System mode"), Cell::new(snapshot.system_mode.to_string())]);
    table.add_row(vec![Cell::new("Risk state"), Cell::new(format!("{:?}", snapshot.risk_state))]);
    table.add_row(vec![Cell::new("Total equity"), Cell::new(snapshot.total_equity)]);
    table.add_row(vec![Cell::new("Trades attempted"), Cell::new(snapshot.trades_attempted)]);
    table.add_row(vec![Cell::new("Trades executed"), Cell::new(snapshot.trades_executed)]);
    table.add_row(vec![Cell::new("Trades blocked"), Cell::new(snapshot.trades_blocked)]);

    println!("{table}");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
