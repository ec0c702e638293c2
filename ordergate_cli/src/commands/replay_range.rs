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

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Table};
use ordergate_core::execution::ExecutionMode;
use ordergate_core::market::Side;
use ordergate_core::strategy::TradeIntent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::demo_env::{build_demo_environment, replay_date};

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("expected YYYY-MM-DD, got {s:?}"))
}

/// Seeds the in-memory event log with one shadow trade per day in the
/// range, then replays each day. There is no durable history behind
/// this binary, so the "replay" here exercises the same replay engine
/// a real deployment would run against its stored event log, against
/// data this invocation just generated.
pub async fn run(start: &str, end: Option<&str>) -> Result<()> {
    let start_date = parse_date(start)?;
    let end_date = match end {
        Some(e) => parse_date(e)?,
        None => start_date,
    };
    if end_date < start_date {
        bail!("end date {end_date} is before start date {start_date}");
    }

    let env = build_demo_environment();

    let mut date = start_date;
    let mut dates = Vec::new();
    while date <= end_date {
        dates.push(date);
        date = date.succ_opt().context("date range overflowed")?;
    }

    for (i, _) in dates.iter().enumerate() {
        let quantity = dec!(1) + Decimal::from(i as u32 % 5);
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let intent = TradeIntent::new("demo-strategy", "BTC/USD", side, quantity, quantity * dec!(100));
        env.execution_manager.process_intent(&intent, ExecutionMode::Shadow).await;
    }

    println!("{}", format!("Replaying {} day(s)", dates.len()).bold());

    let mut table = Table::new();
    table.set_header(vec!["Date", "Executed", "Blocked", "Max drawdown %", "Final mode"]);
    for date in dates {
        let result = replay_date(&env.event_log, date).await;
        table.add_row(vec![
            Cell::new(result.date),
            Cell::new(result.trades_executed),
            Cell::new(result.trades_blocked),
            Cell::new(result.max_drawdown_pct),
            Cell::new(result.final_mode.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())),
        ]);
        if !result.discrepancies.is_empty() {
            for d in result.discrepancies {
                println!("  {} {d}", "discrepancy:".yellow());
            }
        }
    }

    println!("{table}");

    Ok(())
}
