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
use ordergate_core::execution::ExecutionMode;
use ordergate_core::market::Side;
use ordergate_core::strategy::TradeIntent;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::demo_env::build_demo_environment;

/// Runs `trades` synthetic intents through the gate chain in Simulation
/// mode and prints the executed/blocked breakdown. Unlike Shadow mode,
/// fills here never feed the Confidence Gate's evidence — this is a
/// throwaway dry run, not an evidence-accumulating one.
pub async fn run(trades: u32) -> Result<()> {
    let env = build_demo_environment();

    println!("{}", "Running simulation batch".bold());

    let mut executed = 0u32;
    let mut blocked = 0u32;
    let mut total_fees = Decimal::ZERO;

    for i in 0..trades {
        let quantity = dec!(1) + Decimal::from(i % 5);
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let intent = TradeIntent::new("demo-strategy", "BTC/USD", side, quantity, quantity * dec!(100));

        let outcome = env.execution_manager.process_intent(&intent, ExecutionMode::Simulation).await;
        if outcome.success {
            executed += 1;
            total_fees += outcome.fees;
        } else {
            blocked += 1;
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Trades run"), Cell::new(trades)]);
    table.add_row(vec![Cell::new("Executed"), Cell::new(executed).fg(Color::Green)]);
    table.add_row(vec![Cell::new("Blocked"), Cell::new(blocked).fg(Color::Yellow)]);
    table.add_row(vec![Cell::new("Total simulated fees"), Cell::new(total_fees)]);

    println!("{table}");
    println!("events in log: {}", env.event_log.get_all().await.len());

    Ok(())
}
