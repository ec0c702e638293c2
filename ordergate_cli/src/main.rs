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

mod commands;
mod demo_env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::commands::{replay_range, snapshot_day, start_shadow, start_simulation, status};

#[derive(Parser)]
#[command(name = "ordergate-cli")]
#[command(author, version, about = "Operator CLI for the ordergate governance core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a batch of synthetic trade intents through the gate chain in Shadow mode.
    StartShadow {
        #[arg(long, default_value_t = 20)]
        trades: u32,
    },
    /// Run a batch of synthetic trade intents through the gate chain in Simulation mode.
    StartSimulation {
        #[arg(long, default_value_t = 20)]
        trades: u32,
    },
    /// Replay a date or date range from the event log.
    ReplayRange {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
    },
    /// Generate and print the daily snapshot for one date.
    SnapshotDay {
        #[arg(long)]
        date: String,
    },
    /// Read-only convenience command mirroring `GET /status`.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .ok();

    let cli = Cli::parse();

    match cli.command {
        Command::StartShadow { trades } => start_shadow::run(trades).await,
        Command::StartSimulation { trades } => start_simulation::run(trades).await,
        Command::ReplayRange { start, end } => replay_range::run(&start, end.as_deref()).await,
        Command::SnapshotDay { date } => snapshot_day::run(&date).await,
        Command::Status => status::run().await,
    }
}
