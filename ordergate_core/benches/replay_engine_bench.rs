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

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ordergate_core::eventlog::ReplayEngine;
use ordergate_core::events::{Event, EventDraft, EventType};
use ordergate_core::gate::GateLayer;

fn synthetic_day(date: NaiveDate, trade_count: u32) -> Vec<Event> {
    let ts = date.and_hms_opt(9, 30, 0).unwrap().and_utc();
    (0..trade_count)
        .map(|i| {
            if i % 5 == 0 {
                EventDraft::new(EventType::TradeBlocked).with_blocking_layer(GateLayer::Risk).into_event(i as u64, ts)
            } else {
                EventDraft::new(EventType::TradeExecuted).into_event(i as u64, ts)
            }
        })
        .collect()
}

fn bench_replay_day(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let small = synthetic_day(date, 100);
    let large = synthetic_day(date, 10_000);

    c.bench_function("replay_day_100_events", |b| {
        b.iter(|| ReplayEngine::replay_day(black_box(date), black_box(&small), None))
    });

    c.bench_function("replay_day_10000_events", |b| {
        b.iter(|| ReplayEngine::replay_day(black_box(date), black_box(&large), None))
    });
}

criterion_group!(benches, bench_replay_day);
criterion_main!(benches);
