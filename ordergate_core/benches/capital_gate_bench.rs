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

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ordergate_core::capital::{AccountManager, CapitalGate, PoolKind};
use rust_decimal_macros::dec;

fn bench_capital_gate_check(c: &mut Criterion) {
    let accounts = Arc::new(AccountManager::new());
    accounts.create(&"bench-strategy".to_string(), PoolKind::Directional);
    accounts.update_allocation(&"bench-strategy".to_string(), dec!(10_000));
    let gate = CapitalGate::new(accounts);

    c.bench_function("capital_gate_check_within_allocation", |b| {
        b.iter(|| gate.check(black_box(&"bench-strategy".to_string()), black_box(dec!(500))))
    });

    c.bench_function("capital_gate_check_over_allocation", |b| {
        b.iter(|| gate.check(black_box(&"bench-strategy".to_string()), black_box(dec!(50_000))))
    });
}

criterion_group!(benches, bench_capital_gate_check);
criterion_main!(benches);
