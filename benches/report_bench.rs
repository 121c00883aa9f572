//! Benchmarks for over-limit report building
//!
//! Run with: cargo bench

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use numberx::report::{format_money, paginate, render_report, write_csv, OverLimitReport};
use numberx::types::{NumberSummary, NumberType, RoundSummary};

fn create_summaries(count: usize) -> Vec<NumberSummary> {
    (0..count)
        .map(|i| {
            let number_type = if i % 2 == 0 {
                NumberType::TwoDigit
            } else {
                NumberType::ThreeDigit
            };
            let total_amount = ((i * 7919) % 5000) as f64;
            NumberSummary {
                number_value: format!("{:0width$}", i % 1000, width = number_type.digits()),
                number_type,
                total_entries: (i % 13) as u64 + 1,
                total_amount,
                limit_amount: 2000.0,
                is_over_limit: total_amount > 2000.0,
            }
        })
        .collect()
}

fn round_summary() -> RoundSummary {
    RoundSummary {
        round_id: 1,
        draw_date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
        status: "open".to_string(),
        total_entries: 0,
        total_amount: 0.0,
        over_limit_count: 0,
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    let round = round_summary();

    for size in [100, 1000, 10000] {
        let summaries = create_summaries(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("build_{}", size), |b| {
            b.iter(|| OverLimitReport::build(black_box(&round), black_box(&summaries)))
        });

        let report = OverLimitReport::build(&round, &summaries);

        group.bench_function(format!("pages_{}", size), |b| {
            b.iter(|| report.pages(black_box(25)))
        });

        group.bench_function(format!("render_{}", size), |b| {
            b.iter(|| render_report(black_box(&report)))
        });

        group.bench_function(format!("csv_{}", size), |b| {
            b.iter(|| {
                let mut buf = Vec::with_capacity(64 * 1024);
                write_csv(black_box(&report), 25, &mut buf).unwrap();
                buf
            })
        });
    }

    group.finish();
}

fn bench_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("helpers");

    let rows: Vec<u64> = (0..10_000).collect();
    group.bench_function("paginate_10000", |b| b.iter(|| paginate(black_box(&rows), 25)));

    group.bench_function("format_money", |b| {
        b.iter(|| format_money(black_box(12_345_678.49)))
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_helpers);
criterion_main!(benches);
