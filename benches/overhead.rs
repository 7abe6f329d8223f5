//! Benchmarks for erf overhead in various scenarios.
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench --bench overhead -- "error_path"

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use erf::{Arg, Erf, ResultErfExt, erf};
use std::hint::black_box;

use core::fmt;

#[allow(dead_code)]
#[derive(Debug, Clone)]
enum BenchError {
    NotFound,
    InvalidInput,
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::NotFound => write!(f, "not found"),
            BenchError::InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl std::error::Error for BenchError {}

// ============================================================================
// Plain Result (no capture)
// ============================================================================

fn plain_result_err(_n: u64) -> Result<u64, BenchError> {
    Err(BenchError::NotFound)
}

// ============================================================================
// Erf constructors
// ============================================================================

fn erf_message(_n: u64) -> Result<u64, Erf> {
    Err(Erf::new("not found"))
}

fn erf_formatted(n: u64) -> Result<u64, Erf> {
    let err = erf!("item {} not found in {:?}", n, "cache")
        .and_then(|e| e.with_tags(&["item", "store"]))
        .unwrap_or_else(|e| Erf::new(e.to_string()));
    Err(err)
}

fn erf_wrapped(n: u64) -> Result<u64, Erf> {
    plain_result_err(n).wrap_erf()
}

fn erf_shallow(_n: u64) -> Result<u64, Erf> {
    Err(Erf::builder().max_depth(4).message("not found"))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_error_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_path");

    let n = 0u64;

    group.bench_function("plain_result", |b| {
        b.iter(|| {
            let _ = plain_result_err(black_box(n));
        })
    });

    group.bench_function("erf_message", |b| {
        b.iter(|| {
            let _ = erf_message(black_box(n));
        })
    });

    group.bench_function("erf_formatted_tagged", |b| {
        b.iter(|| {
            let _ = erf_formatted(black_box(n));
        })
    });

    group.bench_function("erf_wrapped", |b| {
        b.iter(|| {
            let _ = erf_wrapped(black_box(n));
        })
    });

    group.bench_function("erf_depth_4", |b| {
        b.iter(|| {
            let _ = erf_shallow(black_box(n));
        })
    });

    group.finish();
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for depth in [1, 5, 10, 20] {
        group.bench_with_input(BenchmarkId::new("wrap_chain", depth), &depth, |b, &depth| {
            b.iter(|| {
                fn recurse(d: u32) -> Result<(), Erf> {
                    if d == 0 {
                        Err(Erf::new("leaf"))
                    } else {
                        recurse(d - 1).wrap_erf()
                    }
                }
                let _ = recurse(black_box(depth));
            })
        });
    }

    group.finish();
}

fn bench_display_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("display_format");

    let simple = Erf::new("not found");
    group.bench_function("simple_display", |b| {
        b.iter(|| format!("{}", black_box(&simple)))
    });

    // The first render resolves symbols; later ones reuse the call sites.
    let _ = format!("{:x}", simple);
    group.bench_function("simple_full", |b| {
        b.iter(|| format!("{:x}", black_box(&simple)))
    });

    let cause = Erf::new("disk full");
    let nested = erf!("saving {}: {:w}", "report.txt", Arg::from(cause))
        .and_then(|e| e.with_tags(&["file"]))
        .unwrap_or_else(|e| Erf::new(e.to_string()));
    let _ = format!("{:x}", nested);
    group.bench_function("nested_full_tags", |b| {
        b.iter(|| format!("{:+#x}", black_box(&nested)))
    });
    group.bench_function("nested_compact", |b| {
        b.iter(|| format!("{:0X}", black_box(&nested)))
    });

    group.bench_function("resolve_fresh", |b| {
        b.iter(|| {
            let err = Erf::new("fresh");
            format!("{:x}", black_box(&err))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_error_path, bench_chain_depth, bench_display_format);

criterion_main!(benches);
