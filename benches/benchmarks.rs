use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use abbrevmatch::{AbbrevMatcher, get_match_class};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a matcher over `n` review-field-style names.
fn build_matcher(n: usize) -> AbbrevMatcher<usize> {
    let mut m = AbbrevMatcher::new();
    for i in 0..n {
        m.add_phrase(&format!("Field {i} overall rating"), i, 0);
    }
    m.add_phrase("Overall merit", n, 0);
    m.add_phrase("Overall review quality", n + 1, 0);
    // Release-mode scoring path only; the cross-check doubles the work.
    m.set_cross_check(false);
    m
}

// ---------------------------------------------------------------------------
// 1. get_match_class micro-benchmark
// ---------------------------------------------------------------------------

fn bench_match_class(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_match_class");
    for (pattern, subject) in [
        ("Overall merit", "Overall merit"),
        ("OveMer", "Overall merit"),
        ("ove*", "Overall merit"),
        ("banana", "Overall merit"),
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern),
            &(pattern, subject),
            |b, &(pattern, subject)| {
                b.iter(|| get_match_class(black_box(pattern), black_box(subject)));
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Query benchmarks: cold (fresh matcher) and warm (memoized)
// ---------------------------------------------------------------------------

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_all");
    for n in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("cold", n), &n, |b, &n| {
            b.iter_batched(
                || build_matcher(n),
                |mut m| m.find_all(black_box("OveMer"), 0),
                criterion::BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("warm", n), &n, |b, &n| {
            let mut m = build_matcher(n);
            m.find_all("OveMer", 0);
            b.iter(|| m.find_all(black_box("OveMer"), 0));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Keyword synthesis
// ---------------------------------------------------------------------------

fn bench_keyword_synthesis(c: &mut Criterion) {
    use abbrevmatch::KW_CAMEL;

    c.bench_function("ensure_entry_keyword", |b| {
        b.iter_batched(
            || {
                let mut m = build_matcher(100);
                let h = m.add_phrase("A Study of the New Systems", 9999, 0);
                (m, h)
            },
            |(mut m, h)| m.ensure_entry_keyword(h, KW_CAMEL, 0),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_match_class,
    bench_queries,
    bench_keyword_synthesis
);
criterion_main!(benches);
