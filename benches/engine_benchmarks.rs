use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nextrun::{
    DistanceCalculator, DurationCalculator, EffortCalculator, EffortLevel, FixedClock,
    InMemoryHistoryProvider, RecommendationEngine, RuleConfig, RunEvent, WeeklyHistoryAnalyzer,
};

/// Performance benchmarks for the recommendation pipeline
///
/// History sizes range from a few weeks to several years of daily runs so
/// that the cost of windowing and pace filtering stays visible.

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

fn create_history(days: i64) -> Vec<RunEvent> {
    (0..days)
        .map(|d| {
            let level = EffortLevel::ALL[(d % 4) as usize];
            let distance = 4000 + (d % 7) as u32 * 1000;
            RunEvent::new(
                today() - Duration::days(d),
                distance,
                level.value(),
                Duration::seconds(i64::from(distance) * (420 - 30 * (d % 4)) / 1000),
            )
        })
        .collect()
}

fn bench_weekly_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Weekly Analysis");
    let analyzer = WeeklyHistoryAnalyzer::default();

    for &days in &[28, 365, 1825] {
        let history = create_history(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(BenchmarkId::new("analyze", days), &history, |b, history| {
            b.iter(|| analyzer.analyze(black_box(history), today()));
        });
    }

    group.finish();
}

fn bench_calculators(c: &mut Criterion) {
    let mut group = c.benchmark_group("Calculators");
    let rules = RuleConfig::default();
    let distance = DistanceCalculator::new(rules.clone());
    let duration = DurationCalculator::new(rules.fallback.clone());
    let effort: EffortCalculator = EffortCalculator::new(rules.effort.clone(), rules.base.clone());

    for &days in &[28, 365, 1825] {
        let history = create_history(days);
        group.throughput(Throughput::Elements(days as u64));

        group.bench_with_input(
            BenchmarkId::new("calculate_distance", days),
            &history,
            |b, history| b.iter(|| distance.calculate_distance(black_box(history), 5, today())),
        );

        group.bench_with_input(
            BenchmarkId::new("calculate_duration", days),
            &history,
            |b, history| {
                b.iter(|| duration.calculate_duration(black_box(history), 8000, EffortLevel::Strong))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("calculate_effort", days),
            &history,
            |b, history| b.iter(|| effort.calculate_effort(black_box(history), 30, today())),
        );
    }

    group.finish();
}

fn bench_full_recommendation(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("Recommendation");

    for &days in &[28, 365, 1825] {
        let provider = InMemoryHistoryProvider::new();
        runtime.block_on(provider.insert_user("bench", create_history(days)));
        let engine = RecommendationEngine::new(provider, RuleConfig::default())
            .unwrap()
            .with_clock(FixedClock(today()));

        group.bench_function(BenchmarkId::new("get_recommendation", days), |b| {
            b.iter(|| runtime.block_on(engine.get_recommendation(black_box("bench"))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_weekly_analysis,
    bench_calculators,
    bench_full_recommendation
);
criterion_main!(benches);
