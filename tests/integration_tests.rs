use chrono::{Duration, NaiveDate};
use nextrun::{
    EffortLevel, FixedClock, InMemoryHistoryProvider, NextRunError, ProviderError,
    RecommendationEngine, RuleConfig, RunEvent, RunHistoryProvider,
};

/// Integration tests that drive the engine end to end through a provider

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 22).unwrap()
}

fn run(days_ago: i64, distance_metres: u32, effort: EffortLevel, minutes: i64) -> RunEvent {
    RunEvent::new(
        today() - Duration::days(days_ago),
        distance_metres,
        effort.value(),
        Duration::minutes(minutes),
    )
}

async fn engine_with(
    user: &str,
    runs: Vec<RunEvent>,
) -> RecommendationEngine<InMemoryHistoryProvider> {
    let provider = InMemoryHistoryProvider::new();
    provider.insert_user(user, runs).await;
    RecommendationEngine::new(provider, RuleConfig::default())
        .unwrap()
        .with_clock(FixedClock(today()))
}

#[tokio::test]
async fn test_cold_start_returns_base_recommendation() {
    let engine = engine_with("beginner", Vec::new()).await;
    let recommendation = engine.get_recommendation("beginner").await.unwrap();

    assert_eq!(recommendation.distance_metres, 2500);
    assert_eq!(recommendation.effort, EffortLevel::Easy.value());
    assert_eq!(recommendation.duration, Duration::minutes(30));
    assert_eq!(recommendation.date, today());
}

#[tokio::test]
async fn test_low_intensity_history_differs_from_base() {
    let runs = vec![
        run(1, 3000, EffortLevel::Recovery, 24),
        run(8, 3000, EffortLevel::Recovery, 25),
        run(10, 3000, EffortLevel::Easy, 21),
        run(12, 3000, EffortLevel::Recovery, 24),
        run(15, 3000, EffortLevel::Recovery, 26),
        run(17, 3000, EffortLevel::Easy, 21),
        run(19, 3000, EffortLevel::Recovery, 24),
    ];
    let engine = engine_with("casual", runs).await;
    let recommendation = engine.get_recommendation("casual").await.unwrap();

    let base_duration = Duration::minutes(30);
    assert!(
        recommendation.distance_metres != 2500
            || recommendation.effort != EffortLevel::Easy.value()
            || recommendation.duration != base_duration
    );
    // one run so far against an established three per week
    assert_eq!(recommendation.distance_metres, 3150);
    // recent efforts are low against the weekly target, so the effort rises
    assert!(recommendation.effort > EffortLevel::Recovery.value());
    assert!(recommendation.effort <= 10);
}

#[tokio::test]
async fn test_blank_identifier_is_invalid_argument() {
    let engine = engine_with("someone", Vec::new()).await;
    let err = engine.get_recommendation("  ").await.unwrap_err();

    assert!(matches!(err, NextRunError::InvalidArgument { .. }));
    assert!(err.to_string().contains("user_id"));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let engine = engine_with("someone", Vec::new()).await;
    let err = engine.get_recommendation("someone-else").await.unwrap_err();
    assert!(matches!(err, NextRunError::UserNotFound { .. }));
}

#[tokio::test]
async fn test_daily_runner_with_complete_week_gets_increment() {
    let runs: Vec<RunEvent> = (0..28)
        .map(|d| run(d, 10_000, EffortLevel::Easy, 50))
        .collect();
    let engine = engine_with("daily", runs).await;
    let recommendation = engine.get_recommendation("daily").await.unwrap();

    // the current week already holds seven runs: increment of 5% of 10 km
    assert_eq!(recommendation.distance_metres, 500);
    // 28 of the weekly 30 already spent: capped at the remaining 2
    assert_eq!(recommendation.effort, 2);
    // no recovery history, default 15 min/km over 0.5 km
    assert_eq!(recommendation.duration, Duration::seconds(450));
}

#[tokio::test]
async fn test_owed_run_gets_progressed_distance() {
    let runs = vec![
        run(2, 8000, EffortLevel::Easy, 44),
        run(4, 8000, EffortLevel::Easy, 44),
        run(8, 8000, EffortLevel::Easy, 44),
        run(10, 8000, EffortLevel::Easy, 44),
        run(12, 8000, EffortLevel::Easy, 44),
        run(15, 8000, EffortLevel::Easy, 44),
        run(17, 8000, EffortLevel::Easy, 44),
        run(19, 8000, EffortLevel::Easy, 44),
    ];
    let engine = engine_with("steady", runs).await;
    let recommendation = engine.get_recommendation("steady").await.unwrap();

    assert_eq!(recommendation.distance_metres, 8400);
    // efforts 4 + 4 this week → one step up
    assert_eq!(recommendation.effort, 5);
    // Easy band pace 5.5 min/km over 8.4 km
    assert_eq!(recommendation.duration, Duration::seconds(2772));
}

struct FailingProvider;

#[async_trait::async_trait]
impl RunHistoryProvider for FailingProvider {
    async fn get_user_run_history(
        &self,
        _user_id: &str,
    ) -> Result<Option<Vec<RunEvent>>, ProviderError> {
        Err(ProviderError::Unavailable {
            reason: "connection reset".to_string(),
        })
    }
}

#[tokio::test]
async fn test_provider_errors_propagate() {
    let engine = RecommendationEngine::new(FailingProvider, RuleConfig::default()).unwrap();
    let err = engine.get_recommendation("anyone").await.unwrap_err();

    assert!(matches!(err, NextRunError::Provider(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_json_history_round_trip_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"{ "json-runner": [
            { "date": "2024-09-21", "distance_metres": 4000, "effort": 4, "duration_seconds": 1440 }
        ] }"#,
    )
    .unwrap();

    let provider = InMemoryHistoryProvider::from_json_file(&path).unwrap();
    let engine = RecommendationEngine::new(provider, RuleConfig::default())
        .unwrap()
        .with_clock(FixedClock(today()));
    let recommendation = engine.get_recommendation("json-runner").await.unwrap();

    assert_eq!(recommendation.distance_metres, 4200);
    assert_eq!(recommendation.effort, 5);
    // 6 min/km over 4.2 km
    assert_eq!(recommendation.duration, Duration::seconds(1512));
}
