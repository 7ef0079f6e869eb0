//! Recommendation orchestrator
//!
//! Validates the request, fetches history once from the provider, then either
//! returns the cold-start base recommendation or runs the distance, effort and
//! duration calculators and assembles their results.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::RuleConfig;
use crate::distance::DistanceCalculator;
use crate::duration::DurationCalculator;
use crate::effort::{DeficitScoring, EffortCalculator, EffortScoring};
use crate::error::{NextRunError, Result};
use crate::history::RunHistoryProvider;
use crate::models::{EffortLevel, RunEvent, RunRecommendation};

/// Entry point producing one recommendation per call
pub struct RecommendationEngine<P: RunHistoryProvider, S: EffortScoring = DeficitScoring> {
    provider: P,
    clock: Box<dyn Clock>,
    rules: RuleConfig,
    distance: DistanceCalculator,
    duration: DurationCalculator,
    effort: EffortCalculator<S>,
}

impl<P: RunHistoryProvider> RecommendationEngine<P> {
    /// Engine with the default effort scoring and the system clock
    pub fn new(provider: P, rules: RuleConfig) -> Result<Self> {
        Self::with_scoring(provider, rules, DeficitScoring)
    }
}

impl<P: RunHistoryProvider, S: EffortScoring> RecommendationEngine<P, S> {
    /// Engine with a custom effort scoring rule
    pub fn with_scoring(provider: P, rules: RuleConfig, scoring: S) -> Result<Self> {
        rules.validate()?;

        Ok(Self {
            provider,
            clock: Box::new(SystemClock),
            distance: DistanceCalculator::new(rules.clone()),
            duration: DurationCalculator::new(rules.fallback.clone()),
            effort: EffortCalculator::with_scoring(scoring, rules.effort.clone(), rules.base.clone()),
            rules,
        })
    }

    /// Replace the clock that supplies "today"
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Recommend the next run for `user_id`
    pub async fn get_recommendation(&self, user_id: &str) -> Result<RunRecommendation> {
        if user_id.trim().is_empty() {
            return Err(NextRunError::InvalidArgument {
                field: "user_id".to_string(),
                reason: "must not be blank".to_string(),
            });
        }

        let history = self
            .provider
            .get_user_run_history(user_id)
            .await?
            .ok_or_else(|| NextRunError::UserNotFound {
                user_id: user_id.to_string(),
            })?;

        let today = self.clock.today();
        debug!(user_id, runs = history.len(), %today, "Fetched run history");

        let recommendation = self.recommend(&history, today)?;

        info!(
            user_id,
            distance_metres = recommendation.distance_metres,
            effort = recommendation.effort,
            duration_minutes = recommendation.duration.num_minutes(),
            "Recommendation ready"
        );

        Ok(recommendation)
    }

    /// Recommendation for an already fetched history
    pub fn recommend(&self, history: &[RunEvent], today: NaiveDate) -> Result<RunRecommendation> {
        if history.is_empty() {
            debug!("No history, using base recommendation");
            return Ok(self.base_recommendation(today));
        }

        let distance_metres = self.distance.calculate_distance(
            history,
            self.rules.progression.default_safe_percent,
            today,
        )?;
        let effort = self
            .effort
            .calculate_effort(history, self.rules.effort.weekly_target, today);
        let target = EffortLevel::nearest(effort);
        let duration = self
            .duration
            .calculate_duration(history, i64::from(distance_metres), target)?;

        debug!(distance_metres, effort, %target, "Computed recommendation");

        Ok(RunRecommendation {
            date: today,
            distance_metres,
            effort,
            duration,
        })
    }

    fn base_recommendation(&self, today: NaiveDate) -> RunRecommendation {
        let base = &self.rules.base;
        RunRecommendation {
            date: today,
            distance_metres: base.distance_metres,
            effort: base.effort.value(),
            duration: Duration::minutes(i64::from(base.duration_minutes)),
        }
    }
}
