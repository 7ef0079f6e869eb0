//! Next-run distance recommendation
//!
//! A representative recent distance is scaled by the progression ratio. How
//! it is scaled depends on the current week: a run still owed to complete
//! the usual weekly count gets the full progressed distance, while an extra
//! run in an already complete week gets only the increment. The branching is
//! a named [`DistancePolicy`] so it can be pinned or swapped by configuration.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::RuleConfig;
use crate::error::CalculationError;
use crate::models::RunEvent;
use crate::progression::calculate_progression_ratio;
use crate::weekly::{WeekStatus, WeeklyHistoryAnalyzer};

/// How the progression ratio is applied to the representative distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistancePolicy {
    /// Owed run → progressed distance; extra run in a complete week → increment
    #[default]
    CadenceAware,
    /// Always the progressed distance, `representative × (1 + p/100)`
    AlwaysProgress,
    /// Always the increment, `representative × p/100`
    AlwaysIncrement,
}

impl DistancePolicy {
    /// Scale `representative` for the given week status
    pub fn apply(&self, representative: Decimal, ratio: Decimal, status: WeekStatus) -> Decimal {
        let progressed = representative * ratio;
        let increment = representative * (ratio - dec!(1));

        match self {
            DistancePolicy::AlwaysProgress => progressed,
            DistancePolicy::AlwaysIncrement => increment,
            DistancePolicy::CadenceAware => match status {
                WeekStatus::Complete { .. } => increment,
                WeekStatus::Owed { .. } | WeekStatus::NoCadence => progressed,
            },
        }
    }
}

/// Recommends the distance of the next run
#[derive(Debug, Clone, Default)]
pub struct DistanceCalculator {
    rules: RuleConfig,
}

impl DistanceCalculator {
    pub fn new(rules: RuleConfig) -> Self {
        Self { rules }
    }

    /// Recommended distance in metres
    ///
    /// Empty history, or history without a positive distance, yields the
    /// base distance. An out-of-range `progression_percent` is an error.
    pub fn calculate_distance(
        &self,
        history: &[RunEvent],
        progression_percent: i64,
        today: NaiveDate,
    ) -> Result<u32, CalculationError> {
        let ratio = calculate_progression_ratio(progression_percent, &self.rules.progression)?;

        let summary = WeeklyHistoryAnalyzer::new(self.rules.weekly.clone()).analyze(history, today);

        let representative = match Self::mean_distance(summary.recent_events())
            .or_else(|| Self::mean_distance(history.iter()))
        {
            Some(distance) => distance,
            None => return Ok(self.rules.base.distance_metres),
        };

        let recommended =
            self.rules
                .distance_policy
                .apply(representative, ratio, summary.week_status());

        recommended
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .ok_or_else(|| CalculationError::Overflow {
                calculation: "recommended distance".to_string(),
            })
    }

    /// Mean of positive distances, None if there are none
    fn mean_distance<'a>(events: impl Iterator<Item = &'a RunEvent>) -> Option<Decimal> {
        let (total, count) = events
            .filter(|e| e.distance_metres > 0)
            .fold((0u64, 0u64), |(total, count), e| {
                (total + u64::from(e.distance_metres), count + 1)
            });

        if count == 0 {
            None
        } else {
            Some(Decimal::from(total) / Decimal::from(count))
        }
    }
}
