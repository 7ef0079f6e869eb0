//! Pace-based duration recommendation
//!
//! History is filtered to runs at the target effort band, their paces are
//! averaged, and the mean pace is scaled to the recommended distance. Without
//! matching history a default pace is assumed.

use chrono::Duration;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::FallbackRules;
use crate::error::CalculationError;
use crate::models::{EffortLevel, RunEvent};

/// Recommends how long the next run should take
#[derive(Debug, Clone, Default)]
pub struct DurationCalculator {
    rules: FallbackRules,
}

impl DurationCalculator {
    pub fn new(rules: FallbackRules) -> Self {
        Self { rules }
    }

    /// Duration for `recommended_distance_metres` at `target_effort`
    pub fn calculate_duration(
        &self,
        history: &[RunEvent],
        recommended_distance_metres: i64,
        target_effort: EffortLevel,
    ) -> Result<Duration, CalculationError> {
        if recommended_distance_metres < 0 {
            return Err(CalculationError::InvalidArgument {
                parameter: "recommended_distance_metres".to_string(),
                reason: format!(
                    "must be non-negative, got {}",
                    recommended_distance_metres
                ),
            });
        }

        let pace = match Self::average_pace(history, target_effort) {
            Some(pace) => pace,
            // no pace to scale: a zero-distance day is a rest session
            None if recommended_distance_metres == 0 => {
                return Ok(Duration::minutes(i64::from(self.rules.rest_duration_minutes)));
            }
            None => Decimal::from(self.rules.default_pace_minutes_per_km),
        };

        let kilometres = Decimal::from(recommended_distance_metres) / dec!(1000);
        Self::minutes_to_duration(pace * kilometres)
    }

    /// Mean pace (min/km) of runs at exactly `effort`, None without any
    pub fn average_pace(history: &[RunEvent], effort: EffortLevel) -> Option<Decimal> {
        let paces: Vec<Decimal> = history
            .iter()
            .filter(|e| e.is_at(effort))
            .filter_map(RunEvent::pace_minutes_per_km)
            .collect();

        if paces.is_empty() {
            return None;
        }

        let total: Decimal = paces.iter().sum();
        Some(total / Decimal::from(paces.len() as u64))
    }

    fn minutes_to_duration(minutes: Decimal) -> Result<Duration, CalculationError> {
        let millis = (minutes * dec!(60000))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CalculationError::Overflow {
                calculation: "recommended duration".to_string(),
            })?;

        Duration::try_milliseconds(millis).ok_or_else(|| CalculationError::Overflow {
            calculation: "recommended duration".to_string(),
        })
    }
}
