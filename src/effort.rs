//! Effort recommendation
//!
//! Recent logged efforts are compared with a cumulative weekly target. The
//! scoring rule sits behind [`EffortScoring`] so a different rule can be
//! dropped in without touching the orchestrator.

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::config::{BaseRecommendation, EffortRules};
use crate::models::{EffortLevel, RunEvent};

/// Highest RPE the engine will ever recommend
pub const MAX_EFFORT: u8 = 10;

/// Turns recent efforts into the next run's RPE
pub trait EffortScoring: Send + Sync {
    /// `recent_efforts` are the RPE values in the recent window, oldest first.
    /// Implementations may return anything; callers clamp to `0..=10`.
    fn score(&self, recent_efforts: &[u8], target_cumulative_effort: u32, base: &BaseRecommendation) -> u8;
}

/// Default scoring: close the gap to the weekly target one step at a time
///
/// - no recent runs: the base effort
/// - target already reached: recovery
/// - otherwise one step above the recent mean, capped at what is left of the target
#[derive(Debug, Clone, Copy, Default)]
pub struct DeficitScoring;

impl EffortScoring for DeficitScoring {
    fn score(&self, recent_efforts: &[u8], target_cumulative_effort: u32, base: &BaseRecommendation) -> u8 {
        if recent_efforts.is_empty() {
            return base.effort.value();
        }

        let spent: u32 = recent_efforts.iter().map(|&e| u32::from(e)).sum();
        if spent >= target_cumulative_effort {
            return EffortLevel::Recovery.value();
        }
        let remaining = target_cumulative_effort - spent;

        let mean = Decimal::from(spent) / Decimal::from(recent_efforts.len() as u32);
        let step_up = mean
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
            + 1;

        step_up.min(remaining).min(u32::from(MAX_EFFORT)) as u8
    }
}

/// Recommends the effort of the next run
#[derive(Debug, Clone, Default)]
pub struct EffortCalculator<S: EffortScoring = DeficitScoring> {
    scoring: S,
    rules: EffortRules,
    base: BaseRecommendation,
}

impl EffortCalculator {
    pub fn new(rules: EffortRules, base: BaseRecommendation) -> Self {
        Self::with_scoring(DeficitScoring, rules, base)
    }
}

impl<S: EffortScoring> EffortCalculator<S> {
    pub fn with_scoring(scoring: S, rules: EffortRules, base: BaseRecommendation) -> Self {
        Self {
            scoring,
            rules,
            base,
        }
    }

    /// Recommended RPE in `0..=10`
    pub fn calculate_effort(
        &self,
        history: &[RunEvent],
        target_cumulative_effort: u32,
        today: NaiveDate,
    ) -> u8 {
        let span = u64::from(self.rules.recent_window_days.saturating_sub(1));
        let window_start = today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);

        let mut recent: Vec<&RunEvent> = history
            .iter()
            .filter(|e| e.date >= window_start && e.date <= today)
            .collect();
        recent.sort_by_key(|e| e.date);

        let efforts: Vec<u8> = recent.iter().map(|e| e.effort.min(MAX_EFFORT)).collect();

        self.scoring
            .score(&efforts, target_cumulative_effort, &self.base)
            .min(MAX_EFFORT)
    }
}
