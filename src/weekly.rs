//! Weekly grouping of run history
//!
//! History is split into 7-day windows ending on a reference date. Window 0
//! is the current week (`today - 6 ..= today`), window 1 the week before, and
//! so on. The prior windows establish how many runs the runner usually logs
//! per week, which tells the distance recommender whether the next run is
//! still owed this week or is an extra one.

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::WeeklyRules;
use crate::models::RunEvent;

/// One 7-day window of history
#[derive(Debug, Clone, PartialEq)]
pub struct WeekWindow {
    /// 0 for the window ending today, increasing into the past
    pub index: u32,

    /// First day of the window (inclusive)
    pub start: NaiveDate,

    /// Last day of the window (inclusive)
    pub end: NaiveDate,

    /// Runs logged in the window, oldest first
    pub events: Vec<RunEvent>,
}

impl WeekWindow {
    fn new(index: u32, today: NaiveDate) -> Self {
        let end = today - Duration::days(7 * i64::from(index));
        Self {
            index,
            start: end - Duration::days(6),
            end,
            events: Vec::new(),
        }
    }

    pub fn run_count(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn total_distance_metres(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.distance_metres)).sum()
    }

    pub fn total_effort(&self) -> u32 {
        self.events.iter().map(|e| u32::from(e.effort)).sum()
    }
}

/// Where the current week stands against the established cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStatus {
    /// Not enough prior weeks to know the runner's cadence
    NoCadence,
    /// The current week is short of the usual run count
    Owed { remaining: u32 },
    /// The current week already holds the usual run count (or more)
    Complete { extra: u32 },
}

/// Result of grouping a history by week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    /// Reference date the windows end on
    pub today: NaiveDate,

    /// Every window from the current week back to the oldest run, newest first
    pub weeks: Vec<WeekWindow>,

    /// Runs logged in the current window
    pub current_week_runs: u32,

    /// Typical runs per week inferred from prior windows
    pub established_runs_per_week: Option<u32>,

    lookback_weeks: u32,
}

impl WeeklySummary {
    pub fn current_week(&self) -> Option<&WeekWindow> {
        self.weeks.first()
    }

    pub fn week_status(&self) -> WeekStatus {
        match self.established_runs_per_week {
            None => WeekStatus::NoCadence,
            Some(established) if self.current_week_runs < established => WeekStatus::Owed {
                remaining: established - self.current_week_runs,
            },
            Some(established) => WeekStatus::Complete {
                extra: self.current_week_runs - established,
            },
        }
    }

    /// Events in the current window and the lookback windows
    pub fn recent_events(&self) -> impl Iterator<Item = &RunEvent> {
        let horizon = self.lookback_weeks;
        self.weeks
            .iter()
            .filter(move |w| w.index <= horizon)
            .flat_map(|w| w.events.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.iter().all(|w| w.events.is_empty())
    }
}

/// Groups run history into weekly windows
#[derive(Debug, Clone, Default)]
pub struct WeeklyHistoryAnalyzer {
    rules: WeeklyRules,
}

impl WeeklyHistoryAnalyzer {
    pub fn new(rules: WeeklyRules) -> Self {
        Self { rules }
    }

    /// Group `history` into windows ending on `today`
    ///
    /// Input order is irrelevant. Events dated after `today` are ignored.
    pub fn analyze(&self, history: &[RunEvent], today: NaiveDate) -> WeeklySummary {
        let mut by_week: BTreeMap<u32, Vec<RunEvent>> = BTreeMap::new();

        for event in history {
            if let Some(index) = Self::week_index(event.date, today) {
                by_week.entry(index).or_default().push(event.clone());
            }
        }

        let oldest = by_week.keys().next_back().copied().unwrap_or(0);
        let weeks: Vec<WeekWindow> = (0..=oldest)
            .map(|index| {
                let mut window = WeekWindow::new(index, today);
                if let Some(mut events) = by_week.remove(&index) {
                    events.sort_by_key(|e| e.date);
                    window.events = events;
                }
                window
            })
            .collect();

        let current_week_runs = weeks.first().map(WeekWindow::run_count).unwrap_or(0);
        let established_runs_per_week =
            Self::established_cadence(&weeks, oldest, self.rules.cadence_lookback_weeks);

        WeeklySummary {
            today,
            weeks,
            current_week_runs,
            established_runs_per_week,
            lookback_weeks: self.rules.cadence_lookback_weeks,
        }
    }

    /// Window index for `date`, None for future dates
    fn week_index(date: NaiveDate, today: NaiveDate) -> Option<u32> {
        let days_ago = (today - date).num_days();
        if days_ago < 0 {
            return None;
        }
        u32::try_from(days_ago / 7).ok()
    }

    /// Rounded mean run count over prior windows the runner was active in
    fn established_cadence(weeks: &[WeekWindow], oldest: u32, lookback: u32) -> Option<u32> {
        let last_prior = oldest.min(lookback);
        if last_prior == 0 {
            return None;
        }

        let counts: Vec<u32> = weeks
            .iter()
            .filter(|w| w.index >= 1 && w.index <= last_prior)
            .map(WeekWindow::run_count)
            .collect();

        let total: u32 = counts.iter().sum();
        let mean = Decimal::from(total) / Decimal::from(counts.len() as u32);
        let rounded = mean
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0);

        if rounded == 0 {
            None
        } else {
            Some(rounded)
        }
    }
}
