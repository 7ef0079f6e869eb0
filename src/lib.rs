// Library interface for the nextrun recommendation engine
// Integration tests and the CLI both go through these modules

pub mod clock;
pub mod config;
pub mod distance;
pub mod duration;
pub mod effort;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod progression;
pub mod weekly;

// Re-export commonly used types for convenience
pub use models::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, RuleConfig};
pub use distance::{DistanceCalculator, DistancePolicy};
pub use duration::DurationCalculator;
pub use effort::{DeficitScoring, EffortCalculator, EffortScoring};
pub use engine::RecommendationEngine;
pub use error::{CalculationError, NextRunError, ProviderError, Result};
pub use history::{InMemoryHistoryProvider, RunHistoryProvider};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use progression::calculate_progression_ratio;
pub use weekly::{WeekStatus, WeekWindow, WeeklyHistoryAnalyzer, WeeklySummary};
