use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::distance::DistancePolicy;
use crate::error::NextRunError;
use crate::logging::LogConfig;
use crate::models::EffortLevel;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Recommendation rules handed to the engine
    pub rules: RuleConfig,

    /// Logging setup for the CLI
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Immutable rule set the engine is constructed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleConfig {
    /// Branching rule for the distance recommender
    pub distance_policy: DistancePolicy,

    /// Bounds on the percentage increase between runs
    pub progression: ProgressionRules,

    /// Beginner recommendation used on cold start
    pub base: BaseRecommendation,

    /// Fallbacks when no pace history exists
    pub fallback: FallbackRules,

    /// Weekly cadence inference
    pub weekly: WeeklyRules,

    /// Effort recommendation settings
    pub effort: EffortRules,
}

/// Progression percentage bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRules {
    /// Lowest permitted progression percentage
    pub min_percent: i64,

    /// Highest permitted progression percentage
    pub max_percent: i64,

    /// Percentage the orchestrator uses for every recommendation
    pub default_safe_percent: i64,
}

/// Fixed recommendation for runners without history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRecommendation {
    pub distance_metres: u32,
    pub duration_minutes: u32,
    pub effort: EffortLevel,
}

/// Duration fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRules {
    /// Pace assumed when there is no history at the target effort (min/km)
    pub default_pace_minutes_per_km: u32,

    /// Duration recommended for a zero-distance (rest) target
    pub rest_duration_minutes: u32,
}

/// Weekly history analysis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRules {
    /// Prior weeks inspected to infer the established runs per week
    pub cadence_lookback_weeks: u32,
}

/// Effort recommendation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortRules {
    /// Cumulative RPE the runner aims for per week
    pub weekly_target: u32,

    /// Days (ending today) considered "recent"
    pub recent_window_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            rules: RuleConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for ProgressionRules {
    fn default() -> Self {
        ProgressionRules {
            min_percent: 0,
            max_percent: 20,
            default_safe_percent: 5,
        }
    }
}

impl Default for BaseRecommendation {
    fn default() -> Self {
        BaseRecommendation {
            distance_metres: 2500,
            duration_minutes: 30,
            effort: EffortLevel::Easy,
        }
    }
}

impl Default for FallbackRules {
    fn default() -> Self {
        FallbackRules {
            default_pace_minutes_per_km: 15,
            rest_duration_minutes: 20,
        }
    }
}

impl Default for WeeklyRules {
    fn default() -> Self {
        WeeklyRules {
            cadence_lookback_weeks: 4,
        }
    }
}

impl Default for EffortRules {
    fn default() -> Self {
        EffortRules {
            weekly_target: 30,
            recent_window_days: 7,
        }
    }
}

/// Longest recent-effort window accepted, one leap year
pub const MAX_RECENT_WINDOW_DAYS: u32 = 366;

impl RuleConfig {
    /// Reject rule sets the engine cannot work with
    pub fn validate(&self) -> Result<(), NextRunError> {
        let p = &self.progression;
        if p.min_percent > p.max_percent {
            return Err(NextRunError::Configuration(format!(
                "progression min_percent {} exceeds max_percent {}",
                p.min_percent, p.max_percent
            )));
        }
        if p.default_safe_percent < p.min_percent || p.default_safe_percent > p.max_percent {
            return Err(NextRunError::Configuration(format!(
                "default_safe_percent {} is outside [{}, {}]",
                p.default_safe_percent, p.min_percent, p.max_percent
            )));
        }
        if self.fallback.default_pace_minutes_per_km == 0 {
            return Err(NextRunError::Configuration(
                "default_pace_minutes_per_km must be positive".to_string(),
            ));
        }
        if self.weekly.cadence_lookback_weeks == 0 {
            return Err(NextRunError::Configuration(
                "cadence_lookback_weeks must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_RECENT_WINDOW_DAYS).contains(&self.effort.recent_window_days) {
            return Err(NextRunError::Configuration(format!(
                "recent_window_days must be between 1 and {}, got {}",
                MAX_RECENT_WINDOW_DAYS, self.effort.recent_window_days
            )));
        }
        Ok(())
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.rules.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nextrun")
            .join("config.toml")
    }

    /// Load configuration, using defaults only when no file exists
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(&config_path)
    }
}
