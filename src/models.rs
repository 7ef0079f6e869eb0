use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named effort bands used as recommendation targets and history filters
///
/// Each band carries a fixed RPE byte. History is matched against a band by
/// exact equality with that byte, never as a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortLevel {
    Recovery,
    Easy,
    Strong,
    Hard,
}

impl EffortLevel {
    /// All bands in ascending exertion
    pub const ALL: [EffortLevel; 4] = [
        EffortLevel::Recovery,
        EffortLevel::Easy,
        EffortLevel::Strong,
        EffortLevel::Hard,
    ];

    /// RPE byte for this band
    pub fn value(&self) -> u8 {
        match self {
            EffortLevel::Recovery => 2,
            EffortLevel::Easy => 4,
            EffortLevel::Strong => 6,
            EffortLevel::Hard => 8,
        }
    }

    /// Band whose RPE byte is closest to `effort`; ties go to the lower band
    pub fn nearest(effort: u8) -> Self {
        let mut best = EffortLevel::Recovery;
        for level in Self::ALL {
            if level.value().abs_diff(effort) < best.value().abs_diff(effort) {
                best = level;
            }
        }
        best
    }
}

impl fmt::Display for EffortLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffortLevel::Recovery => write!(f, "Recovery"),
            EffortLevel::Easy => write!(f, "Easy"),
            EffortLevel::Strong => write!(f, "Strong"),
            EffortLevel::Hard => write!(f, "Hard"),
        }
    }
}

impl std::str::FromStr for EffortLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recovery" => Ok(EffortLevel::Recovery),
            "easy" => Ok(EffortLevel::Easy),
            "strong" => Ok(EffortLevel::Strong),
            "hard" => Ok(EffortLevel::Hard),
            _ => Err(format!("Unknown effort level: {}", s)),
        }
    }
}

/// One logged run, as delivered by the history provider
///
/// Providers hand over validated events: the date is not in the future,
/// distance and duration are positive and effort is at most 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Calendar date the run took place
    pub date: NaiveDate,

    /// Distance covered in metres
    pub distance_metres: u32,

    /// Rate of Perceived Exertion, 0-10
    pub effort: u8,

    /// Elapsed time
    #[serde(rename = "duration_seconds", with = "duration_seconds")]
    pub duration: Duration,
}

impl RunEvent {
    pub fn new(date: NaiveDate, distance_metres: u32, effort: u8, duration: Duration) -> Self {
        Self {
            date,
            distance_metres,
            effort,
            duration,
        }
    }

    /// Pace in minutes per kilometre, None for zero-distance events
    pub fn pace_minutes_per_km(&self) -> Option<Decimal> {
        if self.distance_metres == 0 {
            return None;
        }
        let minutes = Decimal::from(self.duration.num_milliseconds()) / dec!(60000);
        let kilometres = Decimal::from(self.distance_metres) / dec!(1000);
        Some(minutes / kilometres)
    }

    /// True when the effort byte matches the band exactly
    pub fn is_at(&self, level: EffortLevel) -> bool {
        self.effort == level.value()
    }
}

/// Suggested next run, built fresh for every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecommendation {
    /// Date the recommendation was issued for
    pub date: NaiveDate,

    /// Recommended distance in metres
    pub distance_metres: u32,

    /// Recommended RPE, 0-10
    pub effort: u8,

    /// Recommended duration
    #[serde(rename = "duration_seconds", with = "duration_seconds")]
    pub duration: Duration,
}

impl RunRecommendation {
    /// Band closest to the recommended effort
    pub fn effort_level(&self) -> EffortLevel {
        EffortLevel::nearest(self.effort)
    }
}

// Durations travel as whole seconds
mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Duration::try_seconds(seconds)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {}s", seconds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_effort_values_ascend() {
        let values: Vec<u8> = EffortLevel::ALL.iter().map(|l| l.value()).collect();
        assert_eq!(values, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_nearest_band() {
        assert_eq!(EffortLevel::nearest(0), EffortLevel::Recovery);
        assert_eq!(EffortLevel::nearest(4), EffortLevel::Easy);
        assert_eq!(EffortLevel::nearest(5), EffortLevel::Easy); // tie goes lower
        assert_eq!(EffortLevel::nearest(7), EffortLevel::Strong);
        assert_eq!(EffortLevel::nearest(10), EffortLevel::Hard);
    }

    #[test]
    fn test_effort_level_parsing() {
        assert_eq!("Hard".parse::<EffortLevel>().unwrap(), EffortLevel::Hard);
        assert_eq!("easy".parse::<EffortLevel>().unwrap(), EffortLevel::Easy);
        assert!("tempo".parse::<EffortLevel>().is_err());
    }

    #[test]
    fn test_pace_calculation() {
        let run = RunEvent::new(date(2024, 3, 1), 5000, 4, Duration::minutes(25));
        assert_eq!(run.pace_minutes_per_km(), Some(dec!(5)));

        let empty = RunEvent::new(date(2024, 3, 1), 0, 4, Duration::minutes(25));
        assert_eq!(empty.pace_minutes_per_km(), None);
    }

    #[test]
    fn test_run_event_json_shape() {
        let run = RunEvent::new(date(2024, 3, 1), 5000, 4, Duration::minutes(25));
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["duration_seconds"], 1500);
        assert_eq!(json["date"], "2024-03-01");

        let back: RunEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, run);
    }
}
