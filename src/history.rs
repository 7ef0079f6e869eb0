//! Run history providers
//!
//! The engine only sees [`RunHistoryProvider`]. Real deployments back it with
//! their own store; the in-memory provider here serves the CLI and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::ProviderError;
use crate::models::RunEvent;

/// Source of already-validated run events
#[async_trait]
pub trait RunHistoryProvider: Send + Sync {
    /// All run events for `user_id`, or None when the user is unknown
    async fn get_user_run_history(&self, user_id: &str) -> Result<Option<Vec<RunEvent>>, ProviderError>;
}

/// History held in memory, keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryHistoryProvider {
    runs: RwLock<HashMap<String, Vec<RunEvent>>>,
}

impl InMemoryHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(runs: HashMap<String, Vec<RunEvent>>) -> Self {
        Self {
            runs: RwLock::new(runs),
        }
    }

    /// Parse `{ "<user id>": [RunEvent, ...], ... }`
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        let runs: HashMap<String, Vec<RunEvent>> =
            serde_json::from_str(json).map_err(|e| ProviderError::Corrupt {
                reason: e.to_string(),
            })?;
        Ok(Self::from_map(runs))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let content = fs::read_to_string(&path).map_err(|e| ProviderError::Unavailable {
            reason: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_json_str(&content)
    }

    /// Register a user (possibly with no runs yet)
    pub async fn insert_user(&self, user_id: impl Into<String>, runs: Vec<RunEvent>) {
        self.runs.write().await.insert(user_id.into(), runs);
    }

    /// Append one run, registering the user if needed
    pub async fn record_run(&self, user_id: &str, run: RunEvent) {
        self.runs
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(run);
    }
}

#[async_trait]
impl RunHistoryProvider for InMemoryHistoryProvider {
    async fn get_user_run_history(&self, user_id: &str) -> Result<Option<Vec<RunEvent>>, ProviderError> {
        Ok(self.runs.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn sample_run() -> RunEvent {
        RunEvent::new(
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            6000,
            4,
            Duration::minutes(33),
        )
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let provider = InMemoryHistoryProvider::new();
        assert!(provider.get_user_run_history("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_and_fetch() {
        let provider = InMemoryHistoryProvider::new();
        provider.insert_user("empty", Vec::new()).await;
        provider.record_run("runner", sample_run()).await;

        assert_eq!(
            provider.get_user_run_history("empty").await.unwrap(),
            Some(Vec::new())
        );
        assert_eq!(
            provider.get_user_run_history("runner").await.unwrap(),
            Some(vec![sample_run()])
        );
    }

    #[tokio::test]
    async fn test_from_json_str() {
        let json = r#"{
            "runner": [
                { "date": "2024-04-02", "distance_metres": 6000, "effort": 4, "duration_seconds": 1980 }
            ]
        }"#;
        let provider = InMemoryHistoryProvider::from_json_str(json).unwrap();
        let history = provider.get_user_run_history("runner").await.unwrap().unwrap();
        assert_eq!(history, vec![sample_run()]);
    }

    #[test]
    fn test_corrupt_json() {
        let err = InMemoryHistoryProvider::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, ProviderError::Corrupt { .. }));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = InMemoryHistoryProvider::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }
}
