// Home Assistant REST repository implementation
use crate::application::history_repository::{HistoryRepository, StateRepository};
use crate::domain::state::{EntityState, Sample, StateSnapshot, StateValue};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct HomeAssistantRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    language: Option<String>,
    host_config: OnceCell<HostConfig>,
}

/// One row of `/api/history/period`. With `minimal_response` only the first
/// row of each entity carries more than state and timestamps.
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    state: serde_json::Value,
    #[serde(default)]
    last_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StateRecord {
    entity_id: String,
    #[serde(default)]
    state: serde_json::Value,
    #[serde(default)]
    attributes: StateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct StateAttributes {
    #[serde(default)]
    unit_of_measurement: Option<String>,
    #[serde(default)]
    friendly_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct HostConfig {
    #[serde(default)]
    language: Option<String>,
}

impl HomeAssistantRepository {
    pub fn new(host: String, token: String, language: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            language,
            host_config: OnceCell::new(),
        }
    }

    fn build_history_path(entity_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let start = start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Millis, true);
        format!(
            "/api/history/period/{}?filter_entity_id={}&end_time={}\
             &significant_changes_only=1&minimal_response&no_attributes&skip_initial_state",
            urlencoding::encode(&start),
            urlencoding::encode(entity_id),
            urlencoding::encode(&end),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.host, path_and_query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to Home Assistant")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Home Assistant request failed with status {}: {}",
                status,
                body
            );
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse Home Assistant response")
    }

    /// Configured language, else the host's. `/api/config` is read once; a
    /// failed read is retried on the next snapshot.
    async fn host_language(&self) -> Option<String> {
        if self.language.is_some() {
            return self.language.clone();
        }

        let config = self
            .host_config
            .get_or_try_init(|| self.get_json::<HostConfig>("/api/config"))
            .await;
        match config {
            Ok(config) => config.language.clone(),
            Err(e) => {
                tracing::debug!("Could not read host language: {:#}", e);
                None
            }
        }
    }

    fn records_to_samples(records: Vec<Vec<HistoryRecord>>) -> Vec<Sample> {
        let mut samples: Vec<Sample> = records
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| {
                let timestamp = record.last_changed.or(record.last_updated)?;
                Some(Sample::new(timestamp, StateValue::from_json(&record.state)))
            })
            .collect();

        samples.sort_by_key(|s| s.timestamp);
        samples
    }

    fn records_to_states(records: Vec<StateRecord>) -> HashMap<String, EntityState> {
        records
            .into_iter()
            .map(|record| {
                let state = EntityState {
                    raw_state: record.state,
                    unit_of_measurement: record.attributes.unit_of_measurement,
                    friendly_name: record.attributes.friendly_name,
                };
                (record.entity_id, state)
            })
            .collect()
    }
}

#[async_trait]
impl HistoryRepository for HomeAssistantRepository {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        let path = Self::build_history_path(entity_id, start, end);
        tracing::debug!("Fetching history for {}", entity_id);

        let records: Vec<Vec<HistoryRecord>> = self
            .get_json(&path)
            .await
            .with_context(|| format!("History query for {} failed", entity_id))?;

        let samples = Self::records_to_samples(records);
        tracing::debug!("Got {} history samples for {}", samples.len(), entity_id);
        Ok(samples)
    }
}

#[async_trait]
impl StateRepository for HomeAssistantRepository {
    async fn fetch_states(&self) -> Result<StateSnapshot> {
        let records: Vec<StateRecord> = self.get_json("/api/states").await?;
        let mut snapshot = StateSnapshot::new(Self::records_to_states(records));
        if let Some(language) = self.host_language().await {
            snapshot = snapshot.with_language(language);
        }
        Ok(snapshot)
    }
}
