// Repository traits for the host's history and state APIs
use crate::domain::state::{Sample, StateSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Significant state changes of one entity in `[start, end]`, ascending by time
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Sample>>;
}

#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Current state of every entity the host knows about
    async fn fetch_states(&self) -> anyhow::Result<StateSnapshot>;
}
