// Per-entity cache of processed histories
use crate::domain::entity::EntitySettings;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CachedHistory {
    /// Time of the last successful fetch; `None` after a failed one.
    pub fetched_at: Option<DateTime<Utc>>,
    pub buckets: Vec<Option<f64>>,
}

/// Processed bucket sequences keyed by entity id.
///
/// The cache is a plain value: a refresh takes it, decides which entities are
/// stale, and hands back an updated copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryCache {
    entries: HashMap<String, CachedHistory>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// An entity needs a new fetch when it was never fetched successfully or
    /// when more than `refresh_interval` has passed since.
    pub fn is_stale(
        &self,
        entity_id: &str,
        now: DateTime<Utc>,
        refresh_interval: Duration,
    ) -> bool {
        match self.last_fetch(entity_id) {
            Some(fetched_at) => now - fetched_at > refresh_interval,
            None => true,
        }
    }

    pub fn stale_entities<'a>(
        &self,
        entities: &'a [EntitySettings],
        now: DateTime<Utc>,
    ) -> Vec<&'a EntitySettings> {
        entities
            .iter()
            .filter(|e| self.is_stale(&e.entity_id, now, e.refresh_interval()))
            .collect()
    }

    pub fn store(
        &mut self,
        entity_id: impl Into<String>,
        fetched_at: DateTime<Utc>,
        buckets: Vec<Option<f64>>,
    ) {
        self.entries.insert(
            entity_id.into(),
            CachedHistory {
                fetched_at: Some(fetched_at),
                buckets,
            },
        );
    }

    /// Record placeholder buckets for a failed fetch without marking the entity
    /// fresh, so the next refresh retries it.
    pub fn store_failed(&mut self, entity_id: impl Into<String>, buckets: Vec<Option<f64>>) {
        self.entries.insert(
            entity_id.into(),
            CachedHistory {
                fetched_at: None,
                buckets,
            },
        );
    }

    pub fn last_fetch(&self, entity_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(entity_id).and_then(|e| e.fetched_at)
    }

    pub fn buckets(&self, entity_id: &str) -> Option<&[Option<f64>]> {
        self.entries.get(entity_id).map(|e| e.buckets.as_slice())
    }
}
