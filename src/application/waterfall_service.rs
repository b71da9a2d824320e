// Waterfall service - Refresh stale histories and build the card view
use crate::application::history_cache::HistoryCache;
use crate::application::history_repository::{HistoryRepository, StateRepository};
use crate::application::render::render_card;
use crate::domain::bucket::bucketize;
use crate::domain::entity::CardSettings;
use crate::domain::state::StateSnapshot;
use crate::domain::waterfall::{MoreInfoEvent, WaterfallView};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;

/// Result of one refresh: the updated cache to keep and the view to serve.
#[derive(Debug, Clone)]
pub struct Refresh {
    pub cache: HistoryCache,
    pub view: WaterfallView,
}

#[derive(Clone)]
pub struct WaterfallService {
    history: Arc<dyn HistoryRepository>,
    states: Arc<dyn StateRepository>,
    card: CardSettings,
}

impl WaterfallService {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        states: Arc<dyn StateRepository>,
        card: CardSettings,
    ) -> Self {
        Self {
            history,
            states,
            card,
        }
    }

    pub async fn snapshot(&self) -> anyhow::Result<StateSnapshot> {
        self.states.fetch_states().await
    }

    /// Refetch and rebucket every entity whose cached history is stale, then
    /// render the card against `snapshot`.
    pub async fn refresh(
        &self,
        cache: HistoryCache,
        snapshot: &StateSnapshot,
        now: DateTime<Utc>,
    ) -> Refresh {
        let cache = self.refresh_histories(cache, now).await;
        let view = render_card(&self.card, snapshot, &cache, now);
        Refresh { cache, view }
    }

    /// Fetches for stale entities run concurrently and are joined before any
    /// bucketing. A failed fetch only affects its own entity.
    pub async fn refresh_histories(&self, cache: HistoryCache, now: DateTime<Utc>) -> HistoryCache {
        let stale = cache.stale_entities(&self.card.entities, now);
        if stale.is_empty() {
            tracing::debug!("All {} histories are fresh", self.card.entities.len());
            return cache;
        }

        tracing::debug!("Refreshing {} stale histories", stale.len());

        let fetches = stale.into_iter().map(|settings| async move {
            let (start, end) = settings.window(now);
            let result = self
                .history
                .fetch_history(&settings.entity_id, start, end)
                .await;
            (settings, start, end, result)
        });
        let results = join_all(fetches).await;

        let mut cache = cache;
        let mut failed = 0;
        for (settings, start, end, result) in results {
            let entity_id = settings.entity_id.as_str();
            let samples = match result {
                Ok(samples) => samples,
                Err(e) => {
                    tracing::error!("Error fetching history for {}: {:#}", entity_id, e);
                    failed += 1;
                    cache.store_failed(entity_id, vec![settings.default_value; settings.intervals]);
                    continue;
                }
            };

            match bucketize(&samples, settings.intervals, start, end, settings.default_value) {
                Ok(buckets) => {
                    tracing::debug!("Bucketized {} samples for {}", samples.len(), entity_id);
                    cache.store(entity_id, now, buckets);
                }
                Err(e) => {
                    tracing::error!("Cannot bucketize history for {}: {}", entity_id, e);
                    failed += 1;
                    cache.store_failed(entity_id, vec![settings.default_value; settings.intervals]);
                }
            }
        }

        if failed > 0 {
            tracing::warn!("{} history fetches failed, retrying on next refresh", failed);
        }

        cache
    }

    /// Event for a selected entity, or `None` if it is not on this card.
    pub fn select_entity(&self, entity_id: &str) -> Option<MoreInfoEvent> {
        self.card
            .entity(entity_id)
            .map(|settings| MoreInfoEvent::new(&settings.entity_id))
    }
}
