// HTTP request handlers
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Render the waterfall card against the host's current states
pub async fn get_waterfall(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    let snapshot = match state.waterfall_service.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Error fetching entity states: {:#}", e);
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    // Refresh a copy; the stored cache is only replaced once the refresh
    // completes, so a dropped request leaves it intact.
    let view = {
        let mut cache = state.history_cache.lock().await;
        let refresh = state
            .waterfall_service
            .refresh(cache.clone(), &snapshot, Utc::now())
            .await;
        *cache = refresh.cache;
        refresh.view
    };

    match json_response(&view, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Selecting an entity's strip: returns the event the host should act on
pub async fn more_info(
    Path(entity_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(event) = state.waterfall_service.select_entity(&entity_id) else {
        tracing::debug!("More-info requested for unknown entity {}", entity_id);
        return StatusCode::NOT_FOUND.into_response();
    };

    tracing::info!("More-info selected for {}", event.entity_id);

    match json_response(&event, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::history_repository::{HistoryRepository, StateRepository};
    use crate::application::waterfall_service::WaterfallService;
    use crate::domain::entity::{CardSettings, EntitySettings};
    use crate::domain::state::{EntityState, Sample, StateSnapshot};
    use async_trait::async_trait;
    use chrono::DateTime;
    use serde_json::json;

    struct EmptyHistory;

    #[async_trait]
    impl HistoryRepository for EmptyHistory {
        async fn fetch_history(
            &self,
            _entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<Sample>> {
            Ok(Vec::new())
        }
    }

    /// Never answers for `sensor.slow`.
    struct HangingHistory;

    #[async_trait]
    impl HistoryRepository for HangingHistory {
        async fn fetch_history(
            &self,
            entity_id: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<Sample>> {
            if entity_id == "sensor.slow" {
                std::future::pending::<()>().await;
            }
            Ok(Vec::new())
        }
    }

    struct States(Option<StateSnapshot>);

    #[async_trait]
    impl StateRepository for States {
        async fn fetch_states(&self) -> anyhow::Result<StateSnapshot> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("host offline"))
        }
    }

    fn app_state(snapshot: Option<StateSnapshot>) -> Arc<AppState> {
        let card = CardSettings {
            title: None,
            height: 60,
            compact: false,
            entities: vec![EntitySettings::new("sensor.temp")],
        };
        let service =
            WaterfallService::new(Arc::new(EmptyHistory), Arc::new(States(snapshot)), card);
        Arc::new(AppState::new(service))
    }

    fn snapshot() -> StateSnapshot {
        StateSnapshot::new(
            [("sensor.temp".to_string(), EntityState::new(json!("72")))]
                .into_iter()
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_get_waterfall_refreshes_cache() {
        let state = app_state(Some(snapshot()));

        let response = get_waterfall(HeaderMap::new(), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cache = state.history_cache.lock().await;
        assert_eq!(cache.buckets("sensor.temp").map(<[_]>::len), Some(48));
        assert!(cache.last_fetch("sensor.temp").is_some());
    }

    #[tokio::test]
    async fn test_dropped_request_keeps_cache() {
        let card = CardSettings {
            title: None,
            height: 60,
            compact: false,
            entities: vec![
                EntitySettings::new("sensor.fast"),
                EntitySettings::new("sensor.slow"),
            ],
        };
        let snapshot = StateSnapshot::new(
            ["sensor.fast", "sensor.slow"]
                .into_iter()
                .map(|id| (id.to_string(), EntityState::new(json!("20"))))
                .collect(),
        );
        let service =
            WaterfallService::new(Arc::new(HangingHistory), Arc::new(States(Some(snapshot))), card);
        let state = Arc::new(AppState::new(service));
        state
            .history_cache
            .lock()
            .await
            .store("sensor.fast", Utc::now(), vec![Some(20.0); 48]);

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            get_waterfall(HeaderMap::new(), State(state.clone())),
        )
        .await;

        assert!(result.is_err());
        let cache = state.history_cache.lock().await;
        assert_eq!(cache.buckets("sensor.fast"), Some(&[Some(20.0); 48][..]));
        assert!(cache.last_fetch("sensor.fast").is_some());
        assert_eq!(cache.buckets("sensor.slow"), None);
    }

    #[tokio::test]
    async fn test_get_waterfall_without_states_is_bad_gateway() {
        let state = app_state(None);

        let response = get_waterfall(HeaderMap::new(), State(state)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_more_info() {
        let state = app_state(Some(snapshot()));

        let found = more_info(
            Path("sensor.temp".to_string()),
            HeaderMap::new(),
            State(state.clone()),
        )
        .await;
        let missing =
            more_info(Path("sensor.other".to_string()), HeaderMap::new(), State(state)).await;

        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
