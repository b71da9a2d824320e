// Application state for HTTP handlers
use crate::application::history_cache::HistoryCache;
use crate::application::waterfall_service::WaterfallService;
use tokio::sync::Mutex;

pub struct AppState {
    pub waterfall_service: WaterfallService,
    /// Held across a whole refresh so overlapping requests see each other's fetches.
    pub history_cache: Mutex<HistoryCache>,
}

impl AppState {
    pub fn new(waterfall_service: WaterfallService) -> Self {
        Self {
            waterfall_service,
            history_cache: Mutex::new(HistoryCache::new()),
        }
    }
}
