use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::calculate::{with_deadline, AnalyticsError, RequestContext};
use crate::config::AppConfig;
use crate::storage::StatsStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StatsStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn StatsStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Fresh memoization scope for one request.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.store.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.request_timeout_seconds)
    }

    /// Run a request future under the configured timeout.
    pub async fn deadline<T, F>(&self, fut: F) -> Result<T, AnalyticsError>
    where
        F: Future<Output = Result<T, AnalyticsError>>,
    {
        with_deadline(self.request_timeout(), fut).await
    }
}
