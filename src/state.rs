use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::observer::ObserverPipeline;

/// Shared handler state: the document store, the write pipeline and the
/// configuration the server was started with
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub pipeline: Arc<ObserverPipeline>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let pipeline = ObserverPipeline::standard(&config.bootstrap);
        tracing::debug!("Observer pipeline ready with {} observers", pipeline.observer_count());
        Self {
            store,
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }
}
