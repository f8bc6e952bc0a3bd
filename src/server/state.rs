use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::query::QueryEngine;
use crate::store::{DatasetRegistry, DatasetSource};
use crate::websearch::WebSearchProxy;

/// Shared application state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<QueryEngine>,
    web_search: WebSearchProxy,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let registry = DatasetRegistry::new(DatasetSource::from_config(&config.data));
        let engine = QueryEngine::new(Arc::new(registry), config.data.academic_years.clone());
        let web_search = WebSearchProxy::new(&config.web_search)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                engine: Arc::new(engine),
                web_search,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn engine(&self) -> Arc<QueryEngine> {
        Arc::clone(&self.inner.engine)
    }

    pub fn web_search(&self) -> &WebSearchProxy {
        &self.inner.web_search
    }

    /// Run a query engine operation off the async runtime; first loads read files.
    pub async fn with_engine<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&QueryEngine) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.engine();
        tokio::task::spawn_blocking(move || op(&engine))
            .await
            .map_err(|e| AppError::Internal(format!("query task failed: {}", e)))?
    }
}
