//! Web search pass-through
//!
//! Looks up a student's public profile through a third-party search API
//! (SerpAPI-compatible: `q`, `engine` and `api_key` query parameters) and
//! hands the provider's JSON back unchanged.

use crate::config::WebSearchConfig;
use crate::error::AppError;
use crate::http::client_with_timeout;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Request body of `POST /proxy/linkedin-search`
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchRequest {
    pub name: String,
    #[serde(default)]
    pub org: Option<String>,
}

impl WebSearchRequest {
    /// Provider query restricted to LinkedIn profile pages
    pub fn search_query(&self) -> Result<String, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("name cannot be empty".to_string()));
        }
        let mut query = name.to_string();
        if let Some(org) = self.org.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
            query.push(' ');
            query.push_str(org);
        }
        query.push_str(" site:linkedin.com/in");
        Ok(query)
    }
}

pub struct WebSearchProxy {
    client: Client,
    endpoint: Url,
    engine: String,
    api_key: Option<String>,
}

impl WebSearchProxy {
    pub fn new(config: &WebSearchConfig) -> Result<Self, AppError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            AppError::Internal(format!("Invalid web search endpoint {}: {}", config.endpoint, e))
        })?;
        Ok(Self {
            client: client_with_timeout(Duration::from_secs(config.timeout_secs))?,
            endpoint,
            engine: config.engine.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, query: &str) -> Result<Url, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("web search API key is not configured".to_string()))?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("engine", &self.engine)
            .append_pair("q", query)
            .append_pair("api_key", api_key);
        Ok(url)
    }

    /// Forward the lookup and return the provider's JSON verbatim
    pub async fn search(&self, request: &WebSearchRequest) -> Result<Value, AppError> {
        let query = request.search_query()?;
        let url = self.request_url(&query)?;

        info!("Web search for {:?}", query);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Web search provider answered {}", status);
            return Err(AppError::Upstream(format!("provider returned status {}", status)));
        }

        let body: Value = response.json().await?;
        debug!("Web search provider returned {} top-level keys", body.as_object().map_or(0, |o| o.len()));
        Ok(body)
    }
}
