//! Query engine
//!
//! Read-only operations over registry datasets: composite filtering,
//! identifier lookup, ranked name search and filter-value listing.

use super::filter::{CampusType, Criteria, Filter};
use super::ranking::{rank_hits, NameMatch};
use crate::error::{validate_name_query, AppError};
use crate::store::{Dataset, DatasetKey, DatasetRegistry, Record};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of name search results
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
/// Upper bound on the name search limit
pub const MAX_SEARCH_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub total: usize,
    pub results: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct NameSearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<Record>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FilterValues {
    pub degree: Vec<String>,
    pub campus_type: Vec<String>,
    pub academic_year: Vec<String>,
}

pub struct QueryEngine {
    registry: Arc<DatasetRegistry>,
    academic_years: Vec<String>,
}

impl QueryEngine {
    pub fn new(registry: Arc<DatasetRegistry>, academic_years: Vec<String>) -> Self {
        Self {
            registry,
            academic_years,
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Filter the selected dataset. Results keep dataset order.
    pub fn query(&self, key: &DatasetKey, criteria: &Criteria) -> Result<QueryResponse, AppError> {
        let dataset = self.dataset(key)?;
        let filter = Filter::new(criteria);

        let results: Vec<Record> = dataset
            .records()
            .iter()
            .filter(|r| filter.matches(r, &dataset.fields))
            .cloned()
            .collect();

        info!(
            "Query on dataset {} matched {} of {} records",
            key,
            results.len(),
            dataset.len()
        );

        Ok(QueryResponse {
            total: results.len(),
            results,
        })
    }

    /// Exact, case-sensitive identifier lookup. A miss is `Ok(None)`.
    pub fn get_by_id(&self, identifier: &str, key: &DatasetKey) -> Result<Option<Record>, AppError> {
        let dataset = self.dataset(key)?;
        let position = dataset.fields.identifier;

        let found = dataset
            .records()
            .iter()
            .find(|r| r.at(position).as_text().as_deref() == Some(identifier))
            .cloned();

        debug!(
            "Lookup of {} in dataset {}: {}",
            identifier,
            key,
            if found.is_some() { "hit" } else { "miss" }
        );
        Ok(found)
    }

    /// Ranked substring search on the name column.
    ///
    /// `total` counts every hit; `results` is truncated to the limit after ranking.
    pub fn search_by_name(
        &self,
        name: &str,
        limit: Option<usize>,
        key: &DatasetKey,
    ) -> Result<NameSearchResponse, AppError> {
        let query = validate_name_query(name)?;
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
        let dataset = self.dataset(key)?;
        let needle = query.to_lowercase();
        let position = dataset.fields.name;

        let hits: Vec<(NameMatch, &Record)> = dataset
            .records()
            .iter()
            .filter_map(|r| {
                let name = r.at(position).as_text()?;
                NameMatch::classify(&name, &needle).map(|kind| (kind, r))
            })
            .collect();

        let total = hits.len();
        let results: Vec<Record> = rank_hits(hits).into_iter().take(limit).cloned().collect();

        info!(
            "Name search {:?} on dataset {}: {} hits, returning {}",
            query,
            key,
            total,
            results.len()
        );

        Ok(NameSearchResponse {
            query: query.to_string(),
            total,
            results,
        })
    }

    /// Distinct programs in the dataset plus the fixed enumerations
    pub fn list_filter_values(&self, key: &DatasetKey) -> Result<FilterValues, AppError> {
        let dataset = self.dataset(key)?;
        let position = dataset.fields.program;

        let degree: BTreeSet<String> = dataset
            .records()
            .iter()
            .filter_map(|r| r.at(position).as_text())
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(FilterValues {
            degree: degree.into_iter().collect(),
            campus_type: CampusType::ALL.iter().map(|c| c.label().to_string()).collect(),
            academic_year: self.academic_years.clone(),
        })
    }

    fn dataset(&self, key: &DatasetKey) -> Result<Arc<Dataset>, AppError> {
        Ok(self.registry.get(key)?)
    }
}
