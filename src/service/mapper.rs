use serde::Serialize;
use tracing::warn;

use crate::models::StoredRecipe;
use crate::query::Pagination;
use crate::service::store::StoreResponse;
use crate::Result;

/// Matching documents for one page, in store rank order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub items: Vec<StoredRecipe>,
    pub total_matches: usize,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A page of results plus navigation flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    #[serde(flatten)]
    pub result: SearchResult,
    pub pagination: Pagination,
}

impl SearchPage {
    pub fn new(result: SearchResult, page: usize, per_page: usize) -> Self {
        let pagination = Pagination::new(page, per_page, result.total_matches);
        Self { result, pagination }
    }
}

/// Outcome of a single-document lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeLookup {
    Found(StoredRecipe),
    NotFound,
}

impl RecipeLookup {
    pub fn into_option(self) -> Option<StoredRecipe> {
        match self {
            RecipeLookup::Found(recipe) => Some(recipe),
            RecipeLookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RecipeLookup::Found(_))
    }
}

/// Convert a store outcome into a caller-visible result.
///
/// Search is fail-open: any store error yields an empty, zero-count result. This is the
/// only place store errors are absorbed.
pub fn map_outcome(outcome: Result<StoreResponse>) -> SearchResult {
    match outcome {
        Ok(response) => SearchResult {
            items: response.hits,
            total_matches: response.total,
        },
        Err(e) => {
            warn!("Search failed, returning no results: {}", e.log_safe());
            SearchResult::empty()
        }
    }
}

/// Convert a lookup outcome. Store errors degrade to `NotFound`.
pub fn map_lookup(id: &str, outcome: Result<Option<StoredRecipe>>) -> RecipeLookup {
    match outcome {
        Ok(Some(recipe)) => RecipeLookup::Found(recipe),
        Ok(None) => RecipeLookup::NotFound,
        Err(e) => {
            warn!("Lookup of recipe {} failed: {}", id, e.log_safe());
            RecipeLookup::NotFound
        }
    }
}
