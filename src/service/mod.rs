// Search facade: normalize -> compile -> execute -> map.

pub mod mapper;
pub mod store;

use tracing::debug;

use crate::config::Settings;
use crate::query::suggest::compile_suggestion_with_limit;
use crate::query::{
    normalize, NutrientMapping, PageLimits, QueryCompiler, RawCriteria, SearchCriteria,
};

// Re-exports
pub use mapper::{map_lookup, map_outcome, RecipeLookup, SearchPage, SearchResult};
pub use store::{DocumentStore, StoreResponse};

/// Entry point for callers that need search results rather than plans.
///
/// Holds no mutable state; share it behind an `Arc` across request handlers.
pub struct RecipeSearch<S> {
    store: S,
    compiler: QueryCompiler,
    limits: PageLimits,
    suggestion_limit: usize,
}

impl<S: DocumentStore> RecipeSearch<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            compiler: QueryCompiler::default(),
            limits: PageLimits::default(),
            suggestion_limit: crate::query::plan::DEFAULT_STORE_SIZE,
        }
    }

    /// Build with the compiler and page policy from settings
    pub fn from_settings(store: S, settings: &Settings) -> Self {
        let mapping = if settings.search.legacy_nutrient_filters {
            NutrientMapping::LegacyCalories
        } else {
            NutrientMapping::PerNutrient
        };

        Self {
            store,
            compiler: QueryCompiler::new(mapping),
            limits: PageLimits {
                default_per_page: settings.pagination.default_per_page,
                max_per_page: settings.pagination.max_per_page,
            },
            suggestion_limit: settings.pagination.suggestion_limit,
        }
    }

    pub fn with_compiler(mut self, compiler: QueryCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    /// Normalize raw input with this service's page policy
    pub fn normalize(&self, raw: &RawCriteria) -> SearchCriteria {
        normalize(raw, &self.limits)
    }

    /// Normalize, then search
    pub fn search_raw(&self, raw: &RawCriteria) -> SearchPage {
        let criteria = self.normalize(raw);
        self.search(&criteria)
    }

    /// Run a search. Never fails; store errors yield an empty page.
    pub fn search(&self, criteria: &SearchCriteria) -> SearchPage {
        let plan = self.compiler.compile(criteria);
        let result = map_outcome(self.store.execute(&plan));

        debug!(
            "Search page {} returned {} of {} matches",
            criteria.page,
            result.items.len(),
            result.total_matches
        );

        SearchPage::new(result, criteria.page, criteria.per_page)
    }

    /// Recipe names for typeahead. Blank prefixes and store errors yield no names.
    pub fn suggest(&self, prefix: &str) -> Vec<String> {
        if prefix.trim().is_empty() {
            return Vec::new();
        }

        let plan = compile_suggestion_with_limit(prefix, self.suggestion_limit);
        let result = map_outcome(self.store.execute(&plan));

        let mut names: Vec<String> = Vec::with_capacity(result.items.len());
        for item in result.items {
            if !names.contains(&item.document.name) {
                names.push(item.document.name);
            }
        }
        names
    }

    /// Look up one recipe by its store ID
    pub fn get_recipe(&self, id: &str) -> RecipeLookup {
        if id.trim().is_empty() {
            return RecipeLookup::NotFound;
        }
        map_lookup(id, self.store.fetch(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecipeDocument, StoredRecipe};
    use crate::query::{Projection, QueryPlan};
    use crate::{Error, Result};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the last plan and answers from a fixed list
    struct RecordingStore {
        recipes: Vec<StoredRecipe>,
        last_plan: Mutex<Option<QueryPlan>>,
    }

    impl RecordingStore {
        fn new(names: &[&str]) -> Self {
            let recipes = names
                .iter()
                .enumerate()
                .map(|(i, name)| StoredRecipe {
                    id: i.to_string(),
                    document: RecipeDocument::name_only(*name),
                })
                .collect();
            Self {
                recipes,
                last_plan: Mutex::new(None),
            }
        }

        fn last_plan(&self) -> QueryPlan {
            self.last_plan.lock().unwrap().clone().unwrap()
        }
    }

    impl DocumentStore for RecordingStore {
        fn execute(&self, plan: &QueryPlan) -> Result<StoreResponse> {
            *self.last_plan.lock().unwrap() = Some(plan.clone());
            let (offset, limit) = plan.bounds();
            Ok(StoreResponse {
                hits: self.recipes.iter().skip(offset).take(limit).cloned().collect(),
                total: self.recipes.len(),
            })
        }

        fn fetch(&self, id: &str) -> Result<Option<StoredRecipe>> {
            Ok(self.recipes.iter().find(|r| r.id == id).cloned())
        }
    }

    struct FailingStore;

    impl DocumentStore for FailingStore {
        fn execute(&self, _plan: &QueryPlan) -> Result<StoreResponse> {
            Err(Error::Search("connection timed out".to_string()))
        }

        fn fetch(&self, _id: &str) -> Result<Option<StoredRecipe>> {
            Err(Error::Search("connection timed out".to_string()))
        }
    }

    #[test]
    fn test_search_raw_normalizes_and_pages() {
        let service = RecipeSearch::new(RecordingStore::new(&["a", "b", "c"]));
        let raw = RawCriteria::from_json(json!({ "page": "1", "perPage": "2", "tags": "vegan" }));

        let page = service.search_raw(&raw);
        assert_eq!(page.result.items.len(), 1);
        assert_eq!(page.result.total_matches, 3);
        assert!(page.pagination.has_prev);
        assert!(!page.pagination.has_next);

        let plan = service.store().last_plan();
        assert_eq!(plan.bounds(), (2, 2));
        assert_eq!(plan.filters.len(), 1);
    }

    #[test]
    fn test_search_fails_open() {
        let service = RecipeSearch::new(FailingStore);
        let page = service.search(&SearchCriteria::default());
        assert!(page.result.items.is_empty());
        assert_eq!(page.result.total_matches, 0);
        assert!(!page.pagination.has_next);
    }

    #[test]
    fn test_suggest_returns_unique_names() {
        let service = RecipeSearch::new(RecordingStore::new(&["Chili", "Chili", "Chips"]));
        assert_eq!(service.suggest("chi"), vec!["Chili", "Chips"]);

        let plan = service.store().last_plan();
        assert_eq!(plan.projection, Projection::NameOnly);
        assert_eq!(plan.window, None);
    }

    #[test]
    fn test_blank_suggest_skips_store() {
        let service = RecipeSearch::new(FailingStore);
        assert!(service.suggest("   ").is_empty());
        assert!(service.suggest("chi").is_empty());
    }

    #[test]
    fn test_get_recipe() {
        let service = RecipeSearch::new(RecordingStore::new(&["Soup"]));
        assert!(service.get_recipe("0").is_found());
        assert_eq!(service.get_recipe("missing"), RecipeLookup::NotFound);
        assert_eq!(service.get_recipe(""), RecipeLookup::NotFound);

        let service = RecipeSearch::new(FailingStore);
        assert_eq!(service.get_recipe("0"), RecipeLookup::NotFound);
    }

    #[test]
    fn test_legacy_mapping_from_settings() {
        let mut settings = Settings::for_index("/tmp/unused");
        settings.search.legacy_nutrient_filters = true;
        settings.pagination.default_per_page = 6;

        let service = RecipeSearch::from_settings(RecordingStore::new(&[]), &settings);
        assert_eq!(
            service.compiler().nutrient_mapping(),
            NutrientMapping::LegacyCalories
        );
        assert_eq!(service.normalize(&RawCriteria::new()).per_page, 6);
    }
}
