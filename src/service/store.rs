use crate::models::StoredRecipe;
use crate::query::QueryPlan;
use crate::Result;

/// Raw outcome of executing a plan: the requested window of hits in rank order and the
/// number of documents matching the plan overall.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreResponse {
    pub hits: Vec<StoredRecipe>,
    pub total: usize,
}

/// Handle to the document store that executes compiled plans.
///
/// Implementations own their connection and any retry policy. Errors are reported as-is;
/// converting them into caller-visible results is the mapper's job.
pub trait DocumentStore: Send + Sync {
    fn execute(&self, plan: &QueryPlan) -> Result<StoreResponse>;

    /// Fetch a single document by ID; `Ok(None)` when it does not exist
    fn fetch(&self, id: &str) -> Result<Option<StoredRecipe>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn execute(&self, plan: &QueryPlan) -> Result<StoreResponse> {
        (**self).execute(plan)
    }

    fn fetch(&self, id: &str) -> Result<Option<StoredRecipe>> {
        (**self).fetch(id)
    }
}
