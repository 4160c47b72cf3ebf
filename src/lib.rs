pub mod config;
pub mod error;
pub mod models;

// Criteria normalization and plan compilation
pub mod query;

// Tantivy-backed document store
pub mod indexer;

// Search facade and fail-open result mapping
pub mod service;

// Operator CLI
pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{RecipeDocument, StoredRecipe};
pub use query::{compile, compile_suggestion, QueryPlan, RawCriteria, SearchCriteria};
pub use service::{DocumentStore, RecipeLookup, RecipeSearch, SearchPage, SearchResult};
