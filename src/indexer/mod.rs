// Recipe search index
// Schema and tantivy execution of compiled query plans

pub mod schema;
pub mod search;

// Re-exports
pub use schema::RecipeSchema;
pub use search::SearchIndex;
