// Criteria normalization and query compilation.
// Everything here is pure: no store handle, no I/O.

pub mod compiler;
pub mod criteria;
pub mod pagination;
pub mod plan;
pub mod suggest;

// Re-exports
pub use compiler::{compile, NutrientMapping, QueryCompiler};
pub use criteria::{normalize, NutrientRange, PageLimits, RawCriteria, SearchCriteria};
pub use pagination::{PageWindow, Pagination};
pub use plan::{Clause, Field, Projection, QueryPlan, ScoringMode};
pub use suggest::compile_suggestion;
