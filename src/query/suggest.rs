use crate::query::plan::{Clause, Field, Projection, QueryPlan, ScoringMode, DEFAULT_STORE_SIZE};

/// Compile an autocomplete plan for `prefix`.
///
/// A name qualifies if its leading words match `prefix` case-insensitively (the last
/// word as a prefix), or if the raw name starts with `prefix` exactly. Only names are
/// returned, capped at the store's default size.
pub fn compile_suggestion(prefix: &str) -> QueryPlan {
    compile_suggestion_with_limit(prefix, DEFAULT_STORE_SIZE)
}

pub fn compile_suggestion_with_limit(prefix: &str, limit: usize) -> QueryPlan {
    QueryPlan {
        scoring: vec![
            Clause::PhrasePrefix {
                field: Field::Name,
                text: prefix.to_string(),
            },
            Clause::Prefix {
                field: Field::NameKeyword,
                value: prefix.to_string(),
            },
        ],
        scoring_mode: ScoringMode::Should,
        filters: Vec::new(),
        window: None,
        size: limit.max(1),
        projection: Projection::NameOnly,
    }
}
