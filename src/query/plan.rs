use serde::Serialize;
use serde_json::{json, Value};

use crate::query::pagination::PageWindow;

/// Indexed fields a clause can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    NameKeyword,
    Ingredients,
    Tags,
    Calories,
    Carbohydrate,
    Protein,
    Fat,
}

impl Field {
    /// Field path in the query document
    pub fn path(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::NameKeyword => "name.keyword",
            Field::Ingredients => "ingredients",
            Field::Tags => "tags",
            Field::Calories => "calories",
            Field::Carbohydrate => "carbohydrate",
            Field::Protein => "protein",
            Field::Fat => "fat",
        }
    }
}

/// A single condition of a [`QueryPlan`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Typo-tolerant full-text match
    Fuzzy { field: Field, text: String },
    /// Matches when at least one value is present
    AnyTerms { field: Field, values: Vec<String> },
    /// Matches when at least `minimum_should_match` values are present
    AllTerms {
        field: Field,
        values: Vec<String>,
        minimum_should_match: usize,
    },
    /// Inclusive numeric range, either bound may be open
    Range {
        field: Field,
        gte: Option<i64>,
        lte: Option<i64>,
    },
    /// Leading words of the field, last word as a prefix
    PhrasePrefix { field: Field, text: String },
    /// Exact, case-sensitive prefix of the whole field value
    Prefix { field: Field, value: String },
}

impl Clause {
    pub fn field(&self) -> Field {
        match self {
            Clause::Fuzzy { field, .. }
            | Clause::AnyTerms { field, .. }
            | Clause::AllTerms { field, .. }
            | Clause::Range { field, .. }
            | Clause::PhrasePrefix { field, .. }
            | Clause::Prefix { field, .. } => *field,
        }
    }

    fn to_query_document(&self) -> Value {
        match self {
            Clause::Fuzzy { field, text } => json!({
                "match": { field.path(): { "query": text, "fuzziness": "AUTO" } }
            }),
            Clause::AnyTerms { field, values } => json!({
                "terms": { field.path(): values }
            }),
            Clause::AllTerms {
                field,
                values,
                minimum_should_match,
            } => json!({
                "terms_set": {
                    field.path(): {
                        "terms": values,
                        "minimum_should_match": minimum_should_match,
                    }
                }
            }),
            Clause::Range { field, gte, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { field.path(): bounds } })
            }
            Clause::PhrasePrefix { field, text } => json!({
                "match_phrase_prefix": { field.path(): text }
            }),
            Clause::Prefix { field, value } => json!({
                "prefix": { field.path(): value }
            }),
        }
    }
}

/// How scoring clauses combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Every scoring clause must match
    #[default]
    Must,
    /// At least one scoring clause must match; the best-scoring one ranks the document
    Should,
}

/// Which stored fields the store returns per hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Full,
    NameOnly,
}

/// Store-agnostic description of a search.
///
/// Filter clauses restrict membership without affecting rank. Scoring clauses rank
/// matching documents and combine according to `scoring_mode`. A plan with no clauses
/// matches the entire corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub scoring: Vec<Clause>,
    pub scoring_mode: ScoringMode,
    pub filters: Vec<Clause>,
    pub window: Option<PageWindow>,
    /// Result cap for unpaged plans
    pub size: usize,
    pub projection: Projection,
}

/// Number of hits a store returns when no window is given
pub const DEFAULT_STORE_SIZE: usize = 10;

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            scoring: Vec::new(),
            scoring_mode: ScoringMode::Must,
            filters: Vec::new(),
            window: None,
            size: DEFAULT_STORE_SIZE,
            projection: Projection::Full,
        }
    }
}

impl QueryPlan {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.scoring.is_empty() && self.filters.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.scoring.len() + self.filters.len()
    }

    /// Effective `(offset, limit)` the store should apply
    pub fn bounds(&self) -> (usize, usize) {
        match self.window {
            Some(window) => (window.offset, window.limit),
            None => (0, self.size),
        }
    }

    /// Render the plan as an Elasticsearch-style bool query body
    pub fn to_query_document(&self) -> Value {
        let query = if self.is_match_all() {
            json!({ "match_all": {} })
        } else if self.scoring_mode == ScoringMode::Should && self.filters.is_empty() {
            json!({ "dis_max": { "queries": clause_list(&self.scoring) } })
        } else {
            let mut bool_query = serde_json::Map::new();
            if !self.scoring.is_empty() {
                let must = match self.scoring_mode {
                    ScoringMode::Must => clause_list(&self.scoring),
                    ScoringMode::Should => {
                        json!([{ "dis_max": { "queries": clause_list(&self.scoring) } }])
                    }
                };
                bool_query.insert("must".to_string(), must);
            }
            if !self.filters.is_empty() {
                bool_query.insert("filter".to_string(), clause_list(&self.filters));
            }
            json!({ "bool": bool_query })
        };

        let (from, size) = self.bounds();
        let mut body = json!({ "query": query, "from": from, "size": size });
        if self.projection == Projection::NameOnly {
            body["_source"] = json!([Field::Name.path()]);
        }
        body
    }
}

fn clause_list(clauses: &[Clause]) -> Value {
    Value::Array(clauses.iter().map(Clause::to_query_document).collect())
}
