use crate::error::{Error, Result};
use crate::indexer::schema::RecipeSchema;
use crate::models::{RecipeDocument, StoredRecipe};
use crate::query::plan::{Clause, Field as PlanField, Projection, QueryPlan, ScoringMode};
use crate::service::store::{DocumentStore, StoreResponse};
use std::ops::Bound;
use std::path::Path;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, ConstScoreQuery, DisjunctionMaxQuery, EmptyQuery,
    FuzzyTermQuery, Occur, PhraseQuery, Query, RangeQuery, RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, OwnedValue};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

const DEFAULT_WRITER_MEMORY: usize = 50_000_000;

/// Prefix matches are constant-score; word-prefix hits outrank exact-prefix-only hits.
/// Hits with equal scores come back in index order.
const PHRASE_PREFIX_BOOST: f32 = 2.0;

/// Embedded tantivy index implementing [`DocumentStore`]
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    schema: RecipeSchema,
    writer_memory: usize,
}

impl SearchIndex {
    /// Create or open search index
    pub fn new(index_path: impl AsRef<Path>) -> Result<Self> {
        let path = index_path.as_ref();
        let schema = RecipeSchema::new();

        // Create directory if it doesn't exist
        std::fs::create_dir_all(path)?;

        // Open or create index
        let index = if path.join("meta.json").exists() {
            Index::open_in_dir(path)
                .map_err(|e| Error::Search(format!("Failed to open index: {e}")))?
        } else {
            Index::create_in_dir(path, schema.schema.clone())
                .map_err(|e| Error::Search(format!("Failed to create index: {e}")))?
        };

        info!("Search index initialized at {:?}", path);

        Self::from_index(index, schema)
    }

    /// Index held entirely in memory
    pub fn in_memory() -> Result<Self> {
        let schema = RecipeSchema::new();
        let index = Index::create_in_ram(schema.schema.clone());
        Self::from_index(index, schema)
    }

    fn from_index(index: Index, schema: RecipeSchema) -> Result<Self> {
        RecipeSchema::register_tokenizers(&index);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| Error::Search(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            reader,
            schema,
            writer_memory: DEFAULT_WRITER_MEMORY,
        })
    }

    pub fn with_writer_memory(mut self, bytes: usize) -> Self {
        self.writer_memory = bytes;
        self
    }

    /// Get index writer
    pub fn writer(&self) -> Result<IndexWriter> {
        self.index
            .writer(self.writer_memory)
            .map_err(|e| Error::Search(format!("Failed to create writer: {e}")))
    }

    /// Index a recipe, replacing any document with the same ID.
    ///
    /// A fresh ID is assigned when `id` is `None`. Returns the ID used.
    pub fn index_recipe(
        &self,
        writer: &mut IndexWriter,
        id: Option<&str>,
        recipe: &RecipeDocument,
    ) -> Result<String> {
        let id = match id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        debug!("Indexing recipe: {}", id);

        let mut doc = doc!(
            self.schema.id => id.clone(),
            self.schema.name => recipe.name.clone(),
            self.schema.name_keyword => recipe.name.clone(),
            self.schema.name_prefix => collapse_whitespace(&recipe.name),
            self.schema.document => serde_json::to_string(recipe)?,
        );

        for ingredient in &recipe.ingredients {
            doc.add_text(self.schema.ingredients, ingredient);
            doc.add_text(self.schema.ingredients_keyword, ingredient);
        }

        for tag in &recipe.tags {
            doc.add_text(self.schema.tags, tag.trim().to_lowercase());
        }

        let nutrients = [
            (self.schema.calories, recipe.calories),
            (self.schema.carbohydrate, recipe.carbohydrate),
            (self.schema.protein, recipe.protein),
            (self.schema.fat, recipe.fat),
        ];
        for (field, value) in nutrients {
            if let Some(value) = value {
                doc.add_i64(field, value);
            }
        }

        self.delete_recipe(writer, &id);
        writer.add_document(doc)?;

        Ok(id)
    }

    /// Delete a recipe from the index. Takes effect on the next commit.
    pub fn delete_recipe(&self, writer: &mut IndexWriter, id: &str) {
        writer.delete_term(Term::from_field_text(self.schema.id, id));
    }

    /// Commit changes and make them visible to searches
    pub fn commit(&self, writer: &mut IndexWriter) -> Result<()> {
        writer
            .commit()
            .map_err(|e| Error::Search(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| Error::Search(format!("Failed to reload reader: {e}")))?;
        Ok(())
    }

    /// Number of searchable documents
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Translate a plan into a tantivy query
    fn build_query(&self, plan: &QueryPlan) -> Result<Box<dyn Query>> {
        if plan.is_match_all() {
            return Ok(Box::new(AllQuery));
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        if !plan.scoring.is_empty() {
            let scoring = plan
                .scoring
                .iter()
                .map(|clause| self.clause_query(clause))
                .collect::<Result<Vec<_>>>()?;

            match plan.scoring_mode {
                ScoringMode::Must => {
                    clauses.extend(scoring.into_iter().map(|query| (Occur::Must, query)));
                }
                ScoringMode::Should => {
                    clauses.push((Occur::Must, Box::new(DisjunctionMaxQuery::new(scoring))));
                }
            }
        }

        // Filters restrict membership without contributing to the score
        for filter in &plan.filters {
            let query = self.clause_query(filter)?;
            clauses.push((Occur::Must, Box::new(ConstScoreQuery::new(query, 0.0))));
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn clause_query(&self, clause: &Clause) -> Result<Box<dyn Query>> {
        match clause {
            Clause::Fuzzy { field, text } => {
                let index_field = self.schema.field(*field);
                let tokens = self.tokens(index_field, text)?;
                if tokens.is_empty() {
                    return Ok(Box::new(EmptyQuery));
                }

                let subqueries = tokens
                    .into_iter()
                    .map(|token| {
                        let distance = auto_fuzziness(&token);
                        let term = Term::from_field_text(index_field, &token);
                        (
                            Occur::Should,
                            Box::new(FuzzyTermQuery::new(term, distance, true)) as Box<dyn Query>,
                        )
                    })
                    .collect();
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }

            Clause::AnyTerms { field, values } => {
                let mut subqueries = Vec::new();
                for value in values {
                    if let Some(query) = self.value_query(*field, value)? {
                        subqueries.push((Occur::Should, query));
                    }
                }
                if subqueries.is_empty() {
                    return Ok(Box::new(EmptyQuery));
                }
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }

            Clause::AllTerms {
                field,
                values,
                minimum_should_match,
            } => {
                if values.is_empty() {
                    return Ok(Box::new(AllQuery));
                }

                let occur = if *minimum_should_match >= values.len() {
                    Occur::Must
                } else if *minimum_should_match <= 1 {
                    Occur::Should
                } else {
                    return Err(Error::Search(format!(
                        "Unsupported minimum_should_match {} of {} values",
                        minimum_should_match,
                        values.len()
                    )));
                };

                let mut subqueries = Vec::new();
                for value in values {
                    match self.value_query(*field, value)? {
                        Some(query) => subqueries.push((occur, query)),
                        // A required value that cannot be indexed can never match
                        None if occur == Occur::Must => return Ok(Box::new(EmptyQuery)),
                        None => {}
                    }
                }
                Ok(Box::new(BooleanQuery::new(subqueries)))
            }

            Clause::Range { field, gte, lte } => {
                let index_field = self.schema.field(*field);
                let field_name = self.schema.schema.get_field_name(index_field).to_string();
                Ok(Box::new(RangeQuery::new_i64_bounds(
                    field_name,
                    inclusive(*gte),
                    inclusive(*lte),
                )))
            }

            Clause::PhrasePrefix { field, text } => {
                if *field != PlanField::Name {
                    return Err(Error::Search(format!(
                        "Phrase prefix is not indexed for {}",
                        field.path()
                    )));
                }
                let prefix = collapse_whitespace(text).to_lowercase();
                let pattern = format!("{}.*", regex::escape(&prefix));
                let query = RegexQuery::from_pattern(&pattern, self.schema.name_prefix)?;
                Ok(Box::new(BoostQuery::new(Box::new(query), PHRASE_PREFIX_BOOST)))
            }

            Clause::Prefix { field, value } => {
                let pattern = format!("{}.*", regex::escape(value));
                Ok(Box::new(RegexQuery::from_pattern(
                    &pattern,
                    self.schema.field(*field),
                )?))
            }
        }
    }

    /// Match one value as a phrase, or `None` if it produces no tokens
    fn value_query(&self, field: PlanField, value: &str) -> Result<Option<Box<dyn Query>>> {
        let index_field = self.schema.field(field);
        let mut terms: Vec<Term> = self
            .tokens(index_field, value)?
            .iter()
            .map(|token| Term::from_field_text(index_field, token))
            .collect();

        let query: Box<dyn Query> = match terms.len() {
            0 => return Ok(None),
            1 => Box::new(TermQuery::new(terms.remove(0), record_option(field))),
            _ => Box::new(PhraseQuery::new(terms)),
        };
        Ok(Some(query))
    }

    fn tokens(&self, field: Field, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    fn to_recipe(&self, doc: &TantivyDocument, projection: Projection) -> Result<StoredRecipe> {
        let id = match doc.get_first(self.schema.id) {
            Some(OwnedValue::Str(s)) => s.to_string(),
            _ => return Err(Error::Internal("Indexed document has no id".to_string())),
        };

        let document = match projection {
            Projection::NameOnly => match doc.get_first(self.schema.name) {
                Some(OwnedValue::Str(s)) => RecipeDocument::name_only(s.as_str()),
                _ => RecipeDocument::default(),
            },
            Projection::Full => match doc.get_first(self.schema.document) {
                Some(OwnedValue::Str(s)) => serde_json::from_str(s)?,
                _ => {
                    return Err(Error::Internal(format!(
                        "Indexed document {id} has no stored source"
                    )))
                }
            },
        };

        Ok(StoredRecipe { id, document })
    }
}

impl DocumentStore for SearchIndex {
    fn execute(&self, plan: &QueryPlan) -> Result<StoreResponse> {
        let query = self.build_query(plan)?;
        let searcher = self.reader.searcher();

        // Windows past the end of the corpus are empty; keep the collector bounded
        let num_docs = searcher.num_docs() as usize;
        let (offset, limit) = plan.bounds();
        let offset = offset.min(num_docs);
        let limit = limit.clamp(1, num_docs.max(1));

        let (top_docs, total) = searcher
            .search(
                &*query,
                &(TopDocs::with_limit(limit).and_offset(offset), Count),
            )
            .map_err(|e| Error::Search(format!("Search failed: {e}")))?;

        let hits = top_docs
            .into_iter()
            .map(|(_score, doc_address)| {
                let doc = searcher.doc::<TantivyDocument>(doc_address)?;
                self.to_recipe(&doc, plan.projection)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StoreResponse { hits, total })
    }

    fn fetch(&self, id: &str) -> Result<Option<StoredRecipe>> {
        let searcher = self.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(self.schema.id, id),
            IndexRecordOption::Basic,
        );

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| Error::Search(format!("Lookup failed: {e}")))?;

        match top_docs.into_iter().next() {
            Some((_score, doc_address)) => {
                let doc = searcher.doc::<TantivyDocument>(doc_address)?;
                Ok(Some(self.to_recipe(&doc, Projection::Full)?))
            }
            None => Ok(None),
        }
    }
}

/// Edit distance allowed for a token: exact up to 2 chars, 1 edit up to 5, else 2
fn auto_fuzziness(token: &str) -> u8 {
    match token.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn record_option(field: PlanField) -> IndexRecordOption {
    match field {
        PlanField::Name | PlanField::Ingredients => IndexRecordOption::WithFreqs,
        _ => IndexRecordOption::Basic,
    }
}

fn inclusive(bound: Option<i64>) -> Bound<i64> {
    match bound {
        Some(value) => Bound::Included(value),
        None => Bound::Unbounded,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
