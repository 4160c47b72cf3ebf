use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED,
    STRING, TEXT,
};
use tantivy::tokenizer::{LowerCaser, RawTokenizer, TextAnalyzer};
use tantivy::Index;

use crate::query::plan::Field as PlanField;

/// Tokenizer keeping the whole value as one lowercased token
pub const NAME_PREFIX_TOKENIZER: &str = "raw_lowercase";

/// Schema for the recipe search index
#[derive(Clone)]
pub struct RecipeSchema {
    pub schema: Schema,
    pub id: Field,
    pub name: Field,
    pub name_keyword: Field,
    pub name_prefix: Field,
    pub ingredients: Field,
    pub ingredients_keyword: Field,
    pub tags: Field,
    pub calories: Field,
    pub carbohydrate: Field,
    pub protein: Field,
    pub fat: Field,
    pub document: Field,
}

impl RecipeSchema {
    pub fn new() -> Self {
        let mut schema_builder = Schema::builder();

        // Store-assigned ID (exact lookup)
        let id = schema_builder.add_text_field("id", STRING | STORED);

        // Name (full text, fuzzy matching)
        let name = schema_builder.add_text_field("name", TEXT | STORED);

        // Name, untouched (exact prefix)
        let name_keyword = schema_builder.add_text_field("name_keyword", STRING);

        // Name, lowercased single token (anchored phrase prefix)
        let name_prefix = schema_builder.add_text_field(
            "name_prefix",
            TextOptions::default().set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(NAME_PREFIX_TOKENIZER)
                    .set_index_option(IndexRecordOption::Basic),
            ),
        );

        // One value per ingredient line
        let ingredients = schema_builder.add_text_field("ingredients", TEXT);
        let ingredients_keyword = schema_builder.add_text_field("ingredients_keyword", STRING);

        // Dietary tags (exact)
        let tags = schema_builder.add_text_field("tags", STRING);

        // Nutrients (range filters)
        let calories = schema_builder.add_i64_field("calories", INDEXED | FAST);
        let carbohydrate = schema_builder.add_i64_field("carbohydrate", INDEXED | FAST);
        let protein = schema_builder.add_i64_field("protein", INDEXED | FAST);
        let fat = schema_builder.add_i64_field("fat", INDEXED | FAST);

        // Full document as JSON, returned with hits
        let document = schema_builder.add_text_field("document", STORED);

        let schema = schema_builder.build();

        Self {
            schema,
            id,
            name,
            name_keyword,
            name_prefix,
            ingredients,
            ingredients_keyword,
            tags,
            calories,
            carbohydrate,
            protein,
            fat,
            document,
        }
    }

    /// Index field backing a plan field
    pub fn field(&self, field: PlanField) -> Field {
        match field {
            PlanField::Name => self.name,
            PlanField::NameKeyword => self.name_keyword,
            PlanField::Ingredients => self.ingredients,
            PlanField::Tags => self.tags,
            PlanField::Calories => self.calories,
            PlanField::Carbohydrate => self.carbohydrate,
            PlanField::Protein => self.protein,
            PlanField::Fat => self.fat,
        }
    }

    /// Register the custom tokenizers this schema references
    pub fn register_tokenizers(index: &Index) {
        index.tokenizers().register(
            NAME_PREFIX_TOKENIZER,
            TextAnalyzer::builder(RawTokenizer::default())
                .filter(LowerCaser)
                .build(),
        );
    }
}

impl Default for RecipeSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = RecipeSchema::new();
        assert!(schema.schema.get_field("name").is_ok());
        assert!(schema.schema.get_field("ingredients").is_ok());
        assert!(schema.schema.get_field("tags").is_ok());
        assert!(schema.schema.get_field("calories").is_ok());
    }

    #[test]
    fn test_plan_fields_map_to_distinct_index_fields() {
        let schema = RecipeSchema::new();
        assert_eq!(schema.field(PlanField::Name), schema.name);
        assert_eq!(schema.field(PlanField::NameKeyword), schema.name_keyword);
        assert_ne!(
            schema.field(PlanField::Carbohydrate),
            schema.field(PlanField::Calories)
        );
    }
}
