use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::criteria::{NutrientRange, SearchCriteria};
use crate::query::pagination::PageWindow;
use crate::query::plan::{Clause, Field, QueryPlan};

/// Which index field each nutrient range filters on.
///
/// Earlier deployments filtered the carbohydrate, protein and fat ranges against
/// `calories`. `LegacyCalories` reproduces that for clients that depend on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientMapping {
    #[default]
    PerNutrient,
    LegacyCalories,
}

impl NutrientMapping {
    fn field_for(self, nutrient: Field) -> Field {
        match self {
            NutrientMapping::PerNutrient => nutrient,
            NutrientMapping::LegacyCalories => Field::Calories,
        }
    }
}

/// Turns [`SearchCriteria`] into a [`QueryPlan`].
///
/// Each present criterion adds exactly one clause and absent criteria add none, so
/// compiling empty criteria yields a match-all plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCompiler {
    nutrient_mapping: NutrientMapping,
}

impl QueryCompiler {
    pub fn new(nutrient_mapping: NutrientMapping) -> Self {
        Self { nutrient_mapping }
    }

    pub fn nutrient_mapping(&self) -> NutrientMapping {
        self.nutrient_mapping
    }

    pub fn compile(&self, criteria: &SearchCriteria) -> QueryPlan {
        let mut plan = QueryPlan {
            window: Some(PageWindow::for_page(criteria.page, criteria.per_page)),
            ..QueryPlan::default()
        };

        if let Some(query) = criteria.query.as_deref().filter(|q| !q.is_empty()) {
            plan.scoring.push(Clause::Fuzzy {
                field: Field::Name,
                text: query.to_string(),
            });
        }

        if let Some(ingredients) = criteria.ingredients.as_ref().filter(|i| !i.is_empty()) {
            plan.scoring.push(Clause::AnyTerms {
                field: Field::Ingredients,
                values: ingredients.clone(),
            });
        }

        if let Some(tags) = criteria.tags.as_ref().filter(|t| !t.is_empty()) {
            plan.filters.push(Clause::AllTerms {
                field: Field::Tags,
                values: tags.clone(),
                minimum_should_match: tags.len(),
            });
        }

        let nutrients = [
            (Field::Calories, criteria.calories),
            (Field::Carbohydrate, criteria.carbohydrate),
            (Field::Protein, criteria.protein),
            (Field::Fat, criteria.fat),
        ];
        for (nutrient, range) in nutrients {
            if let Some(clause) = self.range_clause(nutrient, range) {
                plan.filters.push(clause);
            }
        }

        debug!(
            "Compiled search plan: {} scoring, {} filter clauses, window {:?}",
            plan.scoring.len(),
            plan.filters.len(),
            plan.window
        );

        plan
    }

    fn range_clause(&self, nutrient: Field, range: NutrientRange) -> Option<Clause> {
        if range.is_unbounded() {
            return None;
        }

        Some(Clause::Range {
            field: self.nutrient_mapping.field_for(nutrient),
            gte: range.min,
            lte: range.max,
        })
    }
}

/// Compile with the per-nutrient field mapping
pub fn compile(criteria: &SearchCriteria) -> QueryPlan {
    QueryCompiler::default().compile(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_criteria_compile_to_match_all() {
        let plan = compile(&SearchCriteria::default());
        assert!(plan.is_match_all());
        assert_eq!(plan.window, Some(PageWindow::for_page(0, 10)));
    }

    #[test]
    fn test_query_adds_fuzzy_name_clause() {
        let criteria = SearchCriteria {
            query: Some("chiken".to_string()),
            ..SearchCriteria::default()
        };
        let plan = compile(&criteria);
        assert_eq!(
            plan.scoring,
            vec![Clause::Fuzzy {
                field: Field::Name,
                text: "chiken".to_string()
            }]
        );
        assert!(plan.filters.is_empty());
    }

    #[test]
    fn test_ingredients_are_any_match_scoring() {
        let criteria = SearchCriteria {
            ingredients: Some(strings(&["olive oil", "garlic"])),
            ..SearchCriteria::default()
        };
        let plan = compile(&criteria);
        assert_eq!(
            plan.scoring,
            vec![Clause::AnyTerms {
                field: Field::Ingredients,
                values: strings(&["olive oil", "garlic"])
            }]
        );
    }

    #[test]
    fn test_tags_require_every_value() {
        let criteria = SearchCriteria {
            tags: Some(strings(&["vegetarian", "gluten-free"])),
            ..SearchCriteria::default()
        };
        let plan = compile(&criteria);
        assert!(plan.scoring.is_empty());
        assert_eq!(
            plan.filters,
            vec![Clause::AllTerms {
                field: Field::Tags,
                values: strings(&["vegetarian", "gluten-free"]),
                minimum_should_match: 2
            }]
        );
    }

    #[test]
    fn test_each_nutrient_filters_its_own_field() {
        let criteria = SearchCriteria {
            calories: NutrientRange::new(Some(0), Some(100)),
            carbohydrate: NutrientRange::new(None, Some(30)),
            protein: NutrientRange::new(Some(10), None),
            fat: NutrientRange::new(Some(-1), Some(5)),
            ..SearchCriteria::default()
        };
        let plan = compile(&criteria);
        assert_eq!(
            plan.filters,
            vec![
                Clause::Range {
                    field: Field::Calories,
                    gte: Some(0),
                    lte: Some(100)
                },
                Clause::Range {
                    field: Field::Carbohydrate,
                    gte: None,
                    lte: Some(30)
                },
                Clause::Range {
                    field: Field::Protein,
                    gte: Some(10),
                    lte: None
                },
                Clause::Range {
                    field: Field::Fat,
                    gte: Some(-1),
                    lte: Some(5)
                },
            ]
        );
    }

    #[test]
    fn test_legacy_mapping_filters_calories() {
        let criteria = SearchCriteria {
            carbohydrate: NutrientRange::new(Some(5), None),
            protein: NutrientRange::new(None, Some(40)),
            fat: NutrientRange::new(Some(1), Some(2)),
            ..SearchCriteria::default()
        };
        let plan = QueryCompiler::new(NutrientMapping::LegacyCalories).compile(&criteria);
        assert_eq!(plan.filters.len(), 3);
        assert!(plan
            .filters
            .iter()
            .all(|clause| clause.field() == Field::Calories));
    }

    #[test]
    fn test_full_criteria_clause_counts() {
        let criteria = SearchCriteria {
            query: Some("salad".to_string()),
            ingredients: Some(strings(&["tomato"])),
            tags: Some(strings(&["vegan"])),
            calories: NutrientRange::new(None, Some(600)),
            page: 2,
            per_page: 6,
            ..SearchCriteria::default()
        };
        let plan = compile(&criteria);
        assert_eq!(plan.scoring.len(), 2);
        assert_eq!(plan.filters.len(), 2);
        assert_eq!(plan.bounds(), (12, 6));
    }

    #[test]
    fn test_empty_collections_add_no_clause() {
        let criteria = SearchCriteria {
            query: Some(String::new()),
            ingredients: Some(Vec::new()),
            tags: Some(Vec::new()),
            ..SearchCriteria::default()
        };
        assert!(compile(&criteria).is_match_all());
    }
}
