use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::is_known_tag;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const DEFAULT_MAX_PER_PAGE: usize = 100;

/// Loose search input as it arrives from a form or an API body.
///
/// Keys are the public criteria names (`query`, `ingredients`, `tags`, `minCalories`, ...,
/// `page`, `perPage`). Unknown keys are ignored by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCriteria(Map<String, Value>);

impl RawCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything but an object yields empty criteria
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Build from form-style key/value pairs. Repeated keys collect into an array.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = Value::String(value.into());
            match map.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key, value);
                }
            }
        }
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for RawCriteria {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Inclusive bounds on a single nutrient. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl NutrientRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Normalized search criteria. Every constraint is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub query: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub calories: NutrientRange,
    pub carbohydrate: NutrientRange,
    pub protein: NutrientRange,
    pub fat: NutrientRange,
    pub page: usize,
    pub per_page: usize,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: None,
            ingredients: None,
            tags: None,
            calories: NutrientRange::default(),
            carbohydrate: NutrientRange::default(),
            protein: NutrientRange::default(),
            fat: NutrientRange::default(),
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchCriteria {
    /// Normalize raw input with the default page limits
    pub fn from_raw(raw: &RawCriteria) -> Self {
        normalize(raw, &PageLimits::default())
    }

    /// True when no field constrains the result set
    pub fn is_unconstrained(&self) -> bool {
        self.query.is_none()
            && self.ingredients.is_none()
            && self.tags.is_none()
            && self.calories.is_unbounded()
            && self.carbohydrate.is_unbounded()
            && self.protein.is_unbounded()
            && self.fat.is_unbounded()
    }
}

/// Page size policy applied while normalizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

/// Coerce loose input into [`SearchCriteria`].
///
/// Never fails: malformed values are treated as absent.
pub fn normalize(raw: &RawCriteria, limits: &PageLimits) -> SearchCriteria {
    let tags = string_list(raw.get("tags")).map(|tags| {
        let tags: Vec<String> = dedup(tags.into_iter().map(|t| t.to_lowercase()).collect());
        for tag in tags.iter().filter(|t| !is_known_tag(t)) {
            debug!("Criteria requests tag outside the known vocabulary: {}", tag);
        }
        tags
    });

    let page = integer(raw.get("page"))
        .map(|p| usize::try_from(p).unwrap_or(0))
        .unwrap_or(0);

    let max_per_page = limits.max_per_page.max(1);
    let per_page = integer(raw.get("perPage"))
        .map(|n| usize::try_from(n).unwrap_or(1).clamp(1, max_per_page))
        .unwrap_or_else(|| limits.default_per_page.clamp(1, max_per_page));

    SearchCriteria {
        query: text(raw.get("query")),
        ingredients: string_list(raw.get("ingredients")).map(dedup),
        tags,
        calories: range(raw, "minCalories", "maxCalories"),
        carbohydrate: range(raw, "minCarbs", "maxCarbs"),
        protein: range(raw, "minProteins", "maxProteins"),
        fat: range(raw, "minFats", "maxFats"),
        page,
        per_page,
    }
}

fn range(raw: &RawCriteria, min_key: &str, max_key: &str) -> NutrientRange {
    NutrientRange::new(integer(raw.get(min_key)), integer(raw.get(max_key)))
}

/// `null`, blank strings, empty arrays and `false` carry no constraint
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !is_absent(v))
}

fn text(value: Option<&Value>) -> Option<String> {
    match present(value)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(value: Option<&Value>) -> Option<i64> {
    match present(value)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flatten a string or array of strings into trimmed, comma-split tokens
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    match present(value)? {
        Value::String(s) => push_tokens(&mut tokens, s),
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    push_tokens(&mut tokens, s);
                }
            }
        }
        _ => {}
    }

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

fn push_tokens(tokens: &mut Vec<String>, s: &str) {
    tokens.extend(
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    );
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCriteria {
        RawCriteria::from_json(value)
    }

    #[test]
    fn test_empty_input_has_no_constraints() {
        let criteria = SearchCriteria::from_raw(&RawCriteria::new());
        assert!(criteria.is_unconstrained());
        assert_eq!(criteria.page, 0);
        assert_eq!(criteria.per_page, 10);
    }

    #[test]
    fn test_ingredients_csv_split() {
        let criteria = SearchCriteria::from_raw(&raw(json!({
            "ingredients": "olive oil, garlic,"
        })));
        assert_eq!(
            criteria.ingredients,
            Some(vec!["olive oil".to_string(), "garlic".to_string()])
        );
    }

    #[test]
    fn test_ingredient_list_entries_are_split_and_deduplicated() {
        let criteria = SearchCriteria::from_raw(&raw(json!({
            "ingredients": ["  basil ", "garlic, basil", ""]
        })));
        assert_eq!(
            criteria.ingredients,
            Some(vec!["basil".to_string(), "garlic".to_string()])
        );
    }

    #[test]
    fn test_falsy_values_are_absent() {
        let criteria = SearchCriteria::from_raw(&raw(json!({
            "query": "   ",
            "ingredients": [],
            "tags": false,
            "minCalories": null,
            "maxCalories": ""
        })));
        assert!(criteria.is_unconstrained());
    }

    #[test]
    fn test_only_separators_is_absent() {
        let criteria = SearchCriteria::from_raw(&raw(json!({ "ingredients": " , ," })));
        assert_eq!(criteria.ingredients, None);
    }

    #[test]
    fn test_numeric_fields_are_lenient() {
        let criteria = SearchCriteria::from_raw(&raw(json!({
            "minCalories": "100",
            "maxCalories": 500,
            "minCarbs": "lots",
            "maxCarbs": 12.0,
            "minProteins": 3.5,
            "maxFats": true
        })));
        assert_eq!(criteria.calories, NutrientRange::new(Some(100), Some(500)));
        assert_eq!(criteria.carbohydrate, NutrientRange::new(None, Some(12)));
        assert_eq!(criteria.protein, NutrientRange::default());
        assert_eq!(criteria.fat, NutrientRange::default());
    }

    #[test]
    fn test_zero_is_a_real_bound() {
        let criteria = SearchCriteria::from_raw(&raw(json!({ "minCalories": 0 })));
        assert_eq!(criteria.calories.min, Some(0));
    }

    #[test]
    fn test_negative_bounds_pass_through() {
        let criteria = SearchCriteria::from_raw(&raw(json!({ "minFats": "-5" })));
        assert_eq!(criteria.fat.min, Some(-5));
    }

    #[test]
    fn test_tags_are_lowercased_and_deduplicated() {
        let criteria = SearchCriteria::from_raw(&raw(json!({
            "tags": ["Vegan", "vegan", "gluten-free"]
        })));
        assert_eq!(
            criteria.tags,
            Some(vec!["vegan".to_string(), "gluten-free".to_string()])
        );
    }

    #[test]
    fn test_page_and_per_page_fallbacks() {
        let criteria = SearchCriteria::from_raw(&raw(json!({ "page": "x", "perPage": "y" })));
        assert_eq!((criteria.page, criteria.per_page), (0, 10));

        let criteria = SearchCriteria::from_raw(&raw(json!({ "page": -3, "perPage": 0 })));
        assert_eq!((criteria.page, criteria.per_page), (0, 1));

        let criteria = SearchCriteria::from_raw(&raw(json!({ "page": "4", "perPage": "25" })));
        assert_eq!((criteria.page, criteria.per_page), (4, 25));
    }

    #[test]
    fn test_per_page_is_capped() {
        let limits = PageLimits {
            default_per_page: 6,
            max_per_page: 50,
        };
        let criteria = normalize(&raw(json!({ "perPage": 1000 })), &limits);
        assert_eq!(criteria.per_page, 50);

        let criteria = normalize(&RawCriteria::new(), &limits);
        assert_eq!(criteria.per_page, 6);
    }

    #[test]
    fn test_from_pairs_collects_repeated_keys() {
        let raw = RawCriteria::from_pairs([
            ("tags", "vegan"),
            ("tags", "gluten-free"),
            ("query", "soup"),
        ]);
        assert_eq!(raw.get("tags"), Some(&json!(["vegan", "gluten-free"])));
        assert_eq!(raw.get("query"), Some(&json!("soup")));

        let criteria = SearchCriteria::from_raw(&raw);
        assert_eq!(criteria.tags.map(|t| t.len()), Some(2));
        assert_eq!(criteria.query.as_deref(), Some("soup"));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        let criteria = SearchCriteria::from_raw(&RawCriteria::from_json(json!([1, 2])));
        assert!(criteria.is_unconstrained());
    }
}
