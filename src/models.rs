use serde::{Deserialize, Deserializer, Serialize};

/// Dietary tags observed in the indexed corpus.
///
/// The vocabulary is not enforced: criteria may request any tag and documents may carry
/// any tag. This list is used for diagnostics only.
pub const KNOWN_TAGS: &[&str] = &["gluten-free", "vegetarian", "vegan"];

/// Returns true if `tag` belongs to the known dietary vocabulary
pub fn is_known_tag(tag: &str) -> bool {
    KNOWN_TAGS.contains(&tag)
}

/// A recipe as stored in the search index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDocument {
    #[serde(default)]
    pub name: String,
    /// One entry per ingredient line. Also accepts a single newline-separated string.
    #[serde(default, deserialize_with = "ingredient_lines")]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_yield: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_instructions: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeDocument {
    /// Document carrying only a name, as returned for suggestion queries
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

fn ingredient_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lines {
        List(Vec<String>),
        Text(String),
        Missing(()),
    }

    let lines = match Lines::deserialize(deserializer)? {
        Lines::List(lines) => lines,
        Lines::Text(text) => text.lines().map(str::to_string).collect(),
        Lines::Missing(()) => Vec::new(),
    };

    Ok(lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// A recipe together with the opaque ID assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: String,
    #[serde(flatten)]
    pub document: RecipeDocument,
}
