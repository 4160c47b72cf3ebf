use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub index_path: PathBuf,
    pub writer_memory_bytes: usize,
    /// Filter carbohydrate/protein/fat ranges on calories, as older clients expect
    pub legacy_nutrient_filters: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_per_page: usize,
    pub max_per_page: usize,
    pub suggestion_limit: usize,
}

impl Settings {
    /// Defaults for an index at `index_path`
    pub fn for_index(index_path: impl Into<PathBuf>) -> Self {
        Settings {
            search: SearchConfig {
                index_path: index_path.into(),
                writer_memory_bytes: 50_000_000,
                legacy_nutrient_filters: false,
            },
            pagination: PaginationConfig {
                default_per_page: 10,
                max_per_page: 100,
                suggestion_limit: 10,
            },
        }
    }

    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let index_path = std::env::var("INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let writer_memory_bytes = std::env::var("INDEX_WRITER_MEMORY")
            .unwrap_or_else(|_| "50000000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid INDEX_WRITER_MEMORY value".to_string()))?;

        let legacy_nutrient_filters = parse_bool(
            "LEGACY_NUTRIENT_FILTERS",
            &std::env::var("LEGACY_NUTRIENT_FILTERS").unwrap_or_else(|_| "false".to_string()),
        )?;

        let default_per_page = std::env::var("DEFAULT_PER_PAGE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DEFAULT_PER_PAGE value".to_string()))?;

        let max_per_page = std::env::var("MAX_PER_PAGE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_PER_PAGE value".to_string()))?;

        let suggestion_limit = std::env::var("SUGGESTION_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SUGGESTION_LIMIT value".to_string()))?;

        Ok(Settings {
            search: SearchConfig {
                index_path,
                writer_memory_bytes,
                legacy_nutrient_filters,
            },
            pagination: PaginationConfig {
                default_per_page,
                max_per_page,
                suggestion_limit,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_per_page == 0 {
            return Err(Error::Config("Default page size must be non-zero".to_string()));
        }

        if self.pagination.max_per_page < self.pagination.default_per_page {
            return Err(Error::Config(
                "Maximum page size must not be below the default page size".to_string(),
            ));
        }

        if self.pagination.suggestion_limit == 0 {
            return Err(Error::Config("Suggestion limit must be non-zero".to_string()));
        }

        // tantivy refuses writer budgets below 15MB
        if self.search.writer_memory_bytes < 15_000_000 {
            return Err(Error::Config(
                "Index writer memory must be at least 15000000 bytes".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::Config(format!("Invalid {name} value"))),
    }
}
