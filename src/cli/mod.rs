// Operator CLI for the search core

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "recipe-search")]
#[command(about = "Recipe search - criteria compiler and index tools", long_about = None)]
pub struct Cli {
    /// Index directory (overrides INDEX_PATH)
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Filter carbohydrate/protein/fat ranges on calories
    #[arg(long, global = true)]
    pub legacy_nutrient_filters: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load recipes from a JSON-lines file into the index
    Load {
        /// File with one recipe document per line
        input: PathBuf,
    },

    /// Search recipes
    Search(SearchArgs),

    /// Suggest recipe names for a prefix
    Suggest {
        /// Name prefix
        prefix: String,
    },

    /// Show a single recipe by ID
    Show {
        /// Recipe ID
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Recipe name query (typo tolerant)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Comma-separated ingredients, any of which may match
    #[arg(short, long)]
    pub ingredients: Option<String>,

    /// Required tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub min_calories: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_calories: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_carbs: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_carbs: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_proteins: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_proteins: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub min_fats: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub max_fats: Option<String>,

    /// 0-indexed page
    #[arg(long)]
    pub page: Option<String>,

    /// Results per page
    #[arg(long)]
    pub per_page: Option<String>,

    /// Print the compiled query document instead of running it
    #[arg(long)]
    pub plan: bool,
}
