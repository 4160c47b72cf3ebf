use clap::Parser;
use recipe_search::{
    cli::{commands, Cli, Commands},
    config::Settings,
    indexer::search::SearchIndex,
    service::RecipeSearch,
    Result,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_search=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration, CLI flags win
    let mut settings = Settings::from_env()?;
    if let Some(index) = cli.index {
        settings.search.index_path = index;
    }
    if cli.legacy_nutrient_filters {
        settings.search.legacy_nutrient_filters = true;
    }
    settings.validate()?;

    if settings.search.legacy_nutrient_filters {
        warn!(
            "Legacy nutrient filters enabled: carbohydrate, protein and fat ranges filter on calories"
        );
    }

    let index = SearchIndex::new(&settings.search.index_path)?
        .with_writer_memory(settings.search.writer_memory_bytes);
    info!("Index holds {} recipes", index.num_docs());

    match cli.command {
        Commands::Load { input } => {
            let report = commands::load(&index, &input)?;
            println!("Loaded {} recipes ({} skipped)", report.indexed, report.failed);
        }
        Commands::Search(args) => {
            let service = RecipeSearch::from_settings(index, &settings);
            commands::search(&service, &args)?;
        }
        Commands::Suggest { prefix } => {
            let service = RecipeSearch::from_settings(index, &settings);
            commands::suggest(&service, &prefix)?;
        }
        Commands::Show { id } => {
            let service = RecipeSearch::from_settings(index, &settings);
            commands::show(&service, &id)?;
        }
    }

    Ok(())
}
