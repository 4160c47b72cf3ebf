use crate::cli::SearchArgs;
use crate::indexer::search::SearchIndex;
use crate::models::RecipeDocument;
use crate::query::RawCriteria;
use crate::service::{DocumentStore, RecipeSearch, SearchPage};
use crate::{Error, Result};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// One line of a load file: a recipe document with an optional ID
#[derive(Debug, Deserialize)]
struct LoadRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    document: RecipeDocument,
}

/// Counts from a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub indexed: usize,
    pub failed: usize,
}

/// Index every JSON line of `input`. Malformed lines are skipped and counted.
pub fn load(index: &SearchIndex, input: &Path) -> Result<LoadReport> {
    let file = std::fs::File::open(input)?;
    load_from_reader(index, BufReader::new(file))
}

pub fn load_from_reader(index: &SearchIndex, reader: impl BufRead) -> Result<LoadReport> {
    let mut writer = index.writer()?;
    let mut report = LoadReport::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: LoadRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping line {}: {}", line_number + 1, e);
                report.failed += 1;
                continue;
            }
        };

        if let Err(e) = validate_record(&record) {
            warn!("Skipping line {}: {}", line_number + 1, e.log_safe());
            report.failed += 1;
            continue;
        }

        index.index_recipe(&mut writer, record.id.as_deref(), &record.document)?;
        report.indexed += 1;
    }

    index.commit(&mut writer)?;

    if report.failed > 0 {
        warn!("Indexed {} recipes with {} failures", report.indexed, report.failed);
    } else {
        info!("Indexed {} recipes with no failures", report.indexed);
    }

    Ok(report)
}

fn validate_record(record: &LoadRecord) -> Result<()> {
    if record.document.name.trim().is_empty() {
        return Err(Error::Validation("recipe has no name".to_string()));
    }
    Ok(())
}

/// Turn CLI flags into the loose criteria a form would submit
pub fn raw_criteria(args: &SearchArgs) -> RawCriteria {
    let mut raw = RawCriteria::new();

    let text_fields = [
        ("query", &args.query),
        ("ingredients", &args.ingredients),
        ("minCalories", &args.min_calories),
        ("maxCalories", &args.max_calories),
        ("minCarbs", &args.min_carbs),
        ("maxCarbs", &args.max_carbs),
        ("minProteins", &args.min_proteins),
        ("maxProteins", &args.max_proteins),
        ("minFats", &args.min_fats),
        ("maxFats", &args.max_fats),
        ("page", &args.page),
        ("perPage", &args.per_page),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            raw.insert(key, value.as_str());
        }
    }

    if !args.tags.is_empty() {
        raw.insert("tags", args.tags.clone());
    }

    raw
}

pub fn search<S: DocumentStore>(service: &RecipeSearch<S>, args: &SearchArgs) -> Result<()> {
    let raw = raw_criteria(args);

    if args.plan {
        let criteria = service.normalize(&raw);
        let plan = service.compiler().compile(&criteria);
        print_json(&plan.to_query_document())?;
        return Ok(());
    }

    let page = service.search_raw(&raw);
    print_search_results(&page);
    Ok(())
}

pub fn suggest<S: DocumentStore>(service: &RecipeSearch<S>, prefix: &str) -> Result<()> {
    let names = service.suggest(prefix);
    if names.is_empty() {
        println!("No suggestions");
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn show<S: DocumentStore>(service: &RecipeSearch<S>, id: &str) -> Result<()> {
    let recipe = service
        .get_recipe(id)
        .into_option()
        .ok_or_else(|| Error::NotFound(format!("Recipe {id} not found")))?;
    print_json(&recipe)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_search_results(page: &SearchPage) {
    if page.result.is_empty() {
        println!("No recipes found");
        return;
    }

    println!(
        "Page {} of {} ({} matches)\n",
        page.pagination.page + 1,
        page.pagination.total_pages.max(1),
        page.result.total_matches
    );

    for recipe in &page.result.items {
        println!("  {}  [{}]", recipe.document.name, recipe.id);
        if let Some(calories) = recipe.document.calories {
            println!("      calories: {calories}");
        }
        if !recipe.document.tags.is_empty() {
            println!("      tags: {}", recipe.document.tags.join(", "));
        }
    }

    println!();
    if page.pagination.has_prev {
        println!("Previous: --page {}", page.pagination.page - 1);
    }
    if page.pagination.has_next {
        println!("Next: --page {}", page.pagination.page + 1);
    }
}
