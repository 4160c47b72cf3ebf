use recipe_search::cli::commands::load;
use recipe_search::indexer::search::SearchIndex;
use recipe_search::service::RecipeSearch;
use recipe_search::{RawCriteria, RecipeLookup, Settings};
use serde_json::json;
use std::io::Write;

#[test]
fn test_load_then_search_on_disk_index() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let index_path = dir.path().join("index");

    let input_path = dir.path().join("recipes.jsonl");
    let mut input = std::fs::File::create(&input_path).expect("Failed to create input");
    writeln!(
        input,
        "{}",
        json!({
            "id": "pancakes",
            "name": "Fluffy Pancakes",
            "ingredients": "flour\nmilk\neggs",
            "calories": 350,
            "tags": ["vegetarian"],
            "cookTime": "PT15M"
        })
    )
    .unwrap();
    writeln!(
        input,
        "{}",
        json!({ "name": "Vegan Pancakes", "ingredients": ["flour", "oat milk"], "tags": ["vegan", "vegetarian"] })
    )
    .unwrap();
    drop(input);

    {
        let index = SearchIndex::new(&index_path).expect("Failed to create index");
        let report = load(&index, &input_path).expect("Failed to load recipes");
        assert_eq!(report.indexed, 2);
        assert_eq!(report.failed, 0);
    }

    // Reopen from disk
    let index = SearchIndex::new(&index_path).expect("Failed to reopen index");
    let settings = Settings::for_index(&index_path);
    let service = RecipeSearch::from_settings(index, &settings);

    let page = service.search_raw(&RawCriteria::from_json(json!({ "ingredients": "milk" })));
    assert_eq!(page.result.total_matches, 2);

    let page = service.search_raw(&RawCriteria::from_json(json!({ "tags": "vegan" })));
    assert_eq!(page.result.total_matches, 1);
    assert_eq!(page.result.items[0].document.name, "Vegan Pancakes");

    match service.get_recipe("pancakes") {
        RecipeLookup::Found(recipe) => {
            assert_eq!(recipe.document.cook_time.as_deref(), Some("PT15M"));
            assert_eq!(recipe.document.ingredients, vec!["flour", "milk", "eggs"]);
        }
        RecipeLookup::NotFound => panic!("loaded recipe should be found"),
    }

    assert_eq!(
        service.suggest("fluffy"),
        vec!["Fluffy Pancakes".to_string()]
    );
}
