// End-to-end tests for the load → filter → rank pipeline.
//
// These run against the on-disk fixtures in tests/fixtures/, through the
// real CSV loader and dataset cache.

use std::path::PathBuf;

use restaurant_explorer::data::literal::{self, Literal};
use restaurant_explorer::data::loader::load_file;
use restaurant_explorer::{
    apply, DatasetCache, ExplorerConfig, ExplorerError, ExplorerState, FilterCriteria,
};

// =============================================================================
// Helpers
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn ranked_names(table: &restaurant_explorer::RestaurantTable, criteria: &FilterCriteria) -> Vec<String> {
    apply(table, criteria)
        .resolve(table)
        .map(|(_, r, _)| r.name.clone())
        .collect()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn e2e_loads_fixture_table() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    assert_eq!(table.len(), 7);
    assert_eq!(
        table.cities().iter().collect::<Vec<_>>(),
        vec!["Paris", "Rome"]
    );

    let pizzeria = &table.restaurants()[3];
    assert_eq!(
        pizzeria.cuisine_styles,
        vec!["Italian", "Pizza", "Vegetarian Friendly"]
    );
    let reviews: Vec<_> = pizzeria.reviews.pairs().collect();
    assert_eq!(
        reviews,
        vec![
            ("Crispy base", "11/02/2017"),
            ("Joe's favourite", "10/30/2017")
        ]
    );

    let chez_marie = &table.restaurants()[2];
    assert!(chez_marie.cuisine_styles.is_empty());
    assert_eq!(chez_marie.price_range, None);
    assert_eq!(chez_marie.num_reviews, 0);
}

#[test]
fn e2e_malformed_reviews_abort_load() {
    let result = load_file(&fixture("malformed_reviews.csv"));
    assert!(
        matches!(
            result,
            Err(ExplorerError::DataFormat {
                row: 1,
                column: "Reviews",
                ..
            })
        ),
        "expected DataFormat error, got {result:?}"
    );
}

// =============================================================================
// Ranking scenarios
// =============================================================================

/// Ten reviews double the rating; zero reviews leave it unchanged.
#[test]
fn e2e_popularity_weighting_picks_reviewed_restaurant() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    let ranking = apply(&table, &FilterCriteria::for_city("Paris"));

    let rows: Vec<_> = ranking.resolve(&table).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].1.name, "Trattoria Da Enzo");
    assert!((rows[0].2 - 8.0).abs() < 1e-12);
    assert_eq!(rows[1].1.name, "Le Petit Zinc");
    assert!((rows[1].2 - 4.5).abs() < 1e-12);
    assert_eq!(rows[2].1.name, "Chez Marie");
    assert!((rows[2].2 - 3.5).abs() < 1e-12);
}

#[test]
fn e2e_no_matching_cuisine_gives_no_pick() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    let criteria = FilterCriteria::for_city("Paris").with_cuisines(["Sushi"]);
    let ranking = apply(&table, &criteria);
    assert!(ranking.is_empty());
    assert!(ranking.top().is_none());
}

#[test]
fn e2e_empty_cuisine_literal_never_matches() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    let cuisines: Vec<String> = table.cuisines_in_city("Paris").into_iter().map(String::from).collect();
    let criteria = FilterCriteria::for_city("Paris").with_cuisines(cuisines);
    let names = ranked_names(&table, &criteria);
    assert!(!names.contains(&"Chez Marie".to_string()));
    assert_eq!(names.len(), 2);
}

#[test]
fn e2e_rome_filters() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();

    // Osteria Nuova has no rating and never ranks.
    assert_eq!(
        ranked_names(&table, &FilterCriteria::for_city("Rome")),
        vec!["Pizzeria Roma", "Bar Centrale", "Sakura"]
    );

    assert_eq!(
        ranked_names(
            &table,
            &FilterCriteria::for_city("Rome").with_cuisines(["Italian"])
        ),
        vec!["Pizzeria Roma", "Bar Centrale"]
    );

    let criteria = FilterCriteria::for_city("Rome").with_price_ranges(["$$$$"]);
    let ranking = apply(&table, &criteria);
    assert_eq!(ranking.len(), 1);
    assert!((ranking.rows()[0].score - 10.0).abs() < 1e-12);
}

#[test]
fn e2e_filters_hold_for_every_row() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    let criteria = FilterCriteria::for_city("Rome")
        .with_cuisines(["Pizza", "Sushi", "Cafe"])
        .with_price_ranges(["$", "$$$$"]);

    let ranking = apply(&table, &criteria);
    assert!(!ranking.is_empty());
    for (_, r, _) in ranking.resolve(&table) {
        assert_eq!(r.city, "Rome");
        assert!(r.serves_any(&criteria.cuisines));
        assert!(criteria
            .price_ranges
            .contains(r.price_range.as_deref().unwrap()));
    }
    for pair in ranking.rows().windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(apply(&table, &criteria), ranking);
}

// =============================================================================
// Literal round-trip over loaded data
// =============================================================================

#[test]
fn e2e_list_columns_survive_reserialisation() {
    let table = load_file(&fixture("restaurants.csv")).unwrap();
    for r in table.restaurants() {
        let cuisines = Literal::string_list(&r.cuisine_styles).to_string();
        assert_eq!(literal::parse_string_list(&cuisines).unwrap(), r.cuisine_styles);

        let reviews = Literal::list_pair(r.reviews.texts(), r.reviews.dates()).to_string();
        let (texts, dates) = literal::parse_list_pair(&reviews).unwrap();
        assert_eq!(texts, r.reviews.texts());
        assert_eq!(dates, r.reviews.dates());
    }
}

// =============================================================================
// Explorer state over the cache
// =============================================================================

#[test]
fn e2e_state_session() {
    let config = ExplorerConfig {
        data_path: fixture("restaurants.csv"),
        ..Default::default()
    };
    let mut cache = DatasetCache::new();
    let mut state = ExplorerState::new(&config);
    state.load(&mut cache, &config.data_path).unwrap();

    let pick = state.best_pick().unwrap();
    assert_eq!(pick.restaurant.name, "Trattoria Da Enzo");
    assert_eq!(
        pick.link,
        "https://www.tripadvisor.com/Restaurant_Review-g187147-d1001-Reviews-Trattoria_Da_Enzo-Paris.html"
    );

    state.select_city("Rome");
    state.toggle_price("$");
    assert_eq!(state.result_count(), 2);
    assert_eq!(state.price_options(), vec!["$", "$$ - $$$", "$$$$"]);

    // Reloading the same unchanged file is served from the cache.
    let again = cache.load(&config.data_path).unwrap();
    assert!(std::sync::Arc::ptr_eq(state.table.as_ref().unwrap(), &again));
}
