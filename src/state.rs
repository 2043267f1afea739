use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::config::ExplorerConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::FilterCriteria;
use crate::data::model::{Restaurant, RestaurantTable};
use crate::data::ranking::{self, Ranking};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Explorer state
// ---------------------------------------------------------------------------

/// The top-ranked restaurant with everything the "best pick" card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPick<'a> {
    pub restaurant: &'a Restaurant,
    pub score: f64,
    pub link: String,
}

/// The full explorer state, independent of rendering.
///
/// Every selection change re-runs the filter-rank pipeline over the whole
/// table; the result is kept in `ranking` until the next change.
pub struct ExplorerState {
    /// Loaded table (None until a file is loaded).
    pub table: Option<Arc<RestaurantTable>>,

    /// Current city / cuisine / price selections.
    pub criteria: FilterCriteria,

    /// Result of the last pipeline run.
    pub ranking: Ranking,

    /// Status / error message for the presentation layer.
    pub status_message: Option<String>,

    link_base_url: String,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(&ExplorerConfig::default())
    }
}

impl ExplorerState {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            table: None,
            criteria: FilterCriteria::default(),
            ranking: Ranking::default(),
            status_message: None,
            link_base_url: config.link_base_url.clone(),
        }
    }

    /// Load `path` through `cache` and make it the current table.
    pub fn load(&mut self, cache: &mut DatasetCache, path: &Path) -> Result<()> {
        match cache.load(path) {
            Ok(table) => {
                self.set_table(table);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a table: select its first city, clear other filters, rank.
    pub fn set_table(&mut self, table: Arc<RestaurantTable>) {
        let city = table.cities().iter().next().cloned().unwrap_or_default();
        self.criteria = FilterCriteria::for_city(city);
        self.table = Some(table);
        self.status_message = None;
        self.rerank();
    }

    /// Recompute `ranking` after a criteria change.
    pub fn rerank(&mut self) {
        self.ranking = match &self.table {
            Some(table) => ranking::apply(table, &self.criteria),
            None => Ranking::default(),
        };
    }

    /// Switch city. Cuisine selections not served in the new city are dropped.
    pub fn select_city(&mut self, city: &str) {
        self.criteria.city = city.to_string();
        if let Some(table) = &self.table {
            let available = table.cuisines_in_city(city);
            self.criteria
                .cuisines
                .retain(|c| available.contains(c.as_str()));
        }
        self.rerank();
    }

    /// Toggle a single cuisine in the selection.
    pub fn toggle_cuisine(&mut self, cuisine: &str) {
        toggle(&mut self.criteria.cuisines, cuisine);
        self.rerank();
    }

    /// Toggle a single price band in the selection.
    pub fn toggle_price(&mut self, price: &str) {
        toggle(&mut self.criteria.price_ranges, price);
        self.rerank();
    }

    /// Deselect every cuisine and price band, keeping the city.
    pub fn clear_filters(&mut self) {
        self.criteria.cuisines.clear();
        self.criteria.price_ranges.clear();
        self.rerank();
    }

    pub fn city_options(&self) -> Vec<&str> {
        self.table
            .as_deref()
            .map(|t| t.cities().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Cuisines served in the selected city.
    pub fn cuisine_options(&self) -> BTreeSet<&str> {
        self.table
            .as_deref()
            .map(|t| t.cuisines_in_city(&self.criteria.city))
            .unwrap_or_default()
    }

    /// Price bands across the whole table.
    pub fn price_options(&self) -> Vec<&str> {
        self.table
            .as_deref()
            .map(|t| t.price_ranges().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn best_pick(&self) -> Option<BestPick<'_>> {
        let table = self.table.as_deref()?;
        let top = self.ranking.top()?;
        let restaurant = table.get(top.index)?;
        Some(BestPick {
            restaurant,
            score: top.score,
            link: restaurant.external_link(&self.link_base_url),
        })
    }

    /// `(position, restaurant, score)` best first, positions from 1.
    pub fn ranked_rows(&self) -> Vec<(usize, &Restaurant, f64)> {
        match self.table.as_deref() {
            Some(table) => self.ranking.resolve(table).collect(),
            None => Vec::new(),
        }
    }

    pub fn result_count(&self) -> usize {
        self.ranking.len()
    }
}

fn toggle(selected: &mut BTreeSet<String>, value: &str) {
    if !selected.remove(value) {
        selected.insert(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Reviews;

    fn restaurant(
        name: &str,
        city: &str,
        cuisines: &[&str],
        price: Option<&str>,
        rating: f64,
        num_reviews: u64,
    ) -> Restaurant {
        Restaurant {
            name: name.to_string(),
            city: city.to_string(),
            cuisine_styles: cuisines.iter().map(|c| c.to_string()).collect(),
            price_range: price.map(str::to_string),
            rating: Some(rating),
            num_reviews,
            reviews: Reviews::default(),
            url_ta: format!("/{name}.html"),
        }
    }

    fn state() -> ExplorerState {
        let table = RestaurantTable::from_restaurants(vec![
            restaurant("Trattoria", "Rome", &["Italian", "Pizza"], Some("$$ - $$$"), 4.0, 200),
            restaurant("Sushi Bar", "Rome", &["Sushi"], Some("$$$$"), 5.0, 3),
            restaurant("Bistro", "Paris", &["French"], Some("$"), 4.5, 50),
            restaurant("Creperie", "Paris", &["French", "Cafe"], None, 4.0, 10),
        ]);
        let mut state = ExplorerState::default();
        state.set_table(Arc::new(table));
        state
    }

    #[test]
    fn set_table_selects_first_city() {
        let state = state();
        assert_eq!(state.criteria.city, "Paris");
        assert_eq!(state.city_options(), vec!["Paris", "Rome"]);
        assert_eq!(state.result_count(), 2);
        assert_eq!(state.best_pick().unwrap().restaurant.name, "Bistro");
    }

    #[test]
    fn options_follow_selected_city() {
        let mut state = state();
        assert_eq!(
            state.cuisine_options().into_iter().collect::<Vec<_>>(),
            vec!["Cafe", "French"]
        );
        state.select_city("Rome");
        assert_eq!(
            state.cuisine_options().into_iter().collect::<Vec<_>>(),
            vec!["Italian", "Pizza", "Sushi"]
        );
        assert_eq!(state.price_options(), vec!["$", "$$ - $$$", "$$$$"]);
    }

    #[test]
    fn toggles_rerank() {
        let mut state = state();
        state.select_city("Rome");
        assert_eq!(state.best_pick().unwrap().restaurant.name, "Trattoria");

        state.toggle_cuisine("Sushi");
        assert_eq!(state.result_count(), 1);
        assert_eq!(state.best_pick().unwrap().restaurant.name, "Sushi Bar");

        state.toggle_cuisine("Sushi");
        assert_eq!(state.result_count(), 2);

        state.toggle_price("$");
        assert!(state.ranked_rows().is_empty());
        assert!(state.best_pick().is_none());

        state.clear_filters();
        assert_eq!(state.result_count(), 2);
    }

    #[test]
    fn switching_city_drops_unavailable_cuisines() {
        let mut state = state();
        state.toggle_cuisine("French");
        state.select_city("Rome");
        assert!(state.criteria.cuisines.is_empty());
        assert_eq!(state.result_count(), 2);
    }

    #[test]
    fn best_pick_carries_link() {
        let state = state();
        let pick = state.best_pick().unwrap();
        assert_eq!(pick.link, "https://www.tripadvisor.com/Bistro.html");
        let rows = state.ranked_rows();
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[0].1.name, "Bistro");
    }

    #[test]
    fn failed_load_sets_status() {
        let mut state = ExplorerState::default();
        let mut cache = DatasetCache::new();
        assert!(state
            .load(&mut cache, Path::new("/nonexistent/restaurants.csv"))
            .is_err());
        assert!(state.status_message.is_some());
        assert!(state.table.is_none());
        assert!(state.city_options().is_empty());
    }

    #[test]
    fn empty_table_has_no_city_or_pick() {
        let mut state = ExplorerState::default();
        state.set_table(Arc::new(RestaurantTable::default()));
        assert!(state.table.is_some());
        assert_eq!(state.criteria.city, "");
        assert_eq!(state.result_count(), 0);
        assert!(state.best_pick().is_none());
        assert!(state.ranked_rows().is_empty());
        assert!(state.city_options().is_empty());
        assert!(state.cuisine_options().is_empty());
        assert!(state.price_options().is_empty());
    }

    #[test]
    fn rows_without_city_are_never_the_default_view() {
        let table = RestaurantTable::from_restaurants(vec![
            restaurant("A", "Paris", &["French"], None, 4.0, 10),
            restaurant("B", "", &["Cafe"], None, 2.0, 5),
        ]);
        let mut state = ExplorerState::default();
        state.set_table(Arc::new(table));
        assert_eq!(state.criteria.city, "Paris");
        assert_eq!(state.city_options(), vec!["Paris"]);
        assert_eq!(state.best_pick().unwrap().restaurant.name, "A");

        let only_blank = RestaurantTable::from_restaurants(vec![restaurant(
            "B",
            "",
            &["Cafe"],
            None,
            2.0,
            5,
        )]);
        state.set_table(Arc::new(only_blank));
        assert_eq!(state.criteria.city, "");
        assert!(state.best_pick().is_none());
    }
}
