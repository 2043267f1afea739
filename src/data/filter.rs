use std::collections::BTreeSet;

use super::model::{Restaurant, RestaurantTable};

// ---------------------------------------------------------------------------
// Filter criteria: one city, zero-or-more cuisines, zero-or-more price bands
// ---------------------------------------------------------------------------

/// User selections driving the pipeline. An empty cuisine or price set means
/// "no filter" for that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub city: String,
    pub cuisines: BTreeSet<String>,
    pub price_ranges: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Default::default()
        }
    }

    pub fn with_cuisines<I, S>(mut self, cuisines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cuisines = cuisines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price_ranges<I, S>(mut self, prices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.price_ranges = prices.into_iter().map(Into::into).collect();
        self
    }
}

/// Return indices (in table order) of restaurants passing all filters.
///
/// A restaurant passes when:
/// * its city equals `criteria.city` exactly (case-sensitive); a row with
///   no city never passes
/// * `criteria.cuisines` is empty, or it serves at least one of them
/// * `criteria.price_ranges` is empty, or its price band is one of them;
///   an absent price band never passes a non-empty price filter
pub fn filtered_indices(table: &RestaurantTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .restaurants()
        .iter()
        .enumerate()
        .filter(|(_, r)| matches_all(r, criteria))
        .map(|(i, _)| i)
        .collect()
}

fn matches_all(restaurant: &Restaurant, criteria: &FilterCriteria) -> bool {
    if restaurant.city.is_empty() || restaurant.city != criteria.city {
        return false;
    }

    if !criteria.cuisines.is_empty() && !restaurant.serves_any(&criteria.cuisines) {
        return false;
    }

    if !criteria.price_ranges.is_empty() {
        match &restaurant.price_range {
            Some(price) if criteria.price_ranges.contains(price) => {}
            _ => return false,
        }
    }

    true
}
