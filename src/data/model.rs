use std::collections::BTreeSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names of the input table
// ---------------------------------------------------------------------------

pub mod columns {
    pub const NAME: &str = "Name";
    pub const CITY: &str = "City";
    pub const CUISINE_STYLE: &str = "Cuisine Style";
    pub const PRICE_RANGE: &str = "Price Range";
    pub const RATING: &str = "Rating";
    pub const NUM_REVIEWS: &str = "Number of Reviews";
    pub const REVIEWS: &str = "Reviews";
    pub const URL_TA: &str = "URL_TA";

    /// Every column the loader requires, in display order.
    pub const REQUIRED: [&str; 8] = [
        NAME,
        CITY,
        CUISINE_STYLE,
        PRICE_RANGE,
        RATING,
        NUM_REVIEWS,
        REVIEWS,
        URL_TA,
    ];
}

// ---------------------------------------------------------------------------
// Reviews – parallel text / date sequences
// ---------------------------------------------------------------------------

/// Featured reviews of a restaurant. `texts` and `dates` always have the
/// same length; mismatched input collapses to no reviews at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reviews {
    texts: Vec<String>,
    dates: Vec<String>,
}

impl Reviews {
    pub fn new(texts: Vec<String>, dates: Vec<String>) -> Self {
        if texts.len() != dates.len() {
            log::warn!(
                "Dropping reviews: {} texts but {} dates",
                texts.len(),
                dates.len()
            );
            return Self::default();
        }
        Self { texts, dates }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// `(text, date)` pairs in their original order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.texts
            .iter()
            .zip(&self.dates)
            .map(|(t, d)| (t.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Restaurant – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    /// Display name, not guaranteed unique.
    pub name: String,
    pub city: String,
    /// Cuisines served, deduplicated, first occurrence order kept.
    pub cuisine_styles: Vec<String>,
    pub price_range: Option<String>,
    /// 0.0 – 5.0; `None` when absent or NaN.
    pub rating: Option<f64>,
    pub num_reviews: u64,
    pub reviews: Reviews,
    /// Path fragment appended to the link base URL.
    pub url_ta: String,
}

impl Restaurant {
    /// Whether any of `cuisines` is served here.
    pub fn serves_any(&self, cuisines: &BTreeSet<String>) -> bool {
        self.cuisine_styles.iter().any(|c| cuisines.contains(c))
    }

    pub fn external_link(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.url_ta)
    }

    /// Rating as shown in the results table, e.g. `4.5`.
    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(r) => format!("{r:.1}"),
            None => String::from("-"),
        }
    }
}

/// Remove repeated entries, keeping the first occurrence of each.
pub fn dedup_cuisines(styles: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    styles
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// RestaurantTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed option sets. Never mutated after
/// construction; filters work on row indices.
#[derive(Debug, Clone, Default)]
pub struct RestaurantTable {
    restaurants: Vec<Restaurant>,
    cities: BTreeSet<String>,
    price_ranges: BTreeSet<String>,
}

impl RestaurantTable {
    pub fn from_restaurants(restaurants: Vec<Restaurant>) -> Self {
        let mut cities = BTreeSet::new();
        let mut price_ranges = BTreeSet::new();
        for r in &restaurants {
            // A blank city is an absent value, not a selectable city
            if !r.city.is_empty() {
                cities.insert(r.city.clone());
            }
            if let Some(p) = &r.price_range {
                price_ranges.insert(p.clone());
            }
        }
        RestaurantTable {
            restaurants,
            cities,
            price_ranges,
        }
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn get(&self, index: usize) -> Option<&Restaurant> {
        self.restaurants.get(index)
    }

    /// Sorted unique cities. Rows without a city are not listed.
    pub fn cities(&self) -> &BTreeSet<String> {
        &self.cities
    }

    /// Sorted unique price bands over the whole table, absent values skipped.
    pub fn price_ranges(&self) -> &BTreeSet<String> {
        &self.price_ranges
    }

    /// Sorted unique cuisines served by restaurants in `city`.
    pub fn cuisines_in_city(&self, city: &str) -> BTreeSet<&str> {
        self.restaurants
            .iter()
            .filter(|r| r.city == city)
            .flat_map(|r| r.cuisine_styles.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}
