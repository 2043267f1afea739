use super::filter::{filtered_indices, FilterCriteria};
use super::model::{Restaurant, RestaurantTable};

// ---------------------------------------------------------------------------
// Popularity-weighted ranking
// ---------------------------------------------------------------------------

/// One ranked restaurant: its row index in the source table and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRow {
    pub index: usize,
    pub score: f64,
}

/// Output of one pipeline run, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    rows: Vec<RankedRow>,
}

impl Ranking {
    pub fn rows(&self) -> &[RankedRow] {
        &self.rows
    }

    /// The best pick, `None` when nothing survived the filters.
    pub fn top(&self) -> Option<&RankedRow> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pair each row with its restaurant. Positions are 1-based.
    pub fn resolve<'a>(
        &'a self,
        table: &'a RestaurantTable,
    ) -> impl Iterator<Item = (usize, &'a Restaurant, f64)> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| table.get(row.index).map(|r| (r, row.score)))
            .enumerate()
            .map(|(pos, (r, score))| (pos + 1, r, score))
    }
}

/// `rating * (1 + ln(1 + n) / ln(1 + max_n))`.
///
/// When `max_n` is 0 the popularity term is 0 and the score is the rating.
pub fn weighted_score(rating: f64, num_reviews: u64, max_num_reviews: u64) -> f64 {
    let denominator = (max_num_reviews as f64).ln_1p();
    let boost = if denominator == 0.0 {
        0.0
    } else {
        (num_reviews as f64).ln_1p() / denominator
    };
    rating * (1.0 + boost)
}

/// Run the full filter-rank pipeline.
///
/// Restaurants without a rating are dropped before scoring, and the review
/// maximum is taken over the rated survivors only. The sort is stable, so
/// equal scores keep table order.
pub fn apply(table: &RestaurantTable, criteria: &FilterCriteria) -> Ranking {
    let rated: Vec<(usize, f64, u64)> = filtered_indices(table, criteria)
        .into_iter()
        .filter_map(|i| {
            let r = table.get(i)?;
            let rating = r.rating.filter(|v| !v.is_nan())?;
            Some((i, rating, r.num_reviews))
        })
        .collect();

    let max_num_reviews = rated.iter().map(|&(_, _, n)| n).max().unwrap_or(0);

    let mut rows: Vec<RankedRow> = rated
        .into_iter()
        .map(|(index, rating, n)| RankedRow {
            index,
            score: weighted_score(rating, n, max_num_reviews),
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));

    log::debug!(
        "Ranked {} restaurants for city '{}' (max reviews {max_num_reviews})",
        rows.len(),
        criteria.city
    );

    Ranking { rows }
}
