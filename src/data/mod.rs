/// Data layer: core types, loading, filtering and ranking.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐      ┌─────────┐
///   │  loader   │◄────│ literal  │  strict list-literal parsing
///   └──────────┘      └─────────┘
///        │   (memoised by cache)
///        ▼
///   ┌─────────────────┐
///   │ RestaurantTable  │  Vec<Restaurant>, city / price indices
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  city, cuisine, price predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ ranking   │  weighted score, stable sort → Ranking
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod literal;
pub mod loader;
pub mod model;
pub mod ranking;
