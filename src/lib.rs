//! Restaurant explorer core.
//!
//! Loads a restaurant table (CSV, JSON or Parquet), filters it by city,
//! cuisine and price band, and ranks the survivors by a popularity-weighted
//! rating. Rendering is left to the caller; [`state::ExplorerState`] holds
//! everything a presentation layer needs between selection changes.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::ExplorerConfig;
pub use data::cache::DatasetCache;
pub use data::filter::FilterCriteria;
pub use data::model::{Restaurant, RestaurantTable, Reviews};
pub use data::ranking::{apply, Ranking};
pub use error::ExplorerError;
pub use state::ExplorerState;
