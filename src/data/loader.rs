use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::literal::{self, Literal};
use super::model::{columns, dedup_cuisines, Restaurant, RestaurantTable, Reviews};
use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a restaurant table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the columns in [`columns::REQUIRED`]
/// * `.json`    – `[{ "Name": ..., "City": ..., ... }, ...]`
/// * `.parquet` – one column per field; list columns as literal text or
///   native `List<Utf8>` / `List<List<Utf8>>`
///
/// A malformed `Cuisine Style` or `Reviews` value in any row fails the whole
/// load; no partial table is returned.
pub fn load_file(path: &Path) -> Result<RestaurantTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(ExplorerError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} restaurants in {} cities from {}",
        table.len(),
        table.cities().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Format-independent row normalisation
// ---------------------------------------------------------------------------

/// A list-valued cell before shape checking.
enum ListCell {
    Missing,
    Text(String),
    Parsed(Literal),
}

impl ListCell {
    fn into_literal(self, row: usize, column: &'static str) -> Result<Option<Literal>> {
        match self {
            ListCell::Missing => Ok(None),
            ListCell::Text(text) => literal::parse(&text)
                .map(Some)
                .map_err(|e| ExplorerError::data_format(row, column, e.to_string())),
            ListCell::Parsed(lit) => Ok(Some(lit)),
        }
    }
}

/// One input row as read from any of the formats.
struct RawRow {
    name: Option<String>,
    city: Option<String>,
    cuisine_style: ListCell,
    price_range: Option<String>,
    rating: Option<f64>,
    num_reviews: Option<f64>,
    reviews: ListCell,
    url_ta: Option<String>,
}

impl RawRow {
    fn into_restaurant(self, row: usize) -> Result<Restaurant> {
        let cuisine_styles = match self.cuisine_style.into_literal(row, columns::CUISINE_STYLE)? {
            Some(lit) => lit
                .into_string_list()
                .map_err(|e| ExplorerError::data_format(row, columns::CUISINE_STYLE, e.to_string()))?,
            None => Vec::new(),
        };

        let reviews = match self.reviews.into_literal(row, columns::REVIEWS)? {
            Some(lit) => {
                let (texts, dates) = lit
                    .into_list_pair()
                    .map_err(|e| ExplorerError::data_format(row, columns::REVIEWS, e.to_string()))?;
                Reviews::new(texts, dates)
            }
            None => Reviews::default(),
        };

        let num_reviews = match self.num_reviews {
            Some(n) if !n.is_nan() => review_count(row, n)?,
            _ => 0,
        };

        Ok(Restaurant {
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            cuisine_styles: dedup_cuisines(cuisine_styles),
            price_range: self.price_range,
            rating: self.rating.filter(|r| !r.is_nan()),
            num_reviews,
            reviews,
            url_ta: self.url_ta.unwrap_or_default(),
        })
    }
}

fn review_count(row: usize, value: f64) -> Result<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as u64)
    } else {
        Err(ExplorerError::data_format(
            row,
            columns::NUM_REVIEWS,
            format!("expected a non-negative whole number, got {value}"),
        ))
    }
}

/// Text that Pandas' `read_csv` reads as a missing value by default.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Like [`non_empty`], but every NA token counts as absent.
fn present(s: &str) -> Option<String> {
    if is_na(s) {
        None
    } else {
        Some(s.to_string())
    }
}

fn text_list_cell(text: &str) -> ListCell {
    if is_na(text) {
        ListCell::Missing
    } else {
        ListCell::Text(text.to_string())
    }
}

fn parse_number(row: usize, column: &'static str, text: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if is_na(text) {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| ExplorerError::data_format(row, column, format!("'{text}' is not a number")))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, extra columns ignored.
/// Empty cells and NA tokens (`NaN`, `N/A`, `null`, ...) are absent values;
/// `Cuisine Style` and `Reviews` hold list literals such as
/// `"['Italian', 'Pizza']"`.
fn load_csv(path: &Path) -> Result<RestaurantTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut positions = [0usize; 8];
    for (slot, column) in positions.iter_mut().zip(columns::REQUIRED) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ExplorerError::MissingColumn(column.to_string()))?;
    }
    let [name, city, cuisine, price, rating, num_reviews, reviews, url] = positions;

    let mut restaurants = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let raw = RawRow {
            name: present(cell(name)),
            city: present(cell(city)),
            cuisine_style: text_list_cell(cell(cuisine)),
            price_range: present(cell(price)),
            rating: parse_number(row, columns::RATING, cell(rating))?,
            num_reviews: parse_number(row, columns::NUM_REVIEWS, cell(num_reviews))?,
            reviews: text_list_cell(cell(reviews)),
            url_ta: present(cell(url)),
        };
        restaurants.push(raw.into_restaurant(row)?);
    }

    Ok(RestaurantTable::from_restaurants(restaurants))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Name": "Trattoria",
///     "City": "Rome",
///     "Cuisine Style": "['Italian', 'Pizza']",
///     "Price Range": "$$ - $$$",
///     "Rating": 4.5,
///     "Number of Reviews": 120,
///     "Reviews": [["Lovely"], ["01/02/2018"]],
///     "URL_TA": "/Restaurant_Review-..."
///   }
/// ]
/// ```
///
/// List columns may be literal strings or native arrays. Missing keys and
/// `null` are absent values.
#[derive(Debug, Deserialize)]
struct JsonRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "Cuisine Style")]
    cuisine_style: Option<JsonValue>,
    #[serde(rename = "Price Range")]
    price_range: Option<String>,
    #[serde(rename = "Rating")]
    rating: Option<f64>,
    #[serde(rename = "Number of Reviews")]
    num_reviews: Option<f64>,
    #[serde(rename = "Reviews")]
    reviews: Option<JsonValue>,
    #[serde(rename = "URL_TA")]
    url_ta: Option<String>,
}

fn load_json(path: &Path) -> Result<RestaurantTable> {
    let text = std::fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
    let rows: Vec<JsonRow> = serde_json::from_str(&text)?;

    let mut restaurants = Vec::with_capacity(rows.len());

    for (row, rec) in rows.into_iter().enumerate() {
        let raw = RawRow {
            name: rec.name.as_deref().and_then(non_empty),
            city: rec.city.as_deref().and_then(non_empty),
            cuisine_style: json_list_cell(row, columns::CUISINE_STYLE, rec.cuisine_style)?,
            price_range: rec.price_range.as_deref().and_then(non_empty),
            rating: rec.rating,
            num_reviews: rec.num_reviews,
            reviews: json_list_cell(row, columns::REVIEWS, rec.reviews)?,
            url_ta: rec.url_ta.as_deref().and_then(non_empty),
        };
        restaurants.push(raw.into_restaurant(row)?);
    }

    Ok(RestaurantTable::from_restaurants(restaurants))
}

fn json_list_cell(row: usize, column: &'static str, value: Option<JsonValue>) -> Result<ListCell> {
    match value {
        None | Some(JsonValue::Null) => Ok(ListCell::Missing),
        Some(JsonValue::String(s)) if s.is_empty() => Ok(ListCell::Missing),
        Some(JsonValue::String(s)) => Ok(ListCell::Text(s)),
        Some(value @ JsonValue::Array(_)) => json_to_literal(value)
            .map(ListCell::Parsed)
            .map_err(|msg| ExplorerError::data_format(row, column, msg)),
        Some(other) => Err(ExplorerError::data_format(
            row,
            column,
            format!("expected a list, got {other}"),
        )),
    }
}

fn json_to_literal(value: JsonValue) -> std::result::Result<Literal, String> {
    match value {
        JsonValue::String(s) => Ok(Literal::Str(s)),
        JsonValue::Array(items) => items
            .into_iter()
            .map(json_to_literal)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Literal::List),
        other => Err(format!("unexpected list element {other}")),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing the restaurant table.
///
/// Text columns are cast to `Utf8`. Numeric columns stored as text are parsed
/// cell by cell like CSV; other numeric columns are cast to `Float64` without
/// turning unconvertible values into nulls.
fn load_parquet(path: &Path) -> Result<RestaurantTable> {
    let file = File::open(path).map_err(|e| ExplorerError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut restaurants = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let mut positions = [0usize; 8];
        for (slot, column) in positions.iter_mut().zip(columns::REQUIRED) {
            *slot = schema
                .index_of(column)
                .map_err(|_| ExplorerError::MissingColumn(column.to_string()))?;
        }
        let [name, city, cuisine, price, rating, num_reviews, reviews, url] = positions;

        let name_col = cast(batch.column(name).as_ref(), &DataType::Utf8)?;
        let city_col = cast(batch.column(city).as_ref(), &DataType::Utf8)?;
        let price_col = cast(batch.column(price).as_ref(), &DataType::Utf8)?;
        let url_col = cast(batch.column(url).as_ref(), &DataType::Utf8)?;
        let rating_col = numeric_column(batch.column(rating))?;
        let num_reviews_col = numeric_column(batch.column(num_reviews))?;
        let cuisine_col = batch.column(cuisine);
        let reviews_col = batch.column(reviews);

        for r in 0..batch.num_rows() {
            let row = restaurants.len();
            let raw = RawRow {
                name: text_at(&name_col, r),
                city: text_at(&city_col, r),
                cuisine_style: arrow_list_cell(cuisine_col.as_ref(), r)
                    .map_err(|msg| ExplorerError::data_format(row, columns::CUISINE_STYLE, msg))?,
                price_range: text_at(&price_col, r),
                rating: number_at(&rating_col, r, row, columns::RATING)?,
                num_reviews: number_at(&num_reviews_col, r, row, columns::NUM_REVIEWS)?,
                reviews: arrow_list_cell(reviews_col.as_ref(), r)
                    .map_err(|msg| ExplorerError::data_format(row, columns::REVIEWS, msg))?,
                url_ta: text_at(&url_col, r),
            };
            restaurants.push(raw.into_restaurant(row)?);
        }
    }

    Ok(RestaurantTable::from_restaurants(restaurants))
}

// -- Parquet / Arrow helpers --

/// Read a cell of a column already cast to `Utf8`.
fn text_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    present(col.as_string::<i32>().value(row))
}

/// String columns become `Utf8`, anything else `Float64`. The cast is not
/// `safe`, so a value that cannot be converted is an error rather than null.
fn numeric_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => DataType::Utf8,
        _ => DataType::Float64,
    };
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    Ok(cast_with_options(col.as_ref(), &target, &options)?)
}

/// Read a cell of a column prepared by [`numeric_column`].
fn number_at(col: &ArrayRef, r: usize, row: usize, column: &'static str) -> Result<Option<f64>> {
    if col.is_null(r) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => parse_number(row, column, col.as_string::<i32>().value(r)),
        _ => Ok(Some(col.as_primitive::<Float64Type>().value(r))),
    }
}

fn arrow_list_cell(col: &dyn Array, row: usize) -> std::result::Result<ListCell, String> {
    if col.is_null(row) {
        return Ok(ListCell::Missing);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        DataType::List(_) | DataType::LargeList(_) => {
            return arrow_to_literal(col, row).map(ListCell::Parsed);
        }
        other => return Err(format!("unsupported column type {other:?}")),
    };
    Ok(text_list_cell(text))
}

/// Convert one (possibly nested) Arrow list value into a [`Literal`].
fn arrow_to_literal(array: &dyn Array, row: usize) -> std::result::Result<Literal, String> {
    if array.is_null(row) {
        return Err("null list element".to_string());
    }
    match array.data_type() {
        DataType::Utf8 => Ok(Literal::Str(array.as_string::<i32>().value(row).to_string())),
        DataType::LargeUtf8 => Ok(Literal::Str(array.as_string::<i64>().value(row).to_string())),
        DataType::List(_) => list_items(array.as_list::<i32>().value(row).as_ref()),
        DataType::LargeList(_) => list_items(array.as_list::<i64>().value(row).as_ref()),
        other => Err(format!("unsupported list element type {other:?}")),
    }
}

fn list_items(values: &dyn Array) -> std::result::Result<Literal, String> {
    (0..values.len())
        .map(|i| arrow_to_literal(values, i))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Literal::List)
}
