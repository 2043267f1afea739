use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use restaurant_explorer::data::literal::Literal;
use restaurant_explorer::data::model::columns;

const CITIES: [(&str, u32); 5] = [
    ("Paris", 187147),
    ("Rome", 187791),
    ("Lisbon", 189158),
    ("Berlin", 187323),
    ("Madrid", 187514),
];

const CUISINES: [&str; 12] = [
    "Italian",
    "French",
    "Pizza",
    "Japanese",
    "Sushi",
    "Portuguese",
    "German",
    "Spanish",
    "Cafe",
    "Vegetarian Friendly",
    "Seafood",
    "Bar",
];

const PRICES: [&str; 3] = ["$", "$$ - $$$", "$$$$"];

const ADJECTIVES: [&str; 8] = [
    "Golden", "Little", "Old", "Blue", "Happy", "Hidden", "Royal", "Corner",
];
const NOUNS: [&str; 8] = [
    "Table", "Kitchen", "Fork", "Garden", "Oven", "Lantern", "Harbour", "Bistro",
];

const REVIEW_SNIPPETS: [&str; 8] = [
    "Great food and friendly staff",
    "Lovely place, will come back",
    "A bit overpriced",
    "Best pizza in town",
    "Cosy atmosphere",
    "Slow service but worth it",
    "Authentic and delicious",
    "Nice terrace, average food",
];

const RESTAURANTS_PER_CITY: usize = 40;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

struct SampleRow {
    name: String,
    city: String,
    cuisines: Vec<String>,
    price: Option<&'static str>,
    rating: Option<f64>,
    num_reviews: Option<i64>,
    review_texts: Vec<String>,
    review_dates: Vec<String>,
    url: String,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::with_capacity(CITIES.len() * RESTAURANTS_PER_CITY);

    for &(city, geo_id) in &CITIES {
        for i in 0..RESTAURANTS_PER_CITY {
            let name = format!("{} {}", rng.pick(&ADJECTIVES), rng.pick(&NOUNS));

            let mut cuisines: Vec<String> = Vec::new();
            for _ in 0..rng.below(4) {
                let c = rng.pick(&CUISINES).to_string();
                if !cuisines.contains(&c) {
                    cuisines.push(c);
                }
            }

            let price = if rng.chance(0.1) {
                None
            } else {
                Some(PRICES[rng.below(PRICES.len())])
            };

            // Ratings come in half steps between 1.0 and 5.0
            let rating = if rng.chance(0.05) {
                None
            } else {
                Some(1.0 + rng.below(9) as f64 * 0.5)
            };

            // Heavy-tailed review counts: most places have few reviews
            let num_reviews = if rng.chance(0.05) {
                None
            } else {
                Some((rng.next_f64().powi(3) * 3000.0) as i64)
            };

            let n_reviews = rng.below(3);
            let review_texts = (0..n_reviews)
                .map(|_| rng.pick(&REVIEW_SNIPPETS).to_string())
                .collect();
            let review_dates = (0..n_reviews)
                .map(|_| format!("{:02}/{:02}/2017", 1 + rng.below(12), 1 + rng.below(28)))
                .collect();

            let slug = name.replace(' ', "_");
            let url = format!("/Restaurant_Review-g{geo_id}-d{}-Reviews-{slug}-{city}.html", 1000 + i);

            rows.push(SampleRow {
                name,
                city: city.to_string(),
                cuisines,
                price,
                rating,
                num_reviews,
                review_texts,
                review_dates,
                url,
            });
        }
    }

    rows
}

fn write_csv(rows: &[SampleRow], output_path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(columns::REQUIRED)?;

    for row in rows {
        writer.write_record([
            row.name.clone(),
            row.city.clone(),
            Literal::string_list(&row.cuisines).to_string(),
            row.price.unwrap_or("").to_string(),
            row.rating.map(|r| format!("{r:.1}")).unwrap_or_default(),
            row.num_reviews.map(|n| n.to_string()).unwrap_or_default(),
            Literal::list_pair(&row.review_texts, &row.review_dates).to_string(),
            row.url.clone(),
        ])?;
    }

    writer.flush().context("flushing CSV writer")?;
    Ok(())
}

fn build_batch(rows: &[SampleRow]) -> Result<RecordBatch> {
    // Cuisine styles go out as a native list column
    let mut cuisine_builder = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for c in &row.cuisines {
            cuisine_builder.values().append_value(c);
        }
        cuisine_builder.append(true);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new(columns::NAME, DataType::Utf8, false),
        Field::new(columns::CITY, DataType::Utf8, false),
        Field::new(
            columns::CUISINE_STYLE,
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
        Field::new(columns::PRICE_RANGE, DataType::Utf8, true),
        Field::new(columns::RATING, DataType::Float64, true),
        Field::new(columns::NUM_REVIEWS, DataType::Int64, true),
        Field::new(columns::REVIEWS, DataType::Utf8, true),
        Field::new(columns::URL_TA, DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.city.as_str()))),
            Arc::new(cuisine_builder.finish()),
            Arc::new(StringArray::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.rating).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.num_reviews).collect::<Vec<_>>())),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| {
                Literal::list_pair(&r.review_texts, &r.review_dates).to_string()
            }))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.url.as_str()))),
        ],
    )
    .context("building record batch")?;

    Ok(batch)
}

fn write_parquet(batch: &RecordBatch, output_path: &str) -> Result<()> {
    let file = File::create(output_path).with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let csv_path = "sample_restaurants.csv";
    write_csv(&rows, csv_path)?;

    let batch = build_batch(&rows)?;
    let parquet_path = "sample_restaurants.parquet";
    write_parquet(&batch, parquet_path)?;

    log::info!("Preview:\n{}", pretty_format_batches(&[batch.slice(0, 5)])?);

    println!(
        "Wrote {} restaurants in {} cities to {csv_path} and {parquet_path}",
        rows.len(),
        CITIES.len()
    );
    Ok(())
}
