use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

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

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Uniform float in `lo..hi`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// One synthetic transaction, pre-formatted for both writers.
struct SampleRow {
    invoice_date: NaiveDate,
    order_date: NaiveDate,
    platform: &'static str,
    brand: &'static str,
    status: &'static str,
    quantity: i64,
    sales_amount: f64,
    cost_price: f64,
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    // 719_163 = days between 0001-01-01 and 1970-01-01.
    date.num_days_from_ce() - 719_163
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<SampleRow> {
    let platforms = ["Amazon", "eBay", "Shopify", "Walmart", "Etsy"];
    let statuses = ["Completed", "Completed", "Completed", "Shipped", "Returned", "Cancelled"];
    // (brand, typical unit price)
    let brands: [(&str, f64); 8] = [
        ("Nike", 95.0),
        ("Adidas", 85.0),
        ("Puma", 60.0),
        ("Asics", 75.0),
        ("New Balance", 80.0),
        ("Reebok", 55.0),
        ("Under Armour", 65.0),
        ("Brooks", 90.0),
    ];

    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid start date");
    let span_days = 4 * 365;

    (0..n)
        .map(|_| {
            let order_date = start + Duration::days(rng.below(span_days) as i64);
            let invoice_date = order_date + Duration::days(rng.below(6) as i64);
            let (brand, base_price) = brands[rng.below(brands.len() as u64) as usize];
            let quantity = 1 + rng.below(12) as i64;
            let unit_price = base_price * rng.range(0.8, 1.25);
            let sales_amount = (quantity as f64 * unit_price * 100.0).round() / 100.0;
            let cost_price = (sales_amount * rng.range(0.55, 0.85) * 100.0).round() / 100.0;

            SampleRow {
                invoice_date,
                order_date,
                platform: platforms[rng.below(platforms.len() as u64) as usize],
                brand,
                status: statuses[rng.below(statuses.len() as u64) as usize],
                quantity,
                sales_amount,
                cost_price,
            }
        })
        .collect()
}

fn write_csv(rows: &[SampleRow], path: &str) {
    let mut wtr = csv::Writer::from_path(path).expect("Failed to create CSV file");
    wtr.write_record([
        "Invoice Date",
        "Sales Order Date",
        "Platform",
        "Brand",
        "Order Status",
        "Quantity",
        "Sales Amount",
        "Cost Price",
    ])
    .expect("Failed to write CSV header");

    for row in rows {
        wtr.write_record([
            row.invoice_date.to_string(),
            row.order_date.to_string(),
            row.platform.to_string(),
            row.brand.to_string(),
            row.status.to_string(),
            row.quantity.to_string(),
            format!("{:.2}", row.sales_amount),
            format!("{:.2}", row.cost_price),
        ])
        .expect("Failed to write CSV row");
    }
    wtr.flush().expect("Failed to flush CSV file");
}

fn write_parquet(rows: &[SampleRow], path: &str) {
    let invoice_array =
        Date32Array::from(rows.iter().map(|r| days_since_epoch(r.invoice_date)).collect::<Vec<_>>());
    let order_array =
        Date32Array::from(rows.iter().map(|r| days_since_epoch(r.order_date)).collect::<Vec<_>>());
    let platform_array = StringArray::from(rows.iter().map(|r| r.platform).collect::<Vec<_>>());
    let brand_array = StringArray::from(rows.iter().map(|r| r.brand).collect::<Vec<_>>());
    let status_array = StringArray::from(rows.iter().map(|r| r.status).collect::<Vec<_>>());
    let quantity_array = Int64Array::from(rows.iter().map(|r| r.quantity).collect::<Vec<_>>());
    let sales_array = Float64Array::from(rows.iter().map(|r| r.sales_amount).collect::<Vec<_>>());
    let cost_array = Float64Array::from(rows.iter().map(|r| r.cost_price).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Invoice Date", DataType::Date32, false),
        Field::new("Sales Order Date", DataType::Date32, false),
        Field::new("Platform", DataType::Utf8, false),
        Field::new("Brand", DataType::Utf8, false),
        Field::new("Order Status", DataType::Utf8, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Sales Amount", DataType::Float64, false),
        Field::new("Cost Price", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(invoice_array),
            Arc::new(order_array),
            Arc::new(platform_array),
            Arc::new(brand_array),
            Arc::new(status_array),
            Arc::new(quantity_array),
            Arc::new(sales_array),
            Arc::new(cost_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(5000, &mut rng);

    write_csv(&rows, "sample_sales.csv");
    write_parquet(&rows, "sample_sales.parquet");

    println!(
        "Wrote {} transactions to sample_sales.csv and sample_sales.parquet",
        rows.len()
    );
}
