use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Month names
// ---------------------------------------------------------------------------

/// Abbreviated month names, indexed by month number − 1.
pub const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviated name for a 1-based month number.
pub fn month_abbrev(month_num: u32) -> &'static str {
    match month_num {
        1..=12 => MONTH_ABBREVS[(month_num - 1) as usize],
        _ => "???",
    }
}

// ---------------------------------------------------------------------------
// Record – one sales transaction (one row of the source table)
// ---------------------------------------------------------------------------

/// A single sales transaction. Immutable after load.
///
/// The first eight fields come straight from the source columns; the last
/// four are derived from the order date and the amounts at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub invoice_date: NaiveDate,
    pub order_date: NaiveDate,
    pub platform: String,
    pub brand: String,
    pub order_status: String,
    pub quantity: i64,
    pub sales_amount: f64,
    pub cost_price: f64,

    // Derived fields
    pub year: i32,
    pub month_num: u32,
    pub month_name: &'static str,
    pub profit: f64,
}

impl Record {
    /// Build a record from the source columns, computing the derived fields
    /// (calendar fields from the order date, profit = sales − cost).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        invoice_date: NaiveDate,
        order_date: NaiveDate,
        platform: String,
        brand: String,
        order_status: String,
        quantity: i64,
        sales_amount: f64,
        cost_price: f64,
    ) -> Self {
        let month_num = order_date.month();
        Record {
            invoice_date,
            order_date,
            year: order_date.year(),
            month_num,
            month_name: month_abbrev(month_num),
            profit: sales_amount - cost_price,
            platform,
            brand,
            order_status,
            quantity,
            sales_amount,
            cost_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed unique-value indices.
///
/// Loaded once, read-only afterwards; safe to share behind an `Arc` across
/// concurrent filter/aggregate callers since nothing mutates it after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All transactions, in source order.
    pub records: Vec<Record>,
    /// Distinct years present, ascending.
    pub years: Vec<i32>,
    /// Distinct months present, in calendar order.
    pub month_names: Vec<&'static str>,
    /// Distinct platforms, sorted.
    pub platforms: Vec<String>,
    /// Distinct brands, sorted.
    pub brands: Vec<String>,
}

impl Dataset {
    /// Build the unique-value indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut month_nums: BTreeSet<u32> = BTreeSet::new();
        let mut platforms: BTreeSet<String> = BTreeSet::new();
        let mut brands: BTreeSet<String> = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            month_nums.insert(rec.month_num);
            platforms.insert(rec.platform.clone());
            brands.insert(rec.brand.clone());
        }

        Dataset {
            records,
            years: years.into_iter().collect(),
            month_names: month_nums.into_iter().map(month_abbrev).collect(),
            platforms: platforms.into_iter().collect(),
            brands: brands.into_iter().collect(),
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn derived_fields_follow_order_date() {
        let rec = Record::new(
            date(2023, 2, 14),
            date(2023, 2, 10),
            "Amazon".into(),
            "Nike".into(),
            "Completed".into(),
            3,
            250.0,
            180.0,
        );
        assert_eq!(rec.year, 2023);
        assert_eq!(rec.month_num, 2);
        assert_eq!(rec.month_name, "Feb");
        assert_eq!(rec.profit, 70.0);
    }

    #[test]
    fn month_abbrev_covers_calendar() {
        assert_eq!(month_abbrev(1), "Jan");
        assert_eq!(month_abbrev(12), "Dec");
        assert_eq!(month_abbrev(0), "???");
        assert_eq!(month_abbrev(13), "???");
    }

    #[test]
    fn dataset_indices_are_sorted_and_deduped() {
        let recs = vec![
            Record::new(
                date(2024, 3, 1),
                date(2024, 3, 1),
                "eBay".into(),
                "Puma".into(),
                "Shipped".into(),
                1,
                50.0,
                30.0,
            ),
            Record::new(
                date(2022, 1, 5),
                date(2022, 1, 5),
                "Amazon".into(),
                "Nike".into(),
                "Completed".into(),
                2,
                100.0,
                60.0,
            ),
            Record::new(
                date(2022, 1, 9),
                date(2022, 1, 9),
                "Amazon".into(),
                "Nike".into(),
                "Completed".into(),
                1,
                80.0,
                55.0,
            ),
        ];
        let ds = Dataset::from_records(recs);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years, vec![2022, 2024]);
        assert_eq!(ds.month_names, vec!["Jan", "Mar"]);
        assert_eq!(ds.platforms, vec!["Amazon", "eBay"]);
        assert_eq!(ds.brands, vec!["Nike", "Puma"]);
    }
}
