use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::filter::FilteredView;
use super::model::month_abbrev;

// ---------------------------------------------------------------------------
// Grouped sums feeding the charts
// ---------------------------------------------------------------------------
//
// All operations here are pure, sum-based groupings over a FilteredView.
// An empty view yields empty collections, never an error.

/// Summed sales and profit for one calendar month. Trend-line input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month_num: u32,
    pub month_name: &'static str,
    pub sales: f64,
    pub profit: f64,
}

/// Summed sales and profit for one grouping cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GroupTotals {
    pub sales: f64,
    pub profit: f64,
}

/// Sales and profit summed per month, ascending by month number.
pub fn monthly_totals(view: &FilteredView) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<u32, GroupTotals> = BTreeMap::new();
    for rec in view.records() {
        let cell = by_month.entry(rec.month_num).or_default();
        cell.sales += rec.sales_amount;
        cell.profit += rec.profit;
    }
    by_month
        .into_iter()
        .map(|(month_num, cell)| MonthlyTotal {
            month_num,
            month_name: month_abbrev(month_num),
            sales: cell.sales,
            profit: cell.profit,
        })
        .collect()
}

/// Sales summed per platform. Donut-chart proportions.
pub fn platform_share(view: &FilteredView) -> BTreeMap<String, f64> {
    let mut shares: BTreeMap<String, f64> = BTreeMap::new();
    for rec in view.records() {
        *shares.entry(rec.platform.clone()).or_default() += rec.sales_amount;
    }
    shares
}

/// Sales and profit summed per (platform, brand) pair. Treemap input;
/// the summed profit drives the cell colour scale.
pub fn brand_platform_breakdown(view: &FilteredView) -> BTreeMap<(String, String), GroupTotals> {
    let mut cells: BTreeMap<(String, String), GroupTotals> = BTreeMap::new();
    for rec in view.records() {
        let cell = cells
            .entry((rec.platform.clone(), rec.brand.clone()))
            .or_default();
        cell.sales += rec.sales_amount;
        cell.profit += rec.profit;
    }
    cells
}

/// The `n` brands with the greatest summed sales, descending.
///
/// Ties keep first-appearance order: totals accumulate in the order brands
/// first occur in the view, and the descending sort is stable.
pub fn top_brands(view: &FilteredView, n: usize) -> Vec<String> {
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for rec in view.records() {
        match slot.get(&rec.brand) {
            Some(&i) => totals[i].1 += rec.sales_amount,
            None => {
                slot.insert(rec.brand.clone(), totals.len());
                totals.push((rec.brand.clone(), rec.sales_amount));
            }
        }
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.into_iter().take(n).map(|(brand, _)| brand).collect()
}

/// Sales summed per (brand, platform) pair, restricted to the given brands.
/// Grouped-bar input for the top-brand comparison.
pub fn brand_platform_for_top_brands(
    view: &FilteredView,
    brands: &[String],
) -> BTreeMap<(String, String), f64> {
    let wanted: HashSet<&str> = brands.iter().map(|b| b.as_str()).collect();
    let mut cells: BTreeMap<(String, String), f64> = BTreeMap::new();
    for rec in view.records() {
        if !wanted.contains(rec.brand.as_str()) {
            continue;
        }
        *cells
            .entry((rec.brand.clone(), rec.platform.clone()))
            .or_default() += rec.sales_amount;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection, FilteredView};
    use crate::data::model::{Dataset, Record};
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, platform: &str, brand: &str, sales: f64, cost: f64) -> Record {
        let d = NaiveDate::from_ymd_opt(y, m, 10).unwrap();
        Record::new(
            d,
            d,
            platform.into(),
            brand.into(),
            "Completed".into(),
            1,
            sales,
            cost,
        )
    }

    fn spec_dataset() -> Dataset {
        Dataset::from_records(vec![
            rec(2023, 1, "Amazon", "Nike", 100.0, 60.0),
            rec(2023, 2, "eBay", "Nike", 200.0, 150.0),
            rec(2024, 1, "Amazon", "Adidas", 300.0, 100.0),
        ])
    }

    fn filtered_2023(ds: &Dataset) -> FilteredView<'_> {
        let mut selection = FilterSelection::all(ds);
        selection.years = [2023].into_iter().collect();
        filter(ds, &selection)
    }

    #[test]
    fn monthly_totals_are_sorted_without_duplicates() {
        let ds = spec_dataset();
        let view = filtered_2023(&ds);
        let totals = monthly_totals(&view);
        assert_eq!(
            totals,
            vec![
                MonthlyTotal {
                    month_num: 1,
                    month_name: "Jan",
                    sales: 100.0,
                    profit: 40.0
                },
                MonthlyTotal {
                    month_num: 2,
                    month_name: "Feb",
                    sales: 200.0,
                    profit: 50.0
                },
            ]
        );
    }

    #[test]
    fn monthly_totals_merge_same_month_across_years() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let totals = monthly_totals(&view);
        assert_eq!(totals.len(), 2);
        // Jan 2023 + Jan 2024 collapse into one month bucket.
        assert_eq!(totals[0].month_num, 1);
        assert_eq!(totals[0].sales, 400.0);
    }

    #[test]
    fn platform_share_sums_sales_per_channel() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let shares = platform_share(&view);
        assert_eq!(shares.get("Amazon"), Some(&400.0));
        assert_eq!(shares.get("eBay"), Some(&200.0));
    }

    #[test]
    fn breakdown_keeps_profit_per_cell() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let cells = brand_platform_breakdown(&view);
        let cell = cells
            .get(&("Amazon".to_string(), "Nike".to_string()))
            .unwrap();
        assert_eq!(cell.sales, 100.0);
        assert_eq!(cell.profit, 40.0);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn top_brands_ranks_by_total_sales() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        // Nike (100 + 200) ties Adidas (300); Nike appeared first and wins.
        assert_eq!(top_brands(&view, 5), vec!["Nike", "Adidas"]);
        assert_eq!(top_brands(&view, 1), vec!["Nike"]);
    }

    #[test]
    fn top_brands_caps_at_distinct_brand_count() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        assert_eq!(top_brands(&view, 5).len(), 2);
    }

    #[test]
    fn grouped_bar_restricts_to_requested_brands() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let top = vec!["Nike".to_string()];
        let cells = brand_platform_for_top_brands(&view, &top);
        assert_eq!(cells.len(), 2);
        assert_eq!(
            cells.get(&("Nike".to_string(), "Amazon".to_string())),
            Some(&100.0)
        );
        assert_eq!(
            cells.get(&("Nike".to_string(), "eBay".to_string())),
            Some(&200.0)
        );
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let ds = spec_dataset();
        let view = filter(&ds, &FilterSelection::default());
        assert!(monthly_totals(&view).is_empty());
        assert!(platform_share(&view).is_empty());
        assert!(brand_platform_breakdown(&view).is_empty());
        assert!(top_brands(&view, 5).is_empty());
        assert!(brand_platform_for_top_brands(&view, &[]).is_empty());
    }
}
