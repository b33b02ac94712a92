use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// FilterSelection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The user's current selection across the three filter dimensions.
///
/// An explicit value object handed in by the presentation layer on every
/// interaction. An empty set on any dimension means "exclude all" for that
/// dimension, so the resulting view is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
}

impl FilterSelection {
    /// Selection with every value present in the dataset selected.
    pub fn all(dataset: &Dataset) -> Self {
        FilterSelection {
            years: dataset.years.iter().copied().collect(),
            months: dataset.month_names.iter().map(|m| m.to_string()).collect(),
            platforms: dataset.platforms.iter().cloned().collect(),
        }
    }

    /// Whether a record passes all three membership predicates (logical AND).
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(&record.year)
            && self.months.contains(record.month_name)
            && self.platforms.contains(&record.platform)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass the selection, in dataset order.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Filter the dataset down to the records matching the selection.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView {
        dataset,
        indices: filtered_indices(dataset, selection),
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the matching subset, borrowed from the dataset
// ---------------------------------------------------------------------------

/// The subset of the dataset satisfying a selection.
///
/// Recomputed from scratch on every selection change; never persisted.
/// Iteration order is the dataset's order; sorting is applied only by
/// [`FilteredView::sorted_by_date_desc`] for the transaction table.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Rehydrate a view from indices cached by the session state.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    /// Matching records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    /// Indices of the matching records within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Narrow this view further with another selection pass.
    pub fn retain(&self, selection: &FilterSelection) -> FilteredView<'a> {
        FilteredView {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| selection.matches(&self.dataset.records[i]))
                .collect(),
        }
    }

    /// Records sorted by order date, newest first. Display concern only:
    /// aggregation always consumes the unsorted view.
    pub fn sorted_by_date_desc(&self) -> Vec<&'a Record> {
        let mut rows: Vec<&Record> = self.records().collect();
        rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(y: i32, m: u32, platform: &str, brand: &str, sales: f64, cost: f64) -> Record {
        let d = date(y, m, 15);
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

    fn sample_dataset() -> Dataset {
        Dataset::from_records(vec![
            rec(2023, 1, "Amazon", "Nike", 100.0, 60.0),
            rec(2023, 2, "eBay", "Nike", 200.0, 150.0),
            rec(2024, 1, "Amazon", "Adidas", 300.0, 100.0),
        ])
    }

    #[test]
    fn full_selection_recovers_every_record() {
        let ds = sample_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        assert_eq!(view.len(), ds.len());
        let total: f64 = view.records().map(|r| r.sales_amount).sum();
        let expected: f64 = ds.records.iter().map(|r| r.sales_amount).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn empty_dimension_excludes_everything() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.months.clear();
        assert!(filter(&ds, &selection).is_empty());

        let mut selection = FilterSelection::all(&ds);
        selection.years.clear();
        assert!(filter(&ds, &selection).is_empty());

        let mut selection = FilterSelection::all(&ds);
        selection.platforms.clear();
        assert!(filter(&ds, &selection).is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.years = [2023].into_iter().collect();
        selection.platforms = ["Amazon".to_string()].into_iter().collect();

        let view = filter(&ds, &selection);
        // Only the 2023 Amazon record matches both predicates.
        assert_eq!(view.len(), 1);
        assert_eq!(view.records().next().unwrap().brand, "Nike");
    }

    #[test]
    fn filtering_preserves_dataset_order() {
        let ds = sample_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        assert_eq!(view.indices(), &[0, 1, 2]);
    }

    #[test]
    fn filter_is_idempotent() {
        let ds = sample_dataset();
        let mut selection = FilterSelection::all(&ds);
        selection.years = [2023].into_iter().collect();

        let once = filter(&ds, &selection);
        let twice = once.retain(&selection);
        assert_eq!(once.indices(), twice.indices());
    }

    #[test]
    fn date_sort_is_descending_and_display_only() {
        let ds = sample_dataset();
        let view = filter(&ds, &FilterSelection::all(&ds));
        let sorted = view.sorted_by_date_desc();
        assert_eq!(sorted[0].year, 2024);
        assert_eq!(sorted[2].month_name, "Jan");
        // The view itself is untouched.
        assert_eq!(view.indices(), &[0, 1, 2]);
    }
}
