use std::sync::Arc;

use crate::data::filter::{filtered_indices, FilterSelection, FilteredView};
use crate::data::metrics::{compute_metrics, Metrics, DEFAULT_TARGET, TARGET_MAX, TARGET_MIN};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one dashboard session owns between interactions, independent
/// of rendering. Each interaction mutates the selection or the target and
/// triggers one full recomputation pass, with no incremental updates.
pub struct DashboardState {
    /// Loaded dataset (None until the shell loads a file). Shared read-only.
    pub dataset: Option<Arc<Dataset>>,

    /// Current selection across years, months and platforms.
    pub selection: FilterSelection,

    /// Sales goal, clamped to [TARGET_MIN, TARGET_MAX].
    pub sales_target: f64,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// KPIs for the current view and target (cached).
    pub metrics: Metrics,

    /// Status / error message shown by the shell.
    pub status_message: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            dataset: None,
            selection: FilterSelection::default(),
            sales_target: DEFAULT_TARGET,
            visible_indices: Vec::new(),
            metrics: Metrics::default(),
            status_message: None,
        }
    }
}

impl DashboardState {
    /// Ingest a newly loaded dataset: select everything, then recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// The current filtered view, rehydrated from the cached indices.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_deref()
            .map(|ds| FilteredView::from_indices(ds, self.visible_indices.clone()))
    }

    /// Recompute indices and metrics after a selection or target change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.selection);
            let view = FilteredView::from_indices(ds, self.visible_indices.clone());
            self.metrics = compute_metrics(&view, self.sales_target);
        }
    }

    /// Toggle a single year in the selection.
    pub fn toggle_year(&mut self, year: i32) {
        if !self.selection.years.remove(&year) {
            self.selection.years.insert(year);
        }
        self.refilter();
    }

    /// Toggle a single month (abbreviated name) in the selection.
    pub fn toggle_month(&mut self, month: &str) {
        if !self.selection.months.remove(month) {
            self.selection.months.insert(month.to_string());
        }
        self.refilter();
    }

    /// Toggle a single platform in the selection.
    pub fn toggle_platform(&mut self, platform: &str) {
        if !self.selection.platforms.remove(platform) {
            self.selection.platforms.insert(platform.to_string());
        }
        self.refilter();
    }

    /// Select every month present in the dataset (the "All" button).
    pub fn select_all_months(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.months = ds.month_names.iter().map(|m| m.to_string()).collect();
        }
        self.refilter();
    }

    /// Deselect every month (the "None" button).
    pub fn select_no_months(&mut self) {
        self.selection.months.clear();
        self.refilter();
    }

    /// Set the sales goal, clamped to the slider range, and recompute.
    pub fn set_target(&mut self, target: f64) {
        self.sales_target = target.clamp(TARGET_MIN, TARGET_MAX);
        self.refilter();
    }
}
