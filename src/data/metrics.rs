use serde::Serialize;

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// Target bounds (the slider range of the goal control)
// ---------------------------------------------------------------------------

pub const TARGET_MIN: f64 = 10_000.0;
pub const TARGET_MAX: f64 = 1_000_000.0;
pub const DEFAULT_TARGET: f64 = 500_000.0;

// ---------------------------------------------------------------------------
// Metrics – the scalar KPIs behind the gauge and summary cards
// ---------------------------------------------------------------------------

/// Scalar KPIs derived from a filtered view and a sales target.
///
/// All divisions are guarded: a zero-sales view has `margin_pct` 0 and a
/// non-positive target has `progress_ratio` 0, never NaN and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Profit as a percentage of sales.
    pub margin_pct: f64,
    /// Sales relative to the target (1.0 = on target).
    pub progress_ratio: f64,
    /// Amount still missing to reach the target.
    pub gap: f64,
    /// Amount past the target.
    pub surplus: f64,
}

/// Compute the KPIs for a view against a sales target.
///
/// The presentation layer bounds the target to a positive range, but a
/// target ≤ 0 is still treated as "no ratio" rather than failing.
pub fn compute_metrics(view: &FilteredView, target: f64) -> Metrics {
    let total_sales: f64 = view.records().map(|r| r.sales_amount).sum();
    let total_profit: f64 = view.records().map(|r| r.profit).sum();

    let margin_pct = if total_sales > 0.0 {
        total_profit / total_sales * 100.0
    } else {
        0.0
    };
    let progress_ratio = if target > 0.0 {
        total_sales / target
    } else {
        0.0
    };

    Metrics {
        total_sales,
        total_profit,
        margin_pct,
        progress_ratio,
        gap: (target - total_sales).max(0.0),
        surplus: (total_sales - target).max(0.0),
    }
}
