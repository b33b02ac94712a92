//! Filtering, aggregation and KPI pipeline behind a sales analytics
//! dashboard.
//!
//! The presentation layer hands in a [`data::filter::FilterSelection`] and a
//! sales target on each interaction and gets back a filtered view, scalar
//! KPIs and the grouped aggregates its charts consume. The dataset itself is
//! loaded once and shared read-only for the life of the process.

pub mod data;
pub mod state;
