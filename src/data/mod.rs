/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (cached per path + mtime)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, unique-value indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSelection → FilteredView
///   └──────────┘
///        │
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   ┌──────────┐  ┌──────────┐  ┌──────────┐
///   │ aggregate │  │ metrics  │  │  export  │
///   └──────────┘  └──────────┘  └──────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
