/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  DataSource::fetch_all → raw rows → schema check
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, distinct values per categorical field
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → FilteredView (order-preserving indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  summary, groups, progress, box stats
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod fixtures;
