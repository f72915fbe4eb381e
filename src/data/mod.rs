/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  URL / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch / parse → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, year + vehicle type index
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by key → mean / sum / raw series
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
