/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DeorbitTable, check required columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DeorbitTable  │  Vec<DeorbitRecord>, source order
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
