/// Data layer: table types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .tsv / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  ordered columns, Vec<Row>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  select rows by column values → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
