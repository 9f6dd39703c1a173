/// Data layer: core types, loading, and cleaning.
///
/// Architecture:
/// ```text
///   <site>.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset (empty on failure)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  named columns of typed cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaner  │  timestamps, numeric coercion, imputation
///   └──────────┘
///        │
///        ▼
///   <site>_cleaned.csv
/// ```

pub mod cleaner;
pub mod loader;
pub mod model;
