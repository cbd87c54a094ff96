//! Claims reporting engine.
//!
//! Turns a batch of decoded insurance-claim rows into pivot tables, KPIs
//! and monthly trend series, and recomputes them when filters change.
//!
//! Pipeline: `loader` (CSV) -> `normalize` -> `classify` -> `reports`
//! (pivots + KPIs), with `filter` re-running `reports` on a subset,
//! `trend` building month series and `sort` reordering pivot tables.
//! `session::Dashboard` ties the stages together for an interactive run.

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod session;
pub mod sort;
pub mod trend;
pub mod types;
pub mod util;

pub use config::ReportConfig;
pub use error::{ClaimsError, Result};
pub use filter::{apply_filters, filter_options, recompute, FilterOptions, Recomputation};
pub use reports::{compute_kpis, generate_pivot, generate_pivots, summarize};
pub use session::{ingest, Dashboard, RecomputeOutcome, RecomputeRequest};
pub use sort::{sort_pivot, sort_table, SortDirection, SortState};
pub use trend::{consolidate_trends, Metric, TrendDataset, TrendPoint};
pub use types::{
    Bucket, ClaimRecord, FilterSpec, KpiData, PivotDict, PivotRow, PivotTable, ProcessedData,
    RawRow, RawValue, Summary,
};
