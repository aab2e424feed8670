//! Statistics module - descriptive summaries and correlations

mod summary;

pub use summary::{
    ColumnSummary, CorrelationMatrix, StatsCalculator, SIGNIFICANCE_THRESHOLD,
};
