//! Charts module - static chart rendering

mod renderer;

pub use renderer::{format_currency, ChartError, ChartRenderer, OverviewData, PALETTE};
