//! Reporting Module
//! Consumes the cleaned table: prints the statistics tables to stdout and
//! drives chart rendering.

use crate::charts::{ChartError, ChartRenderer, OverviewData, PALETTE};
use crate::stats::{ColumnSummary, StatsCalculator, SIGNIFICANCE_THRESHOLD};
use plotters::style::RGBColor;
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// The numeric columns every report aggregates over.
pub const NUMERIC_COLUMNS: [&str; 4] = ["price", "ram", "ssd", "rating"];

const TOP_BRANDS: usize = 10;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recognized reporting options, passed explicitly at call time instead of
/// living in process-global styling state.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub currency_symbol: String,
    pub figure_size: (u32, u32),
    pub palette: Vec<RGBColor>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports/images"),
            currency_symbol: "₹".to_string(),
            figure_size: (1200, 800),
            palette: PALETTE.to_vec(),
        }
    }
}

/// Builds the full report from a cleaned listing table.
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Print every statistics table and write every chart artifact.
    pub fn run(&self, df: &DataFrame) -> Result<(), ReportError> {
        fs::create_dir_all(&self.config.output_dir)?;
        let renderer = ChartRenderer::new(&self.config);

        self.print_descriptive_stats(df);

        let matrix = StatsCalculator::correlation_matrix(df, &NUMERIC_COLUMNS);
        Self::print_correlation_matrix(&matrix.columns, &matrix.r, &matrix.p_values);
        let path = renderer.correlation_heatmap(&matrix)?;
        info!(path = %path.display(), "chart written");

        let top_brands: Vec<(String, usize)> = StatsCalculator::value_counts(df, "brand")
            .into_iter()
            .take(TOP_BRANDS)
            .collect();
        println!();
        println!("Top {} brands by model count:", top_brands.len());
        for (brand, count) in &top_brands {
            println!("  {brand:<12} {count:>6}");
        }
        let path = renderer.brand_bar_chart(&top_brands)?;
        info!(path = %path.display(), "chart written");

        let overview = Self::overview_data(df)?;
        let path = renderer.overview_panel(&overview)?;
        info!(path = %path.display(), "chart written");

        let category_counts = StatsCalculator::value_counts(df, "category");
        println!();
        println!("Category distribution:");
        for (category, count) in &category_counts {
            println!("  {category:<12} {count:>6}");
        }
        let price_by_category = StatsCalculator::grouped_values(df, "category", "price");
        let path = renderer.category_boxplot(&price_by_category)?;
        info!(path = %path.display(), "chart written");

        Ok(())
    }

    fn print_descriptive_stats(&self, df: &DataFrame) {
        let summaries = StatsCalculator::summarize_columns(df, &NUMERIC_COLUMNS);

        println!();
        println!("Descriptive statistics:");
        print!("{:>8}", "");
        for summary in &summaries {
            print!("{:>14}", summary.column);
        }
        println!();

        let rows: [(&str, fn(&ColumnSummary) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, value_of) in rows {
            print!("{label:>8}");
            for summary in &summaries {
                print!("{:>14.2}", value_of(summary));
            }
            println!();
        }
    }

    fn print_correlation_matrix(columns: &[String], r: &[Vec<f64>], p_values: &[Vec<f64>]) {
        println!();
        println!("Correlation matrix (* = significant at p <= {SIGNIFICANCE_THRESHOLD}):");
        print!("{:>8}", "");
        for name in columns {
            print!("{name:>12}");
        }
        println!();

        for (i, name) in columns.iter().enumerate() {
            print!("{name:>8}");
            for j in 0..columns.len() {
                let marker = if i != j && p_values[i][j] <= SIGNIFICANCE_THRESHOLD {
                    "*"
                } else {
                    ""
                };
                print!("{:>12}", format!("{:.3}{marker}", r[i][j]));
            }
            println!();
        }
    }

    /// Assemble the data slices for the 2x2 overview composite.
    fn overview_data(df: &DataFrame) -> Result<OverviewData, ReportError> {
        let prices = StatsCalculator::column_values(df, "price");
        let price_by_ram = StatsCalculator::grouped_values(df, "ram", "price");

        // Unrated rows carry the 0 sentinel and would distort the boxplots.
        let rated = df
            .clone()
            .lazy()
            .filter(col("rating").gt(lit(0.0)))
            .collect()?;
        let rating_by_brand = StatsCalculator::grouped_values(&rated, "brand", "rating");

        let ssds = StatsCalculator::column_values(df, "ssd");
        let rams = StatsCalculator::column_values(df, "ram");
        let ssd_price_ram = ssds
            .iter()
            .zip(prices.iter())
            .zip(rams.iter())
            .map(|((&ssd, &price), &ram)| (ssd, price, ram))
            .collect();

        Ok(OverviewData {
            prices,
            price_by_ram,
            rating_by_brand,
            ssd_price_ram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("price".into(), vec![54999.0, 34999.0, 99999.0]),
            Column::new("ram".into(), vec![8.0, 8.0, 16.0]),
            Column::new("ssd".into(), vec![256.0, 512.0, 512.0]),
            Column::new("rating".into(), vec![4.5, 0.0, 4.8]),
            Column::new("brand".into(), vec!["HP", "Dell", "Apple"]),
            Column::new("category".into(), vec!["Gaming", "General", "Apple"]),
        ])
        .unwrap()
    }

    #[test]
    fn default_config_carries_the_fixed_conventions() {
        let config = ReportConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("reports/images"));
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.figure_size, (1200, 800));
        assert!(!config.palette.is_empty());
    }

    #[test]
    fn overview_data_excludes_unrated_rows_from_rating_panel() {
        let df = cleaned_df();
        let overview = Reporter::overview_data(&df).unwrap();

        assert_eq!(overview.prices.len(), 3);
        assert_eq!(overview.ssd_price_ram.len(), 3);

        // Dell's 0-sentinel rating must not appear in the rating panel.
        let brands: Vec<&str> = overview
            .rating_by_brand
            .iter()
            .map(|(brand, _)| brand.as_str())
            .collect();
        assert_eq!(brands, vec!["Apple", "HP"]);
    }

    #[test]
    fn overview_data_groups_prices_by_ram_tier() {
        let df = cleaned_df();
        let overview = Reporter::overview_data(&df).unwrap();
        assert_eq!(overview.price_by_ram.len(), 2);
        assert_eq!(overview.price_by_ram[0].0, "8");
        assert_eq!(overview.price_by_ram[0].1, vec![54999.0, 34999.0]);
        assert_eq!(overview.price_by_ram[1].0, "16");
    }
}
