//! Static Chart Renderer
//! Renders the report's PNG artifacts with plotters.
//!
//! Artifacts:
//! 1. correlation_matrix.png - diverging heatmap with annotated cells
//! 2. brands_count.png       - top-10 brand bar chart
//! 3. main_analysis.png      - 2x2 composite (price histogram, RAM vs price,
//!    rating by brand, SSD vs price)
//! 4. price_by_category.png  - price boxplots per derived category

use crate::report::ReportConfig;
use crate::stats::CorrelationMatrix;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart rendering failed: {0}")]
    Backend(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Backend(err.to_string())
    }
}

/// Color palette for grouped series
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(233, 30, 99),  // Pink
    RGBColor(0, 188, 212),  // Cyan
    RGBColor(255, 87, 34),  // Deep Orange
    RGBColor(121, 85, 72),  // Brown
    RGBColor(96, 125, 139), // Blue Grey
];

const HISTOGRAM_BINS: usize = 30;

/// Format a value as a currency label with thousands separators,
/// e.g. `54999.0` -> `"₹54,999"`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let negative = value < 0.0;
    let mut n = value.abs().round() as u64;

    let mut groups: Vec<String> = Vec::new();
    loop {
        let group = n % 1000;
        n /= 1000;
        if n == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{group:03}"));
    }
    groups.reverse();

    let sign = if negative { "-" } else { "" };
    format!("{sign}{symbol}{}", groups.join(","))
}

/// Diverging fill for correlation cells: blue at -1, white at 0, red at +1.
fn diverging_color(value: f64) -> RGBColor {
    fn lerp(a: u8, b: u8, t: f64) -> u8 {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
    }

    let v = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    if v < 0.0 {
        let t = 1.0 + v;
        RGBColor(lerp(59, 255, t), lerp(76, 255, t), lerp(192, 255, t))
    } else {
        let t = 1.0 - v;
        RGBColor(lerp(180, 255, t), lerp(4, 255, t), lerp(38, 255, t))
    }
}

/// Bin values into equal-width histogram buckets over their own range.
fn histogram_bins(values: &[f64], bins: usize) -> (f64, f64, Vec<u32>) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() {
        return (0.0, 1.0, vec![0; bins]);
    }
    if max <= min {
        max = min + 1.0;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0u32; bins];
    for &v in values {
        if v.is_nan() {
            continue;
        }
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (min, max, counts)
}

/// Y range with headroom, floored/ceiled to whole units.
fn padded_range(groups: &[(String, Vec<f64>)]) -> (f32, f32) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, values) in groups {
        for &v in values {
            if v.is_nan() {
                continue;
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.25).max(1.0);
    (((lo - pad).floor()) as f32, ((hi + pad).ceil()) as f32)
}

/// Data for the four-panel overview composite.
pub struct OverviewData {
    pub prices: Vec<f64>,
    pub price_by_ram: Vec<(String, Vec<f64>)>,
    pub rating_by_brand: Vec<(String, Vec<f64>)>,
    /// (ssd, price, ram) triples for the scatter panel.
    pub ssd_price_ram: Vec<(f64, f64, f64)>,
}

/// Renders the fixed report artifacts into the configured output directory.
pub struct ChartRenderer<'a> {
    config: &'a ReportConfig,
}

impl<'a> ChartRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    fn palette_color(&self, idx: usize) -> RGBColor {
        if self.config.palette.is_empty() {
            PALETTE[idx % PALETTE.len()]
        } else {
            self.config.palette[idx % self.config.palette.len()]
        }
    }

    /// Heatmap of the correlation matrix; significant off-diagonal pairs
    /// are starred.
    pub fn correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
    ) -> Result<PathBuf, ChartError> {
        let path = self.config.output_dir.join("correlation_matrix.png");
        let k = matrix.columns.len();
        let (width, height) = self.config.figure_size;
        let side = width.min(height);

        let root = BitMapBackend::new(&path, (side, side)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Correlation Matrix", ("sans-serif", 30))
            .margin(20)
            .top_x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(0i32..k as i32, k as i32..0i32)?;

        let columns = matrix.columns.clone();
        let label_for = move |v: &i32| -> String {
            columns
                .get(*v as usize)
                .cloned()
                .unwrap_or_default()
        };
        let columns_y = matrix.columns.clone();
        let label_for_y = move |v: &i32| -> String {
            columns_y
                .get(*v as usize)
                .cloned()
                .unwrap_or_default()
        };

        let cell_px = (side.saturating_sub(140) / k.max(1) as u32) as i32;
        chart
            .configure_mesh()
            .x_labels(k)
            .y_labels(k)
            .disable_x_mesh()
            .disable_y_mesh()
            .x_label_offset(cell_px / 2)
            .y_label_offset(cell_px / 2)
            .label_style(("sans-serif", 18))
            .x_label_formatter(&label_for)
            .y_label_formatter(&label_for_y)
            .draw()?;

        chart.draw_series((0..k).flat_map(|row| (0..k).map(move |col| (col, row))).map(
            |(col, row)| {
                let value = matrix.r[row][col];
                Rectangle::new(
                    [(col as i32, row as i32), (col as i32 + 1, row as i32 + 1)],
                    diverging_color(value).filled(),
                )
            },
        ))?;

        let annotation_font = ("sans-serif", 18).into_font().color(&BLACK);
        chart.draw_series((0..k).flat_map(|row| (0..k).map(move |col| (col, row))).map(
            |(col, row)| {
                let value = matrix.r[row][col];
                let label = if matrix.is_significant(row, col) {
                    format!("{value:.2}*")
                } else {
                    format!("{value:.2}")
                };
                EmptyElement::at((col as i32, row as i32))
                    + Text::new(label, (cell_px / 2 - 18, cell_px / 2 - 9), annotation_font.clone())
            },
        ))?;

        root.present()?;
        Ok(path.clone())
    }

    /// Bar chart of model counts for the most frequent brands.
    pub fn brand_bar_chart(&self, counts: &[(String, usize)]) -> Result<PathBuf, ChartError> {
        let path = self.config.output_dir.join("brands_count.png");
        let root =
            BitMapBackend::new(&path, self.config.figure_size).into_drawing_area();
        root.fill(&WHITE)?;

        let n = counts.len().max(1);
        let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as u32;
        let names: Vec<String> = counts.iter().map(|(name, _)| name.clone()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Top 10 Brands by Model Count", ("sans-serif", 30))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0u32..(max_count + max_count / 10 + 1))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&move |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 0.25 || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            })
            .x_desc("Brand")
            .y_desc("Count")
            .label_style(("sans-serif", 16))
            .draw()?;

        chart.draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
            Rectangle::new(
                [(i as f64 - 0.35, 0u32), (i as f64 + 0.35, *count as u32)],
                self.palette_color(i).filled(),
            )
        }))?;

        root.present()?;
        Ok(path.clone())
    }

    /// 2x2 overview composite mirroring the main analysis figure.
    pub fn overview_panel(&self, data: &OverviewData) -> Result<PathBuf, ChartError> {
        let path = self.config.output_dir.join("main_analysis.png");
        let (width, height) = self.config.figure_size;
        let root = BitMapBackend::new(&path, (width, height.max(width * 3 / 4)))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let panels = root.split_evenly((2, 2));
        self.price_histogram(&panels[0], &data.prices)?;
        self.grouped_boxplot(
            &panels[1],
            "RAM vs Price",
            "RAM (GB)",
            "Price",
            &data.price_by_ram,
            true,
        )?;
        self.grouped_boxplot(
            &panels[2],
            "Rating by Brand",
            "Brand",
            "Rating",
            &data.rating_by_brand,
            false,
        )?;
        self.ssd_price_scatter(&panels[3], &data.ssd_price_ram)?;

        root.present()?;
        Ok(path.clone())
    }

    /// Price boxplots per derived category.
    pub fn category_boxplot(
        &self,
        groups: &[(String, Vec<f64>)],
    ) -> Result<PathBuf, ChartError> {
        let path = self.config.output_dir.join("price_by_category.png");
        let root =
            BitMapBackend::new(&path, self.config.figure_size).into_drawing_area();
        root.fill(&WHITE)?;

        self.grouped_boxplot(&root, "Price by Category", "Category", "Price", groups, true)?;

        root.present()?;
        Ok(path.clone())
    }

    fn price_histogram(
        &self,
        area: &DrawingArea<BitMapBackend, Shift>,
        prices: &[f64],
    ) -> Result<(), ChartError> {
        let (min, max, counts) = histogram_bins(prices, HISTOGRAM_BINS);
        let bin_width = (max - min) / counts.len() as f64;
        let tallest = counts.iter().copied().max().unwrap_or(1);

        let mut chart = ChartBuilder::on(area)
            .caption("Price Distribution", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(55)
            .build_cartesian_2d(min..max, 0u32..(tallest + tallest / 10 + 1))?;

        let symbol = self.config.currency_symbol.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&move |v: &f64| format_currency(*v, &symbol))
            .x_desc("Price")
            .y_desc("Listings")
            .label_style(("sans-serif", 14))
            .draw()?;

        let color = self.palette_color(0);
        chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new([(x0, 0u32), (x0 + bin_width, count)], color.filled())
        }))?;

        Ok(())
    }

    fn grouped_boxplot(
        &self,
        area: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        groups: &[(String, Vec<f64>)],
        currency_axis: bool,
    ) -> Result<(), ChartError> {
        let n = groups.len().max(1);
        let (y_lo, y_hi) = padded_range(groups);
        let names: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)?;

        let symbol = self.config.currency_symbol.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&move |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 0.25 || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            })
            .y_label_formatter(&move |v: &f32| {
                if currency_axis {
                    format_currency(f64::from(*v), &symbol)
                } else {
                    format!("{v}")
                }
            })
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(("sans-serif", 14))
            .draw()?;

        let box_width = (area.dim_in_pixel().0 / (n as u32 * 3)).clamp(8, 50);
        chart.draw_series(groups.iter().enumerate().map(|(i, (_, values))| {
            let quartiles = Quartiles::new(values);
            Boxplot::new_vertical(i as f64, &quartiles)
                .width(box_width)
                .whisker_width(0.5)
                .style(self.palette_color(i))
        }))?;

        Ok(())
    }

    fn ssd_price_scatter(
        &self,
        area: &DrawingArea<BitMapBackend, Shift>,
        points: &[(f64, f64, f64)],
    ) -> Result<(), ChartError> {
        let mut x_hi = 0.0f64;
        let mut y_hi = 0.0f64;
        for &(ssd, price, _) in points {
            x_hi = x_hi.max(ssd);
            y_hi = y_hi.max(price);
        }
        if x_hi <= 0.0 {
            x_hi = 1.0;
        }
        if y_hi <= 0.0 {
            y_hi = 1.0;
        }

        let mut ram_tiers: Vec<u64> = points.iter().map(|&(_, _, ram)| ram as u64).collect();
        ram_tiers.sort_unstable();
        ram_tiers.dedup();

        let mut chart = ChartBuilder::on(area)
            .caption("SSD vs Price (by RAM)", ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..x_hi * 1.05, 0.0..y_hi * 1.05)?;

        let symbol = self.config.currency_symbol.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_label_formatter(&move |v: &f64| format_currency(*v, &symbol))
            .x_desc("SSD (GB)")
            .y_desc("Price")
            .label_style(("sans-serif", 14))
            .draw()?;

        for (tier_idx, &tier) in ram_tiers.iter().enumerate() {
            let color = self.palette_color(tier_idx);
            chart
                .draw_series(
                    points
                        .iter()
                        .filter(|&&(_, _, ram)| ram as u64 == tier)
                        .map(|&(ssd, price, _)| Circle::new((ssd, price), 4, color.filled())),
                )?
                .label(format!("{tier} GB"))
                .legend(move |(x, y)| Circle::new((x + 8, y), 4, color.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_formatting_inserts_thousands_separators() {
        assert_eq!(format_currency(54999.0, "₹"), "₹54,999");
        assert_eq!(format_currency(1234567.0, "₹"), "₹1,234,567");
        assert_eq!(format_currency(999.0, "₹"), "₹999");
        assert_eq!(format_currency(0.0, "₹"), "₹0");
        assert_eq!(format_currency(-1500.0, "$"), "-$1,500");
    }

    #[test]
    fn diverging_color_hits_endpoints() {
        assert_eq!(diverging_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        // Out-of-range values clamp instead of wrapping.
        assert_eq!(diverging_color(3.0), diverging_color(1.0));
    }

    #[test]
    fn histogram_bins_cover_the_full_range() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let (min, max, counts) = histogram_bins(&values, 5);
        assert_eq!(min, 0.0);
        assert_eq!(max, 9.0);
        assert_eq!(counts.iter().sum::<u32>(), values.len() as u32);
        // The maximum lands in the last bucket, not out of range.
        assert_eq!(*counts.last().unwrap(), 2);
    }

    #[test]
    fn histogram_of_constant_values_does_not_divide_by_zero() {
        let (min, max, counts) = histogram_bins(&[7.0, 7.0, 7.0], 4);
        assert!(max > min);
        assert_eq!(counts.iter().sum::<u32>(), 3);
    }

    #[test]
    fn padded_range_brackets_the_data() {
        let groups = vec![("a".to_string(), vec![10.0, 20.0]), ("b".to_string(), vec![30.0])];
        let (lo, hi) = padded_range(&groups);
        assert!(lo < 10.0);
        assert!(hi > 30.0);
    }
}
