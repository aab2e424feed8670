//! Statistics Summary Module
//! Descriptive statistics and correlation analysis over the cleaned table.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;

/// Significance threshold for correlation p-values
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for a single numeric column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Pairwise Pearson correlations with two-tailed significance p-values.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub r: Vec<Vec<f64>>,
    pub p_values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.r[i][j]
    }

    /// Off-diagonal pair with a p-value at or below the threshold.
    pub fn is_significant(&self, i: usize, j: usize) -> bool {
        i != j && self.p_values[i][j] <= SIGNIFICANCE_THRESHOLD
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Non-null values of a column cast to f64.
    pub fn column_values(df: &DataFrame, column: &str) -> Vec<f64> {
        df.column(column)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn summarize(column: &str, values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::empty(column);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        ColumnSummary {
            column: column.to_string(),
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Summaries for several columns, computed in parallel.
    pub fn summarize_columns(df: &DataFrame, columns: &[&str]) -> Vec<ColumnSummary> {
        columns
            .par_iter()
            .map(|column| Self::summarize(column, &Self::column_values(df, column)))
            .collect()
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Pearson correlation coefficient of two equal-length samples.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len().min(y.len());
        if n < 2 {
            return f64::NAN;
        }

        let n_f = n as f64;
        let mean_x = x[..n].iter().sum::<f64>() / n_f;
        let mean_y = y[..n].iter().sum::<f64>() / n_f;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for i in 0..n {
            let dx = x[i] - mean_x;
            let dy = y[i] - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        cov / (var_x.sqrt() * var_y.sqrt())
    }

    /// Two-tailed p-value for a Pearson r over n samples, via the Student's
    /// t transform.
    fn correlation_p_value(r: f64, n: usize) -> f64 {
        if n < 3 || !r.is_finite() {
            return f64::NAN;
        }
        let dof = (n - 2) as f64;
        let denom = 1.0 - r * r;
        if denom <= f64::EPSILON {
            return 0.0;
        }
        let t = r.abs() * (dof / denom).sqrt();

        if let Ok(dist) = StudentsT::new(0.0, 1.0, dof) {
            2.0 * (1.0 - dist.cdf(t))
        } else {
            f64::NAN
        }
    }

    /// Full correlation matrix over the named columns; pairs computed in
    /// parallel. Diagonal is 1.0 with p-value 0.0.
    pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> CorrelationMatrix {
        let series: Vec<Vec<f64>> = columns
            .par_iter()
            .map(|column| Self::column_values(df, column))
            .collect();

        let k = columns.len();
        let pairs: Vec<(usize, usize)> = (0..k)
            .flat_map(|i| ((i + 1)..k).map(move |j| (i, j)))
            .collect();

        let computed: Vec<((usize, usize), (f64, f64))> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let r = Self::pearson(&series[i], &series[j]);
                let n = series[i].len().min(series[j].len());
                ((i, j), (r, Self::correlation_p_value(r, n)))
            })
            .collect();

        let mut r = vec![vec![1.0; k]; k];
        let mut p_values = vec![vec![0.0; k]; k];
        for ((i, j), (r_ij, p_ij)) in computed {
            r[i][j] = r_ij;
            r[j][i] = r_ij;
            p_values[i][j] = p_ij;
            p_values[j][i] = p_ij;
        }

        CorrelationMatrix {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            r,
            p_values,
        }
    }

    /// Value counts of a string column, most frequent first (ties broken by
    /// name for stable output).
    pub fn value_counts(df: &DataFrame, column: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        if let Ok(ca) = df.column(column).and_then(|col| col.str()) {
            for cell in ca.into_iter().flatten() {
                *counts.entry(cell.to_string()).or_insert(0) += 1;
            }
        }

        let mut out: Vec<(String, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Per-group value vectors for boxplots. Groups sort numerically when
    /// every key parses as a number, lexically otherwise.
    pub fn grouped_values(
        df: &DataFrame,
        group_col: &str,
        value_col: &str,
    ) -> Vec<(String, Vec<f64>)> {
        let Ok(group_series) = df.column(group_col) else {
            return Vec::new();
        };
        let Ok(value_cast) = df
            .column(value_col)
            .and_then(|col| col.cast(&DataType::Float64))
        else {
            return Vec::new();
        };
        let Ok(value_ca) = value_cast.f64() else {
            return Vec::new();
        };

        let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
        for row in 0..df.height() {
            if let (Ok(key), Some(value)) = (group_series.get(row), value_ca.get(row)) {
                if key.is_null() || value.is_nan() {
                    continue;
                }
                groups
                    .entry(Self::format_group_key(&key))
                    .or_default()
                    .push(value);
            }
        }

        let mut out: Vec<(String, Vec<f64>)> = groups.into_iter().collect();
        let all_numeric = out.iter().all(|(key, _)| key.parse::<f64>().is_ok());
        if all_numeric {
            out.sort_by(|a, b| {
                let x: f64 = a.0.parse().unwrap_or(f64::NAN);
                let y: f64 = b.0.parse().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            });
        } else {
            out.sort_by(|a, b| a.0.cmp(&b.0));
        }
        out
    }

    fn format_group_key(value: &AnyValue) -> String {
        match value {
            AnyValue::Float64(v) if v.fract() == 0.0 => format!("{v:.0}"),
            AnyValue::Float32(v) if f64::from(*v).fract() == 0.0 => format!("{v:.0}"),
            _ => value.to_string().trim_matches('"').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("price".into(), vec![100.0, 200.0, 300.0, 400.0]),
            Column::new("ram".into(), vec![4.0, 8.0, 8.0, 16.0]),
            Column::new("brand".into(), vec!["HP", "Dell", "HP", "Asus"]),
        ])
        .unwrap()
    }

    #[test]
    fn summarize_matches_known_values() {
        let summary = StatsCalculator::summarize("x", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.std - 1.5811388300841898).abs() < 1e-9);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q75, 4.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert!((StatsCalculator::percentile(&sorted, 50.0) - 25.0).abs() < 1e-12);
        assert!((StatsCalculator::percentile(&sorted, 25.0) - 17.5).abs() < 1e-12);
        assert_eq!(StatsCalculator::percentile(&sorted, 0.0), 10.0);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 40.0);
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!((StatsCalculator::pearson(&x, &inverse) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let df = sample_df();
        let matrix = StatsCalculator::correlation_matrix(&df, &["price", "ram"]);
        assert_eq!(matrix.columns, vec!["price", "ram"]);
        assert_eq!(matrix.coefficient(0, 0), 1.0);
        assert_eq!(matrix.coefficient(1, 1), 1.0);
        assert!((matrix.coefficient(0, 1) - matrix.coefficient(1, 0)).abs() < 1e-12);
    }

    #[test]
    fn perfect_correlation_is_significant() {
        let p = StatsCalculator::correlation_p_value(1.0, 10);
        assert_eq!(p, 0.0);
        let weak = StatsCalculator::correlation_p_value(0.1, 5);
        assert!(weak > SIGNIFICANCE_THRESHOLD);
    }

    #[test]
    fn value_counts_order_by_count_then_name() {
        let df = sample_df();
        let counts = StatsCalculator::value_counts(&df, "brand");
        assert_eq!(
            counts,
            vec![
                ("HP".to_string(), 2),
                ("Asus".to_string(), 1),
                ("Dell".to_string(), 1),
            ]
        );
    }

    #[test]
    fn grouped_values_sort_numeric_keys_numerically() {
        let df = sample_df();
        let groups = StatsCalculator::grouped_values(&df, "ram", "price");
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["4", "8", "16"]);
        assert_eq!(groups[1].1, vec![200.0, 300.0]);
    }
}
