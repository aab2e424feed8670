//! Data Cleaner Module
//! Transforms the raw listings table into the normalized analysis table.

use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("missing required column `{0}`")]
    MissingColumn(String),
    #[error("row {row}: cannot parse `{column}` value \"{value}\" as a number")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error("row {row}: missing `{column}` value")]
    MissingValue { column: String, row: usize },
}

/// Columns that must survive name normalization for cleaning to proceed.
const REQUIRED_COLUMNS: [&str; 5] = ["price", "ram", "ssd", "rating", "model"];

/// Characters stripped from price strings before parsing.
const CURRENCY_SYMBOLS: [char; 5] = ['₹', '$', '€', '£', '¥'];

/// Exact-match lookup from raw brand token to canonical brand name.
///
/// Injectable so aliases can be added without touching the cleaning flow.
#[derive(Debug, Clone)]
pub struct BrandTable {
    map: HashMap<String, String>,
}

impl BrandTable {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            map: pairs
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Canonical name for a raw brand token; unknown tokens pass through
    /// verbatim.
    pub fn canonical(&self, token: &str) -> String {
        self.map
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }
}

impl Default for BrandTable {
    fn default() -> Self {
        // Known spellings already equal their canonical form; the table is
        // the extension point for future aliases.
        const KNOWN_BRANDS: [&str; 11] = [
            "Apple", "HP", "Lenovo", "Dell", "Asus", "Acer", "MSI", "Samsung", "Xiaomi", "Honor",
            "Huawei",
        ];
        Self {
            map: KNOWN_BRANDS
                .iter()
                .map(|b| (b.to_string(), b.to_string()))
                .collect(),
        }
    }
}

enum CategoryPattern {
    /// Case-insensitive substring match against the model name.
    ModelContainsAny(&'static [&'static str]),
    /// Exact match against the canonical brand.
    BrandEquals(&'static str),
}

/// One (predicate, label) pair; later rules overwrite earlier matches.
struct CategoryRule {
    label: &'static str,
    pattern: CategoryPattern,
}

impl CategoryRule {
    fn matches(&self, model_lower: &str, brand: &str) -> bool {
        match self.pattern {
            CategoryPattern::ModelContainsAny(needles) => {
                needles.iter().any(|needle| model_lower.contains(needle))
            }
            CategoryPattern::BrandEquals(name) => brand == name,
        }
    }
}

const DEFAULT_CATEGORY: &str = "General";

/// Evaluated in order; the last matching rule wins.
const CATEGORY_RULES: [CategoryRule; 3] = [
    CategoryRule {
        label: "Gaming",
        pattern: CategoryPattern::ModelContainsAny(&["gaming"]),
    },
    CategoryRule {
        label: "Apple",
        pattern: CategoryPattern::BrandEquals("Apple"),
    },
    CategoryRule {
        label: "Ultrabook",
        pattern: CategoryPattern::ModelContainsAny(&["ultrabook", "thin", "slim"]),
    },
];

/// Lowercase a column name and replace internal spaces with underscores.
/// Idempotent.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Strip currency symbols, thousands separators and whitespace, then parse.
fn parse_price(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    if stripped.is_empty() {
        return None;
    }
    stripped.parse().ok()
}

/// Transforms a raw listing table into a cleaned one.
///
/// Pure with respect to its input: the raw DataFrame is never mutated. Any
/// malformed required field aborts the whole batch.
pub struct DataCleaner {
    brands: BrandTable,
    digit_re: Regex,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCleaner {
    pub fn new() -> Self {
        Self::with_brand_table(BrandTable::default())
    }

    pub fn with_brand_table(brands: BrandTable) -> Self {
        Self {
            brands,
            digit_re: Regex::new(r"\d+").expect("digit pattern is valid"),
        }
    }

    /// Produce the cleaned table: normalized column names, numeric
    /// `price`/`ram`/`ssd`/`rating`, derived `brand` and `category`.
    /// Passthrough columns keep their content.
    pub fn clean(&self, df: &DataFrame) -> Result<DataFrame, CleanError> {
        let mut out = df.clone();

        let normalized: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|name| normalize_column_name(name.as_str()))
            .collect();
        out.set_column_names(normalized)?;

        for required in REQUIRED_COLUMNS {
            if out.column(required).is_err() {
                return Err(CleanError::MissingColumn(required.to_string()));
            }
        }

        let prices = Self::parse_numeric_column(&out, "price", parse_price)?;
        let rams = Self::parse_numeric_column(&out, "ram", |raw| self.extract_digit_run(raw))?;
        let ssds = Self::parse_numeric_column(&out, "ssd", |raw| self.extract_digit_run(raw))?;
        let ratings = Self::rating_column(&out)?;
        let (brands, categories) = self.derive_brand_and_category(&out)?;

        out.with_column(Column::new("price".into(), prices))?;
        out.with_column(Column::new("ram".into(), rams))?;
        out.with_column(Column::new("ssd".into(), ssds))?;
        out.with_column(Column::new("rating".into(), ratings))?;
        out.with_column(Column::new("brand".into(), brands))?;
        out.with_column(Column::new("category".into(), categories))?;

        Ok(out)
    }

    /// First contiguous digit run anywhere in the string, as f64.
    fn extract_digit_run(&self, raw: &str) -> Option<f64> {
        self.digit_re
            .find(raw)
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Coerce a required column to f64 values, parsing strings with the
    /// given function. Nulls and unparsable values fail the batch.
    fn parse_numeric_column(
        df: &DataFrame,
        name: &str,
        parse: impl Fn(&str) -> Option<f64>,
    ) -> Result<Vec<f64>, CleanError> {
        let col = df.column(name)?;
        let mut values = Vec::with_capacity(df.height());

        match col.dtype() {
            DataType::String => {
                let ca = col.str()?;
                for (row, cell) in ca.into_iter().enumerate() {
                    let raw = cell.ok_or_else(|| CleanError::MissingValue {
                        column: name.to_string(),
                        row,
                    })?;
                    let value = parse(raw).ok_or_else(|| CleanError::Parse {
                        column: name.to_string(),
                        row,
                        value: raw.to_string(),
                    })?;
                    values.push(value);
                }
            }
            _ => {
                let cast = col.cast(&DataType::Float64)?;
                let ca = cast.f64()?;
                for (row, cell) in ca.into_iter().enumerate() {
                    let value = cell.ok_or_else(|| CleanError::MissingValue {
                        column: name.to_string(),
                        row,
                    })?;
                    values.push(value);
                }
            }
        }

        Ok(values)
    }

    /// Rating column with the missing-value sentinel: absent or blank cells
    /// become exactly 0.0, indistinguishable from an explicit zero.
    fn rating_column(df: &DataFrame) -> Result<Vec<f64>, CleanError> {
        let col = df.column("rating")?;
        let mut values = Vec::with_capacity(df.height());

        match col.dtype() {
            DataType::String => {
                let ca = col.str()?;
                for (row, cell) in ca.into_iter().enumerate() {
                    match cell.map(str::trim).filter(|s| !s.is_empty()) {
                        None => values.push(0.0),
                        Some(raw) => {
                            let value = raw.parse().map_err(|_| CleanError::Parse {
                                column: "rating".to_string(),
                                row,
                                value: raw.to_string(),
                            })?;
                            values.push(value);
                        }
                    }
                }
            }
            _ => {
                let cast = col.cast(&DataType::Float64)?;
                let ca = cast.f64()?;
                values.extend(ca.into_iter().map(|cell| cell.unwrap_or(0.0)));
            }
        }

        Ok(values)
    }

    /// Brand from the first whitespace token of the model, canonicalized;
    /// category from the ordered overwrite rules.
    fn derive_brand_and_category(
        &self,
        df: &DataFrame,
    ) -> Result<(Vec<String>, Vec<String>), CleanError> {
        let ca = df.column("model")?.str()?;
        let mut brands = Vec::with_capacity(df.height());
        let mut categories = Vec::with_capacity(df.height());

        for (row, cell) in ca.into_iter().enumerate() {
            let model = cell
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| CleanError::MissingValue {
                    column: "model".to_string(),
                    row,
                })?;

            // Non-empty after trim, so a first token always exists.
            let token = model.split_whitespace().next().unwrap_or(model);
            let brand = self.brands.canonical(token);

            let model_lower = model.to_lowercase();
            let mut category = DEFAULT_CATEGORY;
            for rule in &CATEGORY_RULES {
                if rule.matches(&model_lower, &brand) {
                    category = rule.label;
                }
            }

            brands.push(brand);
            categories.push(category.to_string());
        }

        Ok((brands, categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table(rows: &[(&str, &str, &str, Option<f64>, &str)]) -> DataFrame {
        let prices: Vec<&str> = rows.iter().map(|r| r.0).collect();
        let rams: Vec<&str> = rows.iter().map(|r| r.1).collect();
        let ssds: Vec<&str> = rows.iter().map(|r| r.2).collect();
        let ratings: Vec<Option<f64>> = rows.iter().map(|r| r.3).collect();
        let models: Vec<&str> = rows.iter().map(|r| r.4).collect();

        DataFrame::new(vec![
            Column::new("Price".into(), prices),
            Column::new("Ram".into(), rams),
            Column::new("SSD".into(), ssds),
            Column::new("Rating".into(), ratings),
            Column::new("Model".into(), models),
        ])
        .unwrap()
    }

    fn f64_at(df: &DataFrame, column: &str, row: usize) -> f64 {
        df.column(column).unwrap().f64().unwrap().get(row).unwrap()
    }

    fn str_at(df: &DataFrame, column: &str, row: usize) -> String {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .get(row)
            .unwrap()
            .to_string()
    }

    #[test]
    fn price_normalization_strips_symbol_and_separators() {
        let raw = raw_table(&[("₹12,345", "8 GB", "512 GB", Some(4.0), "HP Pavilion")]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(f64_at(&cleaned, "price", 0), 12345.0);
    }

    #[test]
    fn unparsable_price_fails_the_batch() {
        let raw = raw_table(&[("call us", "8 GB", "512 GB", Some(4.0), "HP Pavilion")]);
        let err = DataCleaner::new().clean(&raw).unwrap_err();
        match err {
            CleanError::Parse { column, row, value } => {
                assert_eq!(column, "price");
                assert_eq!(row, 0);
                assert_eq!(value, "call us");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_extraction_takes_leading_digit_run() {
        let raw = raw_table(&[
            ("₹10,000", "16 GB", "512GB", Some(4.0), "Dell Inspiron"),
            ("₹20,000", "8GB DDR4", "1 TB SSD", Some(4.0), "Asus Vivo"),
        ]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(f64_at(&cleaned, "ram", 0), 16.0);
        assert_eq!(f64_at(&cleaned, "ssd", 0), 512.0);
        assert_eq!(f64_at(&cleaned, "ram", 1), 8.0);
        assert_eq!(f64_at(&cleaned, "ssd", 1), 1.0);
    }

    #[test]
    fn digit_free_storage_fails_the_batch() {
        let raw = raw_table(&[("₹10,000", "8 GB", "expandable", Some(4.0), "Dell Inspiron")]);
        let err = DataCleaner::new().clean(&raw).unwrap_err();
        assert!(matches!(err, CleanError::Parse { ref column, .. } if column == "ssd"));
    }

    #[test]
    fn column_name_normalization_is_idempotent() {
        let once = normalize_column_name("Operating System");
        assert_eq!(once, "operating_system");
        assert_eq!(normalize_column_name(&once), once);
    }

    #[test]
    fn missing_and_zero_ratings_are_indistinguishable() {
        let raw = raw_table(&[
            ("₹10,000", "8 GB", "256 GB", None, "Acer Aspire"),
            ("₹10,000", "8 GB", "256 GB", Some(0.0), "Acer Aspire"),
        ]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(f64_at(&cleaned, "rating", 0), 0.0);
        assert_eq!(f64_at(&cleaned, "rating", 0), f64_at(&cleaned, "rating", 1));
    }

    #[test]
    fn unknown_brand_token_passes_through() {
        let raw = raw_table(&[("₹10,000", "8 GB", "256 GB", Some(4.0), "Vaio FE14")]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(str_at(&cleaned, "brand", 0), "Vaio");
    }

    #[test]
    fn brand_table_aliases_are_applied() {
        let table = BrandTable::from_pairs(&[("apple", "Apple")]);
        let cleaner = DataCleaner::with_brand_table(table);
        let raw = raw_table(&[("₹10,000", "8 GB", "256 GB", Some(4.0), "apple MacBook Air")]);
        let cleaned = cleaner.clean(&raw).unwrap();
        assert_eq!(str_at(&cleaned, "brand", 0), "Apple");
        assert_eq!(str_at(&cleaned, "category", 0), "Apple");
    }

    #[test]
    fn category_rules_overwrite_in_order() {
        let raw = raw_table(&[
            ("₹1", "8 GB", "256 GB", Some(4.0), "HP Pavilion Gaming 15"),
            ("₹1", "8 GB", "256 GB", Some(4.0), "Apple MacBook Gaming"),
            ("₹1", "8 GB", "256 GB", Some(4.0), "Acer Nitro Gaming Slim"),
            ("₹1", "8 GB", "256 GB", Some(4.0), "Apple MacBook Air Ultrabook"),
            ("₹1", "8 GB", "256 GB", Some(4.0), "Lenovo ThinkPad E14"),
        ]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(str_at(&cleaned, "category", 0), "Gaming");
        assert_eq!(str_at(&cleaned, "category", 1), "Apple");
        assert_eq!(str_at(&cleaned, "category", 2), "Ultrabook");
        assert_eq!(str_at(&cleaned, "category", 3), "Ultrabook");
        // "Thin" substring of ThinkPad matches the Ultrabook rule, same as
        // the source's case-insensitive contains.
        assert_eq!(str_at(&cleaned, "category", 4), "Ultrabook");
    }

    #[test]
    fn end_to_end_row_matches_expected_values() {
        let raw = raw_table(&[(
            "₹54,999",
            "8 GB",
            "256 GB SSD",
            Some(4.5),
            "HP Pavilion Gaming 15",
        )]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(f64_at(&cleaned, "price", 0), 54999.0);
        assert_eq!(f64_at(&cleaned, "ram", 0), 8.0);
        assert_eq!(f64_at(&cleaned, "ssd", 0), 256.0);
        assert_eq!(f64_at(&cleaned, "rating", 0), 4.5);
        assert_eq!(str_at(&cleaned, "brand", 0), "HP");
        assert_eq!(str_at(&cleaned, "category", 0), "Gaming");
    }

    #[test]
    fn end_to_end_unrated_apple_ultrabook() {
        let raw = raw_table(&[(
            "₹1,09,990",
            "8 GB",
            "256 GB",
            None,
            "Apple MacBook Air Ultrabook",
        )]);
        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(f64_at(&cleaned, "rating", 0), 0.0);
        assert_eq!(str_at(&cleaned, "brand", 0), "Apple");
        // The Ultrabook rule runs after the Apple rule and wins.
        assert_eq!(str_at(&cleaned, "category", 0), "Ultrabook");
    }

    #[test]
    fn missing_model_fails_the_batch() {
        let raw = raw_table(&[("₹10,000", "8 GB", "256 GB", Some(4.0), "  ")]);
        let err = DataCleaner::new().clean(&raw).unwrap_err();
        assert!(matches!(err, CleanError::MissingValue { ref column, .. } if column == "model"));
    }

    #[test]
    fn passthrough_columns_keep_content_under_normalized_names() {
        let mut raw = raw_table(&[("₹10,000", "8 GB", "256 GB", Some(4.0), "Dell Inspiron")]);
        raw.with_column(Column::new("Operating System".into(), vec!["Windows 11"]))
            .unwrap();

        let cleaned = DataCleaner::new().clean(&raw).unwrap();
        assert_eq!(str_at(&cleaned, "operating_system", 0), "Windows 11");
        // The raw table is untouched.
        assert!(raw.column("Price").is_ok());
        assert!(raw.column("Operating System").is_ok());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let df = DataFrame::new(vec![
            Column::new("Price".into(), vec!["₹1"]),
            Column::new("Model".into(), vec!["HP Pavilion"]),
        ])
        .unwrap();
        let err = DataCleaner::new().clean(&df).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn(ref name) if name == "ram"));
    }
}
