//! Data module - CSV loading and cleaning

mod cleaner;
mod loader;

pub use cleaner::{BrandTable, CleanError, DataCleaner};
pub use loader::{DataLoader, LoaderError};
