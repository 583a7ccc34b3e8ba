#![doc = include_str!("README.md")]
mod catalog;
mod error;
mod loader;
mod source;

pub use catalog::ErrorCatalog;
pub use error::{
    fetch_error, invalid_argument, parse_error, CatalogError, CatalogErrorCode, CatalogResult,
};
pub use loader::{CatalogCache, CatalogLoader};
pub use source::{CatalogSource, HttpCatalogSource, StaticCatalogSource, LOCALES_PATH};

/// Locale used when the caller does not pick one.
pub const DEFAULT_LOCALE: &str = "en";
