//! Catalog API clients for nextwatch.

pub mod mdblist;
pub mod traits;

pub use mdblist::{CatalogError, MdbListClient};
pub use traits::CatalogService;
