pub mod client;
pub mod error;
pub mod types;

pub use client::MdbListClient;
pub use error::CatalogError;
