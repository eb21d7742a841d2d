pub mod config;
pub mod csv;
pub mod deeplink;
pub mod error;
pub mod filter;
pub mod history;
pub mod import;
pub mod models;
pub mod normalize;
pub mod picker;
pub mod storage;
pub mod watched;
