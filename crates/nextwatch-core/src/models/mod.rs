pub mod catalog;
pub mod watch;

pub use catalog::{CatalogItem, DetailRecord, Genre, MediaKind, MediaList, Rating};
pub use watch::{HistoryEntry, WatchEntry};
