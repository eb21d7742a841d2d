//! Watched-list import from CSV exports (Letterboxd and similar) and merging
//! of imported entries into one duplicate-free list.

use std::collections::HashSet;

use crate::csv;
use crate::models::WatchEntry;
use crate::normalize::{fold_header, normalized_title_key};

/// Field an import column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportField {
    Title,
    Year,
    ImdbId,
}

/// Accepted (folded) header names per field, in priority order.
pub const HEADER_SYNONYMS: &[(ImportField, &[&str])] = &[
    (ImportField::Title, &["title", "name", "filmname"]),
    (ImportField::Year, &["year", "filmyear"]),
    (ImportField::ImdbId, &["imdbid", "imdb"]),
];

/// Entries read from a single CSV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvImport {
    pub entries: Vec<WatchEntry>,
    /// False when the header had neither a title nor an IMDb column. Distinct
    /// from a recognized file that simply had no usable rows.
    pub header_recognized: bool,
}

/// Entries read from several files in one go, not yet merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub entries: Vec<WatchEntry>,
    pub header_recognized: bool,
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMap {
    title: Option<usize>,
    year: Option<usize>,
    imdb_id: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let folded: Vec<String> = header.iter().map(|h| fold_header(h)).collect();
        let mut map = ColumnMap::default();
        for &(field, synonyms) in HEADER_SYNONYMS {
            let idx = synonyms
                .iter()
                .find_map(|syn| folded.iter().position(|h| h == syn));
            match field {
                ImportField::Title => map.title = idx,
                ImportField::Year => map.year = idx,
                ImportField::ImdbId => map.imdb_id = idx,
            }
        }
        map
    }

    fn is_usable(&self) -> bool {
        self.title.is_some() || self.imdb_id.is_some()
    }

    fn cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
        idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
    }

    fn entry(&self, row: &[String]) -> Option<WatchEntry> {
        let entry = WatchEntry::new(
            Self::cell(row, self.title),
            Self::cell(row, self.year),
            Self::cell(row, self.imdb_id),
        );
        entry.is_identifiable().then_some(entry)
    }
}

/// Read watch entries from one CSV export. The first row is the header.
pub fn import_from_csv(text: &str) -> CsvImport {
    let rows = csv::parse(text);
    let Some((header, data)) = rows.split_first() else {
        return CsvImport::default();
    };

    let columns = ColumnMap::from_header(header);
    if !columns.is_usable() {
        tracing::debug!(?header, "CSV header not recognized");
        return CsvImport::default();
    }

    let entries: Vec<WatchEntry> = data.iter().filter_map(|row| columns.entry(row)).collect();
    tracing::debug!(
        rows = data.len(),
        entries = entries.len(),
        ?columns,
        "Parsed watch-history CSV"
    );

    CsvImport {
        entries,
        header_recognized: true,
    }
}

/// Read several exports; entries are concatenated in file order.
pub fn import_files<I, S>(texts: I) -> ImportBatch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = ImportBatch::default();
    for text in texts {
        let file = import_from_csv(text.as_ref());
        batch.header_recognized |= file.header_recognized;
        batch.entries.extend(file.entries);
    }
    batch
}

/// Dedup key: the IMDb ID when present, else the normalized title key.
pub fn dedup_key(entry: &WatchEntry) -> Option<String> {
    if !entry.imdb_id.is_empty() {
        Some(format!("imdb:{}", entry.imdb_id))
    } else if !entry.title.is_empty() {
        Some(format!(
            "title:{}",
            normalized_title_key(&entry.title, &entry.year)
        ))
    } else {
        None
    }
}

/// Drop duplicate entries, keeping the first occurrence of each key in its
/// original position. Entries with neither title nor ID are dropped.
pub fn merge(entries: impl IntoIterator<Item = WatchEntry>) -> Vec<WatchEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| dedup_key(entry).is_some_and(|key| seen.insert(key)))
        .collect()
}
