//! Plain-text rendering of lists, result cards and history for the terminal.

use std::fmt::Write as _;

use nextwatch_core::deeplink::StremioLinks;
use nextwatch_core::models::{CatalogItem, DetailRecord, HistoryEntry, MediaList};

/// Score bucket used to label the result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreClass {
    High,
    Mid,
    Low,
}

impl ScoreClass {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            ScoreClass::High
        } else if score >= 50.0 {
            ScoreClass::Mid
        } else {
            ScoreClass::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreClass::High => "high",
            ScoreClass::Mid => "mid",
            ScoreClass::Low => "low",
        }
    }
}

/// `2h 15m`, or `45m` under an hour.
pub fn format_runtime(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn type_label(item: &CatalogItem) -> String {
    if item.raw_media_type.trim().is_empty() {
        item.kind_or_movie().to_string()
    } else {
        capitalize(item.raw_media_type.trim())
    }
}

/// One-line summary: `Title (Year) · Movie`.
pub fn headline(item: &CatalogItem) -> String {
    let mut line = item.title.clone();
    if !item.year.is_empty() {
        let _ = write!(line, " ({})", item.year);
    }
    let _ = write!(line, " \u{00B7} {}", type_label(item));
    line
}

pub fn result_card(detail: &DetailRecord, links: Option<&StremioLinks>) -> String {
    let item = &detail.item;
    let mut out = String::new();

    let _ = writeln!(out, "{}", headline(item));

    let mut meta = Vec::new();
    if let Some(runtime) = item.runtime.filter(|&m| m > 0) {
        meta.push(format_runtime(runtime));
    }
    if let Some(score) = item.score {
        meta.push(format!("score {score:.0} ({})", ScoreClass::of(score).as_str()));
    }
    if !meta.is_empty() {
        let _ = writeln!(out, "{}", meta.join("  \u{00B7}  "));
    }

    if !item.genres.is_empty() {
        let _ = writeln!(out, "Genres: {}", item.genres.join(", "));
    }
    if !item.ratings.is_empty() {
        let ratings: Vec<String> = item
            .ratings
            .iter()
            .map(|r| format!("{} {}", r.source, r.value))
            .collect();
        let _ = writeln!(out, "Ratings: {}", ratings.join(", "));
    }

    let description = item
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description available.");
    let _ = writeln!(out, "\n{description}");

    match links {
        Some(links) => {
            let _ = writeln!(out, "\nWeb: {}\nApp: {}", links.web, links.app);
        }
        None => {
            let _ = writeln!(out, "\nNo IMDb ID, player links unavailable.");
        }
    }
    if !detail.enriched {
        let _ = writeln!(out, "(details unavailable, showing list data)");
    }
    out
}

pub fn list_line(list: &MediaList) -> String {
    format!("{:>8}  {list}", list.id)
}

pub fn history_line(index: usize, entry: &HistoryEntry) -> String {
    let mut line = format!("{index:>2}. {}", entry.title);
    if !entry.year.is_empty() {
        let _ = write!(line, " ({})", entry.year);
    }
    let _ = write!(
        line,
        " \u{00B7} {} \u{00B7} {}",
        entry.media_type,
        entry.timestamp.format("%Y-%m-%d %H:%M")
    );
    line
}

pub fn quota_line(remaining: u64) -> String {
    format!("{remaining} left")
}

#[cfg(test)]
mod tests {
    use nextwatch_core::models::{MediaKind, Rating};

    use super::*;

    fn detail(item: CatalogItem) -> DetailRecord {
        DetailRecord {
            item,
            enriched: true,
        }
    }

    #[test]
    fn runtime_formats() {
        assert_eq!(format_runtime(45), "45m");
        assert_eq!(format_runtime(60), "1h 0m");
        assert_eq!(format_runtime(135), "2h 15m");
    }

    #[test]
    fn score_classes() {
        assert_eq!(ScoreClass::of(70.0), ScoreClass::High);
        assert_eq!(ScoreClass::of(69.9), ScoreClass::Mid);
        assert_eq!(ScoreClass::of(50.0), ScoreClass::Mid);
        assert_eq!(ScoreClass::of(12.0), ScoreClass::Low);
    }

    #[test]
    fn card_shows_everything_known() {
        let item = CatalogItem {
            imdb_id: Some("tt0113277".into()),
            title: "Heat".into(),
            year: "1995".into(),
            media_type: Some(MediaKind::Movie),
            raw_media_type: "movie".into(),
            score: Some(83.0),
            runtime: Some(170),
            genres: vec!["crime".into(), "drama".into()],
            ratings: vec![Rating {
                source: "imdb".into(),
                value: 8.3,
            }],
            description: Some("A group of bank robbers.".into()),
            ..Default::default()
        };
        let links = StremioLinks::new("tt0113277", MediaKind::Movie);
        let card = result_card(&detail(item), links.as_ref());

        assert!(card.starts_with("Heat (1995) \u{00B7} Movie\n"));
        assert!(card.contains("2h 50m"));
        assert!(card.contains("score 83 (high)"));
        assert!(card.contains("Genres: crime, drama"));
        assert!(card.contains("Ratings: imdb 8.3"));
        assert!(card.contains("A group of bank robbers."));
        assert!(card.contains("Web: https://web.stremio.com/#/detail/movie/tt0113277"));
        assert!(!card.contains("showing list data"));
    }

    #[test]
    fn card_placeholders() {
        let item = CatalogItem {
            title: "Mystery".into(),
            description: Some("   ".into()),
            ..Default::default()
        };
        let card = result_card(
            &DetailRecord {
                item,
                enriched: false,
            },
            None,
        );
        assert!(card.starts_with("Mystery \u{00B7} Movie\n"));
        assert!(card.contains("No description available."));
        assert!(card.contains("player links unavailable"));
        assert!(card.contains("showing list data"));
    }

    #[test]
    fn list_and_quota_lines() {
        let list = MediaList {
            id: 42,
            name: "Horror Classics".into(),
            items: Some(120),
        };
        assert_eq!(list_line(&list), "      42  Horror Classics (120 items)");
        assert_eq!(quota_line(950), "950 left");
    }
}
