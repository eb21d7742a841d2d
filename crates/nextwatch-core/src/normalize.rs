//! Title folding and the "same title" key shared by import, merge and lookup.

/// Separator between the folded title and the year in a title key.
const KEY_SEPARATOR: char = '|';

/// Fold a title for comparison.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single space, then trims. Non-ASCII letters count as separators, so
/// "Amélie" folds to "am lie" on both sides of a comparison.
pub fn fold_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_space = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Key under which two (title, year) pairs are considered the same title.
///
/// The year is used verbatim; callers trim it first.
pub fn normalized_title_key(title: &str, year: &str) -> String {
    let mut key = fold_title(title);
    key.push(KEY_SEPARATOR);
    key.push_str(year);
    key
}

/// Fold a CSV header cell: lowercase and drop everything outside `[a-z0-9]`.
pub fn fold_header(cell: &str) -> String {
    cell.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_spacing_fold_together() {
        assert_eq!(
            normalized_title_key("The Matrix!", "1999"),
            normalized_title_key("the   matrix", "1999")
        );
    }

    #[test]
    fn fold_examples() {
        assert_eq!(fold_title("Spider-Man: No Way Home"), "spider man no way home");
        assert_eq!(fold_title("  WALL·E  "), "wall e");
        assert_eq!(fold_title("2001: A Space Odyssey"), "2001 a space odyssey");
        assert_eq!(fold_title("Amélie"), "am lie");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert_eq!(fold_title(""), "");
        assert_eq!(fold_title("?!..."), "");
        assert_eq!(normalized_title_key("", ""), "|");
    }

    #[test]
    fn year_is_verbatim() {
        assert_eq!(normalized_title_key("Dune", "2021"), "dune|2021");
        assert_ne!(
            normalized_title_key("Dune", "2021"),
            normalized_title_key("Dune", "2021 ")
        );
        assert_ne!(
            normalized_title_key("Dune", "1984"),
            normalized_title_key("Dune", "2021")
        );
    }

    #[test]
    fn header_folding() {
        assert_eq!(fold_header("Film Name"), "filmname");
        assert_eq!(fold_header("IMDb ID"), "imdbid");
        assert_eq!(fold_header("imdb_id"), "imdbid");
        assert_eq!(fold_header("\u{feff}Name"), "name");
    }
}
