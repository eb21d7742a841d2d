//! Best-effort CSV reader for watch-history exports.
//!
//! Handles comma separators, double-quote quoting with `""` escapes, and
//! `\n`, `\r\n` or bare `\r` line endings. Malformed quoting never fails:
//! a quote simply toggles quoted mode wherever it appears.

/// Parse `text` into rows of cells.
///
/// Rows whose cells are all empty are dropped, so blank lines and a trailing
/// line terminator produce no rows.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            '\n' | '\r' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut current));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }

    row.push(current);
    push_row(&mut rows, row);
    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.is_empty()) {
        rows.push(row);
    }
}
