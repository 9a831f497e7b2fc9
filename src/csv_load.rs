//! Slate ingestion from user-provided CSVs. Headers vary wildly between pool
//! hosts, so columns are detected by name heuristics; cell-level garbage is
//! recovered as absent, and only a schema with no moneyline columns at all is
//! fatal.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::state::{BookOdds, Matchup};
use crate::team_alias;

#[derive(Debug)]
pub struct LoadedSlate {
    pub matchups: Vec<Matchup>,
    pub warnings: Vec<String>,
}

pub fn load_slate_csv(path: &Path) -> Result<LoadedSlate> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read slate csv {}", path.display()))?;
    parse_slate_csv(&raw)
}

pub fn parse_slate_csv(raw: &str) -> Result<LoadedSlate> {
    let mut rows = csv_rows(raw);
    if rows.is_empty() {
        bail!("slate csv is empty");
    }
    let header = rows.remove(0);
    let layout = SlateLayout::detect(&header)?;

    let mut warnings = Vec::new();
    if layout.home_col.is_none() || layout.away_col.is_none() {
        warnings.push(
            "[WARN] No home/away team columns detected; using placeholder names".to_string(),
        );
    }
    if layout.kickoff_col.is_none() {
        warnings.push("[WARN] No kickoff column detected".to_string());
    }

    let matchups = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(i, row)| layout.build_matchup(i, row))
        .collect();

    Ok(LoadedSlate { matchups, warnings })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Home,
    Away,
}

#[derive(Debug)]
struct MlColumn {
    index: usize,
    book: String,
    side: Side,
}

#[derive(Debug)]
struct SlateLayout {
    home_col: Option<usize>,
    away_col: Option<usize>,
    kickoff_col: Option<usize>,
    ml_cols: Vec<MlColumn>,
    // Book labels in first-seen column order.
    books: Vec<String>,
}

impl SlateLayout {
    fn detect(header: &[String]) -> Result<Self> {
        let mut layout = Self {
            home_col: None,
            away_col: None,
            kickoff_col: None,
            ml_cols: Vec::new(),
            books: Vec::new(),
        };

        for (index, cell) in header.iter().enumerate() {
            let tokens = header_tokens(cell);
            if is_moneyline_header(&tokens) {
                // A moneyline column is only usable when tagged with a side.
                let side = if tokens.iter().any(|t| t == "home") {
                    Some(Side::Home)
                } else if tokens.iter().any(|t| t == "away") {
                    Some(Side::Away)
                } else {
                    None
                };
                if let Some(side) = side {
                    let book = book_label(cell, layout.books.len());
                    if !layout.books.iter().any(|b| b == &book) {
                        layout.books.push(book.clone());
                    }
                    layout.ml_cols.push(MlColumn { index, book, side });
                }
                continue;
            }
            if layout.home_col.is_none() && tokens.iter().any(|t| t == "home") {
                layout.home_col = Some(index);
                continue;
            }
            if layout.away_col.is_none() && tokens.iter().any(|t| t == "away") {
                layout.away_col = Some(index);
                continue;
            }
            if layout.kickoff_col.is_none() && is_kickoff_header(&tokens) {
                layout.kickoff_col = Some(index);
            }
        }

        if layout.ml_cols.is_empty() {
            bail!(
                "no moneyline columns found in slate csv; expected per-book headers \
                 like 'DraftKings Home ML' / 'DraftKings Away ML'"
            );
        }
        Ok(layout)
    }

    fn build_matchup(&self, row_idx: usize, row: &[String]) -> Matchup {
        let raw_home = cell(row, self.home_col);
        let raw_away = cell(row, self.away_col);
        let home = if raw_home.trim().is_empty() {
            format!("Home {}", row_idx + 1)
        } else {
            team_alias::resolve_team(raw_home)
        };
        let away = if raw_away.trim().is_empty() {
            format!("Away {}", row_idx + 1)
        } else {
            team_alias::resolve_team(raw_away)
        };

        // Per-book (home, away) quotes in book column order.
        let book_mls: Vec<(&str, Option<i32>, Option<i32>)> = self
            .books
            .iter()
            .map(|book| {
                let mut home_ml = None;
                let mut away_ml = None;
                for col in self.ml_cols.iter().filter(|c| &c.book == book) {
                    let ml = normalize_moneyline(cell(row, Some(col.index)));
                    match col.side {
                        Side::Home => home_ml = ml,
                        Side::Away => away_ml = ml,
                    }
                }
                (book.as_str(), home_ml, away_ml)
            })
            .collect();

        let favorite_is_home = favorite_side_is_home(&book_mls);
        let (favorite, underdog) = if favorite_is_home {
            (home, away)
        } else {
            (away, home)
        };

        let books = book_mls
            .iter()
            .map(|(book, home_ml, away_ml)| {
                let (fav_ml, dog_ml) = if favorite_is_home {
                    (*home_ml, *away_ml)
                } else {
                    (*away_ml, *home_ml)
                };
                BookOdds::new(*book, fav_ml, dog_ml)
            })
            .collect();

        let mut m = Matchup::new(favorite, underdog, favorite_is_home);
        m.kickoff = parse_kickoff(cell(row, self.kickoff_col));
        m.books = books;
        m
    }
}

fn cell(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|c| row.get(c)).map(String::as_str).unwrap_or("")
}

// Majority vote across books: the side with the lower (more negative) quote
// is that book's favorite; a one-sided book votes by the quote's sign. Ties
// go to home.
fn favorite_side_is_home(book_mls: &[(&str, Option<i32>, Option<i32>)]) -> bool {
    let mut home_votes = 0u32;
    let mut away_votes = 0u32;
    for (_, home_ml, away_ml) in book_mls {
        match (home_ml, away_ml) {
            (Some(h), Some(a)) if h < a => home_votes += 1,
            (Some(h), Some(a)) if a < h => away_votes += 1,
            (Some(_), Some(_)) => {}
            (Some(h), None) => {
                if *h < 0 {
                    home_votes += 1;
                } else {
                    away_votes += 1;
                }
            }
            (None, Some(a)) => {
                if *a < 0 {
                    away_votes += 1;
                } else {
                    home_votes += 1;
                }
            }
            (None, None) => {}
        }
    }
    home_votes >= away_votes
}

fn header_tokens(header: &str) -> Vec<String> {
    header
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn is_moneyline_header(tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|t| t == "ml" || t == "moneyline" || t == "odds")
}

fn is_kickoff_header(tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|t| t == "kickoff" || t == "start" || t == "time" || t == "date")
}

// What remains of the header once side/moneyline markers are gone is the
// bookmaker label ("DraftKings Home ML" -> "DraftKings").
fn book_label(header: &str, fallback_ordinal: usize) -> String {
    let label = header
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .filter(|t| {
            let l = t.to_ascii_lowercase();
            l != "ml" && l != "moneyline" && l != "odds" && l != "home" && l != "away"
        })
        .collect::<Vec<_>>()
        .join(" ");
    if label.is_empty() {
        format!("book{}", fallback_ordinal + 1)
    } else {
        label
    }
}

/// Trim, map the Unicode minus to ASCII, strip every decoration but digits
/// and sign, then parse. Anything unparseable is absent, never zero.
pub fn normalize_moneyline(raw: &str) -> Option<i32> {
    let s = raw.trim().replace('\u{2212}', "-");
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '+')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i32>().ok()
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("tbd") {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M %p",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let dt = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

// Minimal RFC-4180 reader: quoted fields, doubled-quote escapes, CRLF or LF.
fn csv_rows(raw: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut push_row = |row: &mut Vec<String>, field: &mut String| {
        row.push(std::mem::take(field));
        let blank = row.iter().all(|c| c.trim().is_empty());
        if !blank {
            rows.push(std::mem::take(row));
        } else {
            row.clear();
        }
    };

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => push_row(&mut row, &mut field),
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        push_row(&mut row, &mut field);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_handle_quotes_and_crlf() {
        let raw = "a,\"b, with comma\",c\r\n1,\"say \"\"hi\"\"\",3\r\n\r\n";
        let rows = csv_rows(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b, with comma", "c"]);
        assert_eq!(rows[1], vec!["1", "say \"hi\"", "3"]);
    }

    #[test]
    fn csv_rows_keep_last_unterminated_record() {
        let rows = csv_rows("x,y\n1,2");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn moneyline_cells_are_normalized_or_absent() {
        assert_eq!(normalize_moneyline("-150"), Some(-150));
        assert_eq!(normalize_moneyline("+130"), Some(130));
        assert_eq!(normalize_moneyline(" \u{2212}115 "), Some(-115));
        assert_eq!(normalize_moneyline("N/A"), None);
        assert_eq!(normalize_moneyline(""), None);
        assert_eq!(normalize_moneyline("even"), None);
    }

    #[test]
    fn kickoff_parses_rfc3339_and_naive_formats() {
        let rfc = parse_kickoff("2025-09-07T17:00:00+00:00").unwrap();
        assert_eq!(rfc.timestamp(), 1_757_264_400);
        assert!(parse_kickoff("2025-09-07 17:00").is_some());
        assert!(parse_kickoff("09/07/2025 1:00 PM").is_some());
        assert!(parse_kickoff("2025-09-07").is_some());
        assert_eq!(parse_kickoff("TBD"), None);
        assert_eq!(parse_kickoff("soonish"), None);
    }

    #[test]
    fn layout_recovers_book_labels_from_headers() {
        let header: Vec<String> = [
            "Home Team",
            "Away Team",
            "Kickoff",
            "DraftKings Home ML",
            "DraftKings Away ML",
            "fanduel_home_moneyline",
            "fanduel_away_moneyline",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let layout = SlateLayout::detect(&header).unwrap();
        assert_eq!(layout.home_col, Some(0));
        assert_eq!(layout.away_col, Some(1));
        assert_eq!(layout.kickoff_col, Some(2));
        assert_eq!(layout.books, vec!["DraftKings", "fanduel"]);
        assert_eq!(layout.ml_cols.len(), 4);
    }

    #[test]
    fn schema_without_moneylines_is_fatal() {
        let header: Vec<String> = ["Home", "Away", "Kickoff"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = SlateLayout::detect(&header).unwrap_err();
        assert!(err.to_string().contains("no moneyline columns"));
    }

    #[test]
    fn favorite_vote_prefers_lower_quote_and_sign() {
        // Both books favor home.
        assert!(favorite_side_is_home(&[
            ("dk", Some(-150), Some(130)),
            ("fd", Some(-145), Some(125)),
        ]));
        // Away favored two books to one.
        assert!(!favorite_side_is_home(&[
            ("dk", Some(120), Some(-140)),
            ("fd", Some(115), Some(-135)),
            ("mgm", Some(-105), Some(-105)),
        ]));
        // One-sided negative home quote counts as a home vote.
        assert!(favorite_side_is_home(&[("dk", Some(-150), None)]));
        // No information ties to home.
        assert!(favorite_side_is_home(&[("dk", None, None)]));
    }
}
