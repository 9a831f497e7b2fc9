//! Picksheet export. The slate goes out three ways: an XLSX workbook for the
//! pool host, a CSV for spreadsheets, and a JSON report for downstream tools.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::state::{book_labels, Matchup};

pub struct ExportReport {
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickRow {
    pub rank: u32,
    pub pick: String,
    pub opponent: String,
    pub venue: String,
    pub kickoff: String,
    pub consensus: String,
    pub book_probs: Vec<String>,
}

pub fn export_picksheet_xlsx(slate: &[Matchup], dir: &Path) -> Result<ExportReport> {
    let rows = sheet_rows(slate);
    let path = export_path(dir, "xlsx")?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Picks").context("name picks sheet")?;
    write_rows(worksheet, &rows)?;
    worksheet.autofit();
    workbook
        .save(&path)
        .with_context(|| format!("save picksheet {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len().saturating_sub(1),
        path,
    })
}

pub fn export_picksheet_csv(slate: &[Matchup], dir: &Path) -> Result<ExportReport> {
    let rows = sheet_rows(slate);
    let path = export_path(dir, "csv")?;

    let text = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| csv_escape(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, text + "\n")
        .with_context(|| format!("write picksheet {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len().saturating_sub(1),
        path,
    })
}

pub fn export_picksheet_json(slate: &[Matchup], dir: &Path) -> Result<ExportReport> {
    let rows = pick_rows(slate);
    let path = export_path(dir, "json")?;
    let json = serde_json::to_string_pretty(&rows).context("serialize picksheet")?;
    fs::write(&path, json)
        .with_context(|| format!("write picksheet {}", path.display()))?;
    Ok(ExportReport {
        rows: rows.len(),
        path,
    })
}

/// Ranked picks, highest confidence first. Unranked matchups are excluded;
/// callers compute before exporting.
pub fn pick_rows(slate: &[Matchup]) -> Vec<PickRow> {
    let books = book_labels(slate);
    let mut ranked: Vec<&Matchup> = slate.iter().filter(|m| m.confidence_rank.is_some()).collect();
    ranked.sort_by(|a, b| b.confidence_rank.cmp(&a.confidence_rank));

    ranked
        .iter()
        .map(|m| PickRow {
            rank: m.confidence_rank.unwrap_or(0),
            pick: m.favorite.clone(),
            opponent: m.underdog.clone(),
            venue: if m.favorite_is_home { "HOME" } else { "AWAY" }.to_string(),
            kickoff: m
                .kickoff
                .map(|k| k.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "TBD".to_string()),
            consensus: m
                .consensus_prob
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "unknown".to_string()),
            book_probs: books
                .iter()
                .map(|book| {
                    m.books
                        .iter()
                        .find(|b| &b.book == book)
                        .and_then(|b| b.fav_prob)
                        .map(|p| format!("{:.1}%", p * 100.0))
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect()
}

fn sheet_rows(slate: &[Matchup]) -> Vec<Vec<String>> {
    let books = book_labels(slate);
    let mut header = vec![
        "Rank".to_string(),
        "Pick".to_string(),
        "Opponent".to_string(),
        "Venue".to_string(),
        "Kickoff".to_string(),
        "Consensus".to_string(),
    ];
    header.extend(books.iter().cloned());

    let mut rows = vec![header];
    for pick in pick_rows(slate) {
        let mut row = vec![
            pick.rank.to_string(),
            pick.pick,
            pick.opponent,
            pick.venue,
            pick.kickoff,
            pick.consensus,
        ];
        row.extend(pick.book_probs);
        rows.push(row);
    }
    rows
}

fn export_path(dir: &Path, ext: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create export dir {}", dir.display()))?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    Ok(dir.join(format!("picksheet_{stamp}.{ext}")))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BookOdds;

    fn ranked_matchup(fav: &str, rank: u32, prob: f64, home: bool) -> Matchup {
        let mut m = Matchup::new(fav, "Opponent", home);
        let mut book = BookOdds::new("DraftKings", Some(-150), Some(130));
        book.fav_prob = Some(prob);
        m.books.push(book);
        m.consensus_prob = Some(prob);
        m.confidence_rank = Some(rank);
        m
    }

    #[test]
    fn pick_rows_sort_by_rank_descending() {
        let slate = vec![
            ranked_matchup("Low", 1, 0.51, false),
            ranked_matchup("High", 2, 0.73, true),
        ];
        let rows = pick_rows(&slate);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pick, "High");
        assert_eq!(rows[0].rank, 2);
        assert_eq!(rows[0].venue, "HOME");
        assert_eq!(rows[1].venue, "AWAY");
    }

    #[test]
    fn unranked_matchups_are_excluded() {
        let slate = vec![ranked_matchup("A", 1, 0.6, true), Matchup::new("B", "C", true)];
        assert_eq!(pick_rows(&slate).len(), 1);
    }

    #[test]
    fn sheet_rows_carry_book_columns() {
        let slate = vec![ranked_matchup("A", 1, 0.625, true)];
        let rows = sheet_rows(&slate);
        assert_eq!(rows[0].last().unwrap(), "DraftKings");
        assert_eq!(rows[1][0], "1");
        assert_eq!(rows[1][5], "62.5%");
        assert_eq!(rows[1][6], "62.5%");
    }

    #[test]
    fn csv_escape_quotes_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
