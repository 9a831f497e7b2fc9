use std::collections::VecDeque;

use chrono::{DateTime, Utc};

const MAX_LOGS: usize = 200;

/// One bookmaker's moneyline quotes for a single matchup, oriented
/// favorite/underdog. `fav_prob` is derived by the pipeline (de-vigged when
/// both sides are quoted and de-vig is enabled).
#[derive(Debug, Clone, PartialEq)]
pub struct BookOdds {
    pub book: String,
    pub fav_ml: Option<i32>,
    pub dog_ml: Option<i32>,
    pub fav_prob: Option<f64>,
}

impl BookOdds {
    pub fn new(book: impl Into<String>, fav_ml: Option<i32>, dog_ml: Option<i32>) -> Self {
        Self {
            book: book.into(),
            fav_ml,
            dog_ml,
            fav_prob: None,
        }
    }
}

/// One game on the slate. Constructed once by ingestion, then mutated in
/// place by the pipeline: per-book probabilities, consensus, rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub favorite: String,
    pub underdog: String,
    pub favorite_is_home: bool,
    pub kickoff: Option<DateTime<Utc>>,
    pub books: Vec<BookOdds>,
    pub consensus_prob: Option<f64>,
    pub confidence_rank: Option<u32>,
}

impl Matchup {
    pub fn new(
        favorite: impl Into<String>,
        underdog: impl Into<String>,
        favorite_is_home: bool,
    ) -> Self {
        Self {
            favorite: favorite.into(),
            underdog: underdog.into(),
            favorite_is_home,
            kickoff: None,
            books: Vec::new(),
            consensus_prob: None,
            confidence_rank: None,
        }
    }

    pub fn label(&self) -> String {
        if self.favorite_is_home {
            format!("{} vs {}", self.favorite, self.underdog)
        } else {
            format!("{} at {}", self.favorite, self.underdog)
        }
    }
}

pub struct AppState {
    pub slate: Vec<Matchup>,
    // Distinct book labels across the slate, first-seen order (table columns).
    pub books: Vec<String>,
    pub source_label: String,
    pub selected: usize,
    pub computed: bool,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            slate: Vec::new(),
            books: Vec::new(),
            source_label: "demo".to_string(),
            selected: 0,
            computed: false,
            help_overlay: false,
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    pub fn set_slate(&mut self, slate: Vec<Matchup>, source_label: impl Into<String>) {
        self.books = book_labels(&slate);
        self.slate = slate;
        self.source_label = source_label.into();
        self.selected = 0;
        self.computed = false;
    }

    pub fn selected_matchup(&self) -> Option<&Matchup> {
        self.slate.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.slate.is_empty() && self.selected + 1 < self.slate.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn book_labels(slate: &[Matchup]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for m in slate {
        for b in &m.books {
            if !labels.iter().any(|l| l == &b.book) {
                labels.push(b.book.clone());
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_log_is_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_LOGS + 50) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().unwrap(), "line 50");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = AppState::new();
        state.set_slate(
            vec![Matchup::new("A", "B", true), Matchup::new("C", "D", false)],
            "test",
        );
        state.select_prev();
        assert_eq!(state.selected, 0);
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn book_labels_dedup_in_first_seen_order() {
        let mut a = Matchup::new("A", "B", true);
        a.books.push(BookOdds::new("DraftKings", Some(-150), Some(130)));
        a.books.push(BookOdds::new("FanDuel", Some(-145), Some(125)));
        let mut b = Matchup::new("C", "D", false);
        b.books.push(BookOdds::new("FanDuel", Some(-120), Some(100)));
        assert_eq!(book_labels(&[a, b]), vec!["DraftKings", "FanDuel"]);
    }
}
