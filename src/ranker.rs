//! The ranking pipeline: raw quotes -> implied probabilities -> optional
//! de-vig -> consensus -> unique confidence ranks N..1.

use std::cmp::Ordering;

use crate::config::PoolConfig;
use crate::consensus::{self, ConsensusMethod};
use crate::odds::{implied_prob, proportional_devig};
use crate::state::Matchup;
use crate::tiebreak::{tie_key, TieBreakPrefs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankSummary {
    pub ranked: usize,
    /// Matchups with no valid quote anywhere. They sort as probability 0.0
    /// and land at the bottom; the app layer should warn about them.
    pub unknown_consensus: usize,
}

/// Derive each book's favorite-side probability. De-vig runs per book and
/// only when both outcomes are quoted; rescaling a lone quote would force it
/// to 1.0. With de-vig disabled the vig-inclusive value is kept.
pub fn compute_book_probs(m: &mut Matchup, devig: bool) {
    for b in &mut m.books {
        let fav = implied_prob(b.fav_ml);
        let dog = implied_prob(b.dog_ml);
        b.fav_prob = match (fav, dog) {
            (Some(f), Some(d)) if devig => {
                let scaled = proportional_devig(&[Some(f), Some(d)]);
                Some(scaled[0])
            }
            (fav, _) => fav,
        };
    }
}

/// Aggregate the per-book probabilities; absent books are skipped, and a
/// matchup with no valid book stays unknown rather than becoming 0.0.
pub fn compute_consensus(m: &mut Matchup, method: &ConsensusMethod) {
    let values: Vec<Option<f64>> = m.books.iter().map(|b| b.fav_prob).collect();
    let labels: Vec<&str> = m.books.iter().map(|b| b.book.as_str()).collect();
    m.consensus_prob =
        consensus::consensus(&values, &labels, method).map(|p| p.clamp(0.0, 1.0));
}

/// Sort by (consensus desc, tie key asc) and assign ranks N..1 down the
/// sorted order; the most confident matchup gets N. Unknown consensus sorts
/// as 0.0. The sort is stable, so literally identical keys keep input order.
pub fn assign_confidence_ranks(slate: &mut [Matchup], prefs: &TieBreakPrefs) -> RankSummary {
    let keys: Vec<(f64, _)> = slate
        .iter()
        .map(|m| (m.consensus_prob.unwrap_or(0.0), tie_key(m, prefs)))
        .collect();

    let mut order: Vec<usize> = (0..slate.len()).collect();
    order.sort_by(|&a, &b| {
        let (pa, ka) = &keys[a];
        let (pb, kb) = &keys[b];
        match pb.total_cmp(pa) {
            Ordering::Equal => ka.cmp(kb),
            other => other,
        }
    });

    let n = slate.len() as u32;
    for (pos, &idx) in order.iter().enumerate() {
        slate[idx].confidence_rank = Some(n - pos as u32);
    }

    RankSummary {
        ranked: slate.len(),
        unknown_consensus: slate.iter().filter(|m| m.consensus_prob.is_none()).count(),
    }
}

/// Run the whole pipeline over the slate with one immutable config.
pub fn compute_slate(slate: &mut [Matchup], cfg: &PoolConfig) -> RankSummary {
    for m in slate.iter_mut() {
        compute_book_probs(m, cfg.devig);
        compute_consensus(m, &cfg.consensus_method);
    }
    assign_confidence_ranks(slate, &cfg.tiebreaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BookOdds;

    fn two_way(book: &str, fav_ml: i32, dog_ml: i32) -> BookOdds {
        BookOdds::new(book, Some(fav_ml), Some(dog_ml))
    }

    #[test]
    fn devig_normalizes_a_standard_two_way_quote() {
        let mut m = Matchup::new("A", "B", true);
        m.books.push(two_way("dk", -110, -110));
        compute_book_probs(&mut m, true);
        assert!((m.books[0].fav_prob.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn devig_disabled_keeps_the_vig() {
        let mut m = Matchup::new("A", "B", true);
        m.books.push(two_way("dk", -110, -110));
        compute_book_probs(&mut m, false);
        let p = m.books[0].fav_prob.unwrap();
        assert!(p > 0.5);
        assert!((p - 110.0 / 210.0).abs() < 1e-12);
    }

    #[test]
    fn one_sided_book_is_never_rescaled_to_certainty() {
        let mut m = Matchup::new("A", "B", true);
        m.books.push(BookOdds::new("dk", Some(-150), None));
        compute_book_probs(&mut m, true);
        assert!((m.books[0].fav_prob.unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn consensus_stays_unknown_without_valid_quotes() {
        let mut m = Matchup::new("A", "B", true);
        m.books.push(BookOdds::new("dk", None, None));
        m.books.push(BookOdds::new("fd", Some(0), None));
        compute_book_probs(&mut m, true);
        compute_consensus(&mut m, &ConsensusMethod::Mean);
        assert_eq!(m.consensus_prob, None);
    }

    #[test]
    fn consensus_is_clamped_into_unit_interval() {
        let mut m = Matchup::new("A", "B", true);
        m.books.push(two_way("dk", -10_000, 5_000));
        compute_book_probs(&mut m, false);
        compute_consensus(&mut m, &ConsensusMethod::Mean);
        let p = m.consensus_prob.unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn ranks_are_a_permutation_with_n_on_top() {
        let mut slate: Vec<Matchup> = (0..5)
            .map(|i| {
                let mut m = Matchup::new(format!("T{i}"), "X", i % 2 == 0);
                m.consensus_prob = Some(0.5 + i as f64 * 0.05);
                m
            })
            .collect();
        let summary = assign_confidence_ranks(&mut slate, &TieBreakPrefs::default());
        assert_eq!(summary.ranked, 5);
        assert_eq!(summary.unknown_consensus, 0);

        let mut ranks: Vec<u32> = slate.iter().map(|m| m.confidence_rank.unwrap()).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        // Highest probability got rank 5.
        assert_eq!(slate[4].confidence_rank, Some(5));
    }

    #[test]
    fn full_pipeline_ranks_stronger_favorites_higher() {
        let cfg = PoolConfig::default();
        let mut slate = vec![
            {
                let mut m = Matchup::new("Big Fav", "X", true);
                m.books.push(two_way("dk", -300, 250));
                m
            },
            {
                let mut m = Matchup::new("Small Fav", "Y", true);
                m.books.push(two_way("dk", -120, 100));
                m
            },
        ];
        let summary = compute_slate(&mut slate, &cfg);
        assert_eq!(summary.unknown_consensus, 0);
        assert_eq!(slate[0].confidence_rank, Some(2));
        assert_eq!(slate[1].confidence_rank, Some(1));
    }
}
