//! American moneyline quotes to implied win probabilities, plus the
//! proportional de-vig rescale.

/// Implied probability of one side winning, vig included.
/// Negative quote (favorite): |o| / (|o| + 100). Non-negative: 100 / (o + 100).
pub fn american_to_prob(odds: f64) -> f64 {
    if odds < 0.0 {
        odds.abs() / (odds.abs() + 100.0)
    } else {
        100.0 / (odds + 100.0)
    }
}

/// Quote-or-absent in, probability-or-absent out. Absence propagates; it never
/// collapses to 0.0. A quote of exactly 0 is not a real moneyline and is
/// treated as malformed.
pub fn implied_prob(quote: Option<i32>) -> Option<f64> {
    let q = quote?;
    if q == 0 {
        return None;
    }
    Some(american_to_prob(f64::from(q)))
}

/// Rescale the implied probabilities of one matchup's mutually exclusive
/// outcomes so the present values sum to 1.0, removing the overround.
/// Absent entries map to 0.0 in the output. A zero/absent-only input yields
/// all zeros of the same cardinality rather than an error.
pub fn proportional_devig(probs: &[Option<f64>]) -> Vec<f64> {
    let total: f64 = probs.iter().flatten().sum();
    if total <= 0.0 {
        return vec![0.0; probs.len()];
    }
    let scale = 1.0 / total;
    probs
        .iter()
        .map(|p| p.map(|v| v * scale).unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_favorite_and_underdog_quotes() {
        assert!((american_to_prob(-150.0) - 0.6).abs() < 1e-12);
        assert!((american_to_prob(150.0) - 0.4).abs() < 1e-12);
        assert!((american_to_prob(-110.0) - 110.0 / 210.0).abs() < 1e-12);
    }

    #[test]
    fn converted_probabilities_stay_inside_unit_interval() {
        for ml in [-100_000, -550, -101, 100, 101, 240, 100_000] {
            let p = american_to_prob(f64::from(ml));
            assert!(p > 0.0 && p < 1.0, "ml {ml} gave {p}");
        }
    }

    #[test]
    fn absent_and_zero_quotes_stay_absent() {
        assert_eq!(implied_prob(None), None);
        assert_eq!(implied_prob(Some(0)), None);
        assert!((implied_prob(Some(-150)).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn devig_output_sums_to_one() {
        let out = proportional_devig(&[Some(0.6), Some(0.45)]);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(out[0] > out[1]);
    }

    #[test]
    fn devig_maps_absent_to_zero_and_keeps_cardinality() {
        let out = proportional_devig(&[Some(0.5), None, Some(0.5)]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], 0.0);
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn devig_degenerate_input_is_all_zeros() {
        assert_eq!(proportional_devig(&[None, None]), vec![0.0, 0.0]);
        assert_eq!(proportional_devig(&[]), Vec::<f64>::new());
        assert_eq!(proportional_devig(&[Some(0.0), None]), vec![0.0, 0.0]);
    }
}
