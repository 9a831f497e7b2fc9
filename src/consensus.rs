//! Collapse one matchup's per-book probabilities into a single consensus
//! value. Dispatch is a tagged enum; each variant carries what it needs.

use std::collections::HashMap;

const TRIM: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsensusMethod {
    Mean,
    Median,
    Trimmed,
    Weighted(HashMap<String, f64>),
}

impl ConsensusMethod {
    /// Parse a configured method name. Unknown names fall back to `Mean`
    /// (documented permissive default) and return a warning for the caller
    /// to log; the aggregator itself never hard-fails on a name.
    pub fn parse(raw: &str, weights: &HashMap<String, f64>) -> (Self, Option<String>) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "mean" => (Self::Mean, None),
            "median" => (Self::Median, None),
            "trimmed" | "trimmed-mean" | "trimmed_mean" => (Self::Trimmed, None),
            "weighted" | "weighted-mean" | "weighted_mean" => {
                (Self::Weighted(weights.clone()), None)
            }
            other => (
                Self::Mean,
                Some(format!("unknown consensus method '{other}', using mean")),
            ),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Trimmed => "trimmed",
            Self::Weighted(_) => "weighted",
        }
    }

    /// Next method in display order, for cycling from the UI.
    pub fn cycle(&self, weights: &HashMap<String, f64>) -> Self {
        match self {
            Self::Mean => Self::Median,
            Self::Median => Self::Trimmed,
            Self::Trimmed => Self::Weighted(weights.clone()),
            Self::Weighted(_) => Self::Mean,
        }
    }
}

/// Consensus of the present values, or `None` when every value is absent.
/// `labels` pairs each value positionally with its book for the weighted
/// method; a length mismatch makes that method unavailable and plain mean is
/// used instead.
pub fn consensus(
    values: &[Option<f64>],
    labels: &[&str],
    method: &ConsensusMethod,
) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    let value = match method {
        ConsensusMethod::Mean => mean(&present),
        ConsensusMethod::Median => median(&present),
        ConsensusMethod::Trimmed => trimmed_mean(&present),
        ConsensusMethod::Weighted(weights) => {
            if labels.len() == values.len() {
                weighted_mean(values, labels, weights)
            } else {
                mean(&present)
            }
        }
    };
    Some(value)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

// Drop the single lowest and highest value; with too few values to trim,
// plain mean.
fn trimmed_mean(values: &[f64]) -> f64 {
    if 2 * TRIM >= values.len() {
        return mean(values);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    mean(&sorted[TRIM..sorted.len() - TRIM])
}

fn weighted_mean(values: &[Option<f64>], labels: &[&str], weights: &HashMap<String, f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(labels)
        .filter_map(|(v, label)| v.map(|v| (v, weight_for(weights, label))))
        .collect();
    let total_w: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total_w == 0.0 {
        return mean(&pairs.iter().map(|(v, _)| *v).collect::<Vec<_>>());
    }
    pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total_w
}

// Weight lookup is case-insensitive; books absent from the map weigh 1.0.
fn weight_for(weights: &HashMap<String, f64>, label: &str) -> f64 {
    weights
        .get(label)
        .or_else(|| weights.get(&label.to_ascii_lowercase()))
        .copied()
        .unwrap_or(1.0)
}
