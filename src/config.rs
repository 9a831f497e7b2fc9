//! Pool configuration from the environment (`.env` files are loaded by main
//! before this runs). Built once and passed by reference into every pipeline
//! stage; there are no process-wide mutable defaults.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::consensus::ConsensusMethod;
use crate::tiebreak::TieBreakPrefs;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub devig: bool,
    pub consensus_method: ConsensusMethod,
    pub weights: HashMap<String, f64>,
    pub tiebreaks: TieBreakPrefs,
    pub slate_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    /// Non-fatal issues found while reading the environment, for the console.
    pub warnings: Vec<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            devig: true,
            consensus_method: ConsensusMethod::Mean,
            weights: HashMap::new(),
            tiebreaks: TieBreakPrefs::default(),
            slate_path: None,
            export_dir: PathBuf::from("."),
            warnings: Vec::new(),
        }
    }
}

impl PoolConfig {
    pub fn from_env() -> Self {
        let mut warnings = Vec::new();

        let devig = env_bool("POOL_DEVIG", true);

        let weights = parse_weights(
            env::var("POOL_WEIGHTS").unwrap_or_default().as_str(),
            &mut warnings,
        );

        let method_raw = env::var("POOL_CONSENSUS").unwrap_or_default();
        let (consensus_method, method_warning) = ConsensusMethod::parse(&method_raw, &weights);
        if let Some(w) = method_warning {
            warnings.push(w);
        }

        let tiebreak_raw = env::var("POOL_TIEBREAKS").unwrap_or_default();
        let names: Vec<String> = tiebreak_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let (tiebreaks, unknown) = TieBreakPrefs::from_names(&names);
        for name in unknown {
            warnings.push(format!("unknown tie-break rule '{name}', skipping"));
        }

        let slate_path = env::var("POOL_SLATE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let export_dir = env::var("POOL_EXPORT_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            devig,
            consensus_method,
            weights,
            tiebreaks,
            slate_path,
            export_dir,
            warnings,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

/// Parse `book=weight` pairs from a comma list. Keys are lowercased so
/// lookups by book label are case-insensitive. Malformed entries are skipped
/// with a warning.
fn parse_weights(raw: &str, warnings: &mut Vec<String>) -> HashMap<String, f64> {
    let mut weights = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((book, value)) = entry.split_once('=') else {
            warnings.push(format!("bad weight entry '{entry}', expected book=weight"));
            continue;
        };
        let book = book.trim().to_ascii_lowercase();
        match value.trim().parse::<f64>() {
            Ok(w) if w.is_finite() && w >= 0.0 && !book.is_empty() => {
                weights.insert(book, w);
            }
            _ => warnings.push(format!("bad weight entry '{entry}', expected book=weight")),
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_weight_pairs_and_lowercases_keys() {
        let mut warnings = Vec::new();
        let weights = parse_weights("DraftKings=1.5, fanduel=0.8", &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(weights.get("draftkings"), Some(&1.5));
        assert_eq!(weights.get("fanduel"), Some(&0.8));
    }

    #[test]
    fn malformed_weight_entries_are_skipped_with_warnings() {
        let mut warnings = Vec::new();
        let weights = parse_weights("dk=1.5,oops,fd=abc,=2.0", &mut warnings);
        assert_eq!(weights.len(), 1);
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn empty_weight_spec_is_empty() {
        let mut warnings = Vec::new();
        assert!(parse_weights("", &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }
}
