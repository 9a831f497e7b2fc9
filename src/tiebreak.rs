//! Deterministic ordering keys for matchups whose consensus probabilities tie.

use crate::state::Matchup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakRule {
    Home,
    Kickoff,
    Alpha,
}

impl TieBreakRule {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" | "home-field" | "home_field" => Some(Self::Home),
            "kickoff" | "kickoff-time" | "kickoff_time" => Some(Self::Kickoff),
            "alpha" | "alphabetical" => Some(Self::Alpha),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Kickoff => "kickoff",
            Self::Alpha => "alpha",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreakPrefs {
    pub order: Vec<TieBreakRule>,
}

impl Default for TieBreakPrefs {
    fn default() -> Self {
        Self {
            order: vec![TieBreakRule::Home, TieBreakRule::Kickoff, TieBreakRule::Alpha],
        }
    }
}

impl TieBreakPrefs {
    /// Build prefs from configured rule names. Unknown names are skipped and
    /// returned so the caller can log them; an empty result falls back to the
    /// default order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> (Self, Vec<String>) {
        let mut order = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match TieBreakRule::parse(name.as_ref()) {
                Some(rule) => {
                    if !order.contains(&rule) {
                        order.push(rule);
                    }
                }
                None => unknown.push(name.as_ref().trim().to_string()),
            }
        }
        if order.is_empty() {
            (Self::default(), unknown)
        } else {
            (Self { order }, unknown)
        }
    }

    pub fn describe(&self) -> String {
        self.order
            .iter()
            .map(TieBreakRule::name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One sub-key per configured rule. Smaller sorts first among equal
/// probabilities, so a home favorite (0) beats a road favorite (1) and an
/// earlier kickoff beats a later one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyPart {
    Home(u8),
    Kickoff(i64),
    Alpha(String),
}

pub fn tie_key(m: &Matchup, prefs: &TieBreakPrefs) -> Vec<KeyPart> {
    prefs
        .order
        .iter()
        .map(|rule| match rule {
            TieBreakRule::Home => KeyPart::Home(if m.favorite_is_home { 0 } else { 1 }),
            // Unknown kickoff sorts as the maximum timestamp: last among ties.
            TieBreakRule::Kickoff => {
                KeyPart::Kickoff(m.kickoff.map(|k| k.timestamp()).unwrap_or(i64::MAX))
            }
            TieBreakRule::Alpha => KeyPart::Alpha(m.favorite.clone()),
        })
        .collect()
}
