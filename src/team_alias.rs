//! Canonical NFL team names from the abbreviations and nicknames that show up
//! in slate CSVs (WSH, "49ers", "Bucs", ...).

use std::collections::HashMap;

use once_cell::sync::Lazy;

// Alias groups per team; several feeds use non-standard short codes (ARZ,
// BLT, CLV, HST), so those are included alongside the official ones.
const TEAMS: &[(&[&str], &str)] = &[
    (&["ARZ", "ARI", "AZ", "Cardinals"], "Arizona Cardinals"),
    (&["LAR", "LA", "Rams"], "Los Angeles Rams"),
    (&["SEA", "Seahawks"], "Seattle Seahawks"),
    (&["SF", "49ers", "SF49ers", "Niners"], "San Francisco 49ers"),
    (&["ATL", "Falcons"], "Atlanta Falcons"),
    (&["CAR", "Panthers"], "Carolina Panthers"),
    (&["NO", "NOR", "Saints"], "New Orleans Saints"),
    (&["TB", "TBB", "Buccaneers", "Bucs"], "Tampa Bay Buccaneers"),
    (&["CHI", "Bears"], "Chicago Bears"),
    (&["DET", "Lions"], "Detroit Lions"),
    (&["GB", "Packers"], "Green Bay Packers"),
    (&["MIN", "Vikings"], "Minnesota Vikings"),
    (&["DAL", "Cowboys"], "Dallas Cowboys"),
    (&["NYG", "Giants"], "New York Giants"),
    (&["PHI", "Eagles"], "Philadelphia Eagles"),
    (&["WAS", "WSH", "Commanders"], "Washington Commanders"),
    (&["KC", "KAN", "Chiefs"], "Kansas City Chiefs"),
    (&["LAC", "Chargers"], "Los Angeles Chargers"),
    (&["LV", "Raiders"], "Las Vegas Raiders"),
    (&["DEN", "Broncos"], "Denver Broncos"),
    (&["HST", "HOU", "Texans"], "Houston Texans"),
    (&["IND", "Colts"], "Indianapolis Colts"),
    (&["JAX", "Jaguars"], "Jacksonville Jaguars"),
    (&["TEN", "Titans"], "Tennessee Titans"),
    (&["BLT", "BAL", "Ravens"], "Baltimore Ravens"),
    (&["CIN", "Bengals"], "Cincinnati Bengals"),
    (&["CLV", "CLE", "Browns"], "Cleveland Browns"),
    (&["PIT", "Steelers"], "Pittsburgh Steelers"),
    (&["BUF", "Bills"], "Buffalo Bills"),
    (&["MIA", "Dolphins"], "Miami Dolphins"),
    (&["NE", "NWE", "Patriots"], "New England Patriots"),
    (&["NYJ", "Jets"], "New York Jets"),
];

static CANONICAL: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (aliases, full) in TEAMS {
        for alias in *aliases {
            table.insert(norm(alias), *full);
        }
        // Full names resolve to themselves.
        table.insert(norm(full), *full);
    }
    table
});

// Uppercase, alphanumerics only, so "49ers" / " wsh " / "N.E." all match.
fn norm(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Canonical full team name, or `None` for tokens outside the league table.
pub fn canonical_team(token: &str) -> Option<&'static str> {
    let t = norm(token);
    if t.is_empty() {
        return None;
    }
    CANONICAL.get(&t).copied()
}

/// Canonical name when known, otherwise the trimmed input unchanged; slates
/// for other leagues still rank, they just keep their raw names.
pub fn resolve_team(token: &str) -> String {
    canonical_team(token)
        .map(str::to_string)
        .unwrap_or_else(|| token.trim().to_string())
}

pub fn all_teams() -> Vec<&'static str> {
    TEAMS.iter().map(|(_, full)| *full).collect()
}
