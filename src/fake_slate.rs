//! Demo slate generator so the terminal works out of the box without a CSV.
//! Quotes are sampled around a true line with a per-book vig and jitter, plus
//! the occasional missing book or one-sided quote, like real screenshots of a
//! Sunday board.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::state::{BookOdds, Matchup};
use crate::team_alias;

pub const DEMO_BOOKS: [&str; 3] = ["DraftKings", "FanDuel", "BetMGM"];

pub fn demo_slate(games: usize) -> Vec<Matchup> {
    let mut rng = rand::thread_rng();
    let mut teams = team_alias::all_teams();
    teams.shuffle(&mut rng);

    let games = games.min(teams.len() / 2);
    let slots = kickoff_slots();

    (0..games)
        .map(|i| {
            let favorite = teams[2 * i];
            let underdog = teams[2 * i + 1];
            let mut m = Matchup::new(favorite, underdog, rng.gen_bool(0.55));

            // True favorite win probability before any bookmaker margin.
            let p_true: f64 = rng.gen_range(0.52..0.82);

            for book in DEMO_BOOKS {
                if rng.gen_bool(0.05) {
                    // Book hasn't posted this game.
                    m.books.push(BookOdds::new(book, None, None));
                    continue;
                }
                let jitter = rng.gen_range(-0.025..0.025);
                let vig = rng.gen_range(0.035..0.055);
                let fav_implied = (p_true + jitter + vig / 2.0).clamp(0.05, 0.97);
                let dog_implied = ((1.0 - p_true - jitter) + vig / 2.0).clamp(0.03, 0.95);

                let fav_ml = Some(american_from_prob(fav_implied));
                let dog_ml = if rng.gen_bool(0.08) {
                    None
                } else {
                    Some(american_from_prob(dog_implied))
                };
                m.books.push(BookOdds::new(book, fav_ml, dog_ml));
            }

            m.kickoff = if rng.gen_bool(0.05) {
                None
            } else {
                Some(slots[i % slots.len()])
            };
            m
        })
        .collect()
}

// The usual weekly windows: Sunday early/late/night and Monday night.
fn kickoff_slots() -> [DateTime<Utc>; 4] {
    let now = Utc::now();
    let mut days_ahead = (7 - now.weekday().num_days_from_sunday()) % 7;
    if days_ahead == 0 {
        days_ahead = 7;
    }
    let sunday = (now + ChronoDuration::days(i64::from(days_ahead)))
        .date_naive()
        .and_hms_opt(17, 0, 0)
        .expect("valid fixed time");
    let sunday = sunday.and_utc();
    [
        sunday,
        sunday + ChronoDuration::hours(3) + ChronoDuration::minutes(25),
        sunday + ChronoDuration::hours(7) + ChronoDuration::minutes(20),
        sunday + ChronoDuration::days(1) + ChronoDuration::hours(7) + ChronoDuration::minutes(15),
    ]
}

fn american_from_prob(p: f64) -> i32 {
    if p >= 0.5 {
        -((p / (1.0 - p)) * 100.0).round() as i32
    } else {
        (((1.0 - p) / p) * 100.0).round() as i32
    }
}
