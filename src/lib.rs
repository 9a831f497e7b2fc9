pub mod config;
pub mod consensus;
pub mod csv_load;
pub mod export;
pub mod fake_slate;
pub mod odds;
pub mod ranker;
pub mod state;
pub mod team_alias;
pub mod tiebreak;
