pub mod crazy_vote;
pub mod league;
pub mod league_member;
pub mod race;
pub mod race_prediction;
pub mod race_result;
pub mod role;
pub mod role_permission;
pub mod season;
pub mod season_prediction;
pub mod season_result;
pub mod user;
