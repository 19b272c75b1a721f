//! Scoring core for the prediction league.
//!
//! Everything here is pure and synchronous: callers load predictions, results
//! and votes, and this crate turns them into point awards and standings.

pub mod category;
pub mod engine;
pub mod error;
pub mod model;
pub mod standings;
pub mod submission;
pub mod validation;

pub use category::{
    Category, CategoryAward, RaceCategory, RaceScore, ScoreCard, SeasonCategory, SeasonScore,
};
pub use engine::{SACKING_POLICY, SackingPolicy, score_race_prediction, score_season_prediction};
pub use error::ScoringError;
pub use model::*;
pub use standings::{LeaderboardEntry, LeagueMember, ScoredPrediction, compute_leaderboard};
pub use validation::{
    CrazyVerdict, ValidationState, Vote, VoteBook, ensure_can_vote, resolve_crazy_prediction_state,
};
