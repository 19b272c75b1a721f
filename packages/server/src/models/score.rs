use scoring::{RaceCategory, RaceScore, SeasonCategory, SeasonScore};
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct SeasonAward {
    pub category: SeasonCategory,
    #[schema(example = 1)]
    pub points: u32,
}

/// Live breakdown of a season prediction against the entered result.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SeasonScoreResponse {
    #[schema(example = 12)]
    pub prediction_id: i32,
    #[schema(example = 2026)]
    pub season: i32,
    /// One entry per category, including zero awards.
    pub awards: Vec<SeasonAward>,
    #[schema(example = 3)]
    pub total: u32,
}

impl SeasonScoreResponse {
    pub fn new(prediction_id: i32, season: i32, score: SeasonScore) -> Self {
        Self {
            prediction_id,
            season,
            awards: score
                .awards
                .into_iter()
                .map(|a| SeasonAward {
                    category: a.category,
                    points: a.points,
                })
                .collect(),
            total: score.total,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RaceAward {
    pub category: RaceCategory,
    #[schema(example = 1)]
    pub points: u32,
}

/// Live breakdown of a race prediction against the entered result.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RaceScoreResponse {
    #[schema(example = 31)]
    pub prediction_id: i32,
    #[schema(example = 7)]
    pub race_id: i32,
    pub awards: Vec<RaceAward>,
    #[schema(example = 2)]
    pub total: u32,
}

impl RaceScoreResponse {
    pub fn new(prediction_id: i32, race_id: i32, score: RaceScore) -> Self {
        Self {
            prediction_id,
            race_id,
            awards: score
                .awards
                .into_iter()
                .map(|a| RaceAward {
                    category: a.category,
                    points: a.points,
                })
                .collect(),
            total: score.total,
        }
    }
}
