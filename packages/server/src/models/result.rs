use chrono::{DateTime, Utc};
use scoring::{RaceResult, SeasonResult, SprintOutcome};
use serde::{Deserialize, Serialize};

use super::shared::{normalize_ids, normalize_opt_id};
use crate::entity::{race_result, season_result};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SeasonResultRequest {
    /// Final drivers' championship order covering every entrant.
    #[schema(example = json!(["NOR", "VER", "PIA", "LEC"]))]
    pub drivers_order: Vec<String>,
    #[schema(example = json!(["mclaren", "red_bull", "ferrari"]))]
    pub constructors_order: Vec<String>,
    /// Who was actually sacked during the season.
    #[serde(default)]
    pub sackings: Vec<String>,
    /// Which of the two new teams finished ahead.
    #[schema(example = "cadillac")]
    pub new_team_winner: Option<String>,
    /// Drivers who took their first career win; empty when nobody did.
    #[serde(default)]
    pub first_winners: Vec<String>,
    /// Season prediction ids whose crazy prediction came true.
    #[serde(default)]
    #[schema(example = json!([12]))]
    pub crazy_happened: Vec<i32>,
}

impl SeasonResultRequest {
    pub fn into_result(self, season: i32) -> Result<SeasonResult, AppError> {
        Ok(SeasonResult {
            season,
            drivers_order: normalize_ids("drivers_order", self.drivers_order)?,
            constructors_order: normalize_ids("constructors_order", self.constructors_order)?,
            sackings: normalize_ids("sackings", self.sackings)?.into_iter().collect(),
            new_team_winner: normalize_opt_id(self.new_team_winner),
            first_winners: normalize_ids("first_winners", self.first_winners)?
                .into_iter()
                .collect(),
            crazy_happened: self.crazy_happened.into_iter().collect(),
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SeasonResultResponse {
    #[schema(example = 2026)]
    pub season: i32,
    pub drivers_order: Vec<String>,
    pub constructors_order: Vec<String>,
    pub sackings: Vec<String>,
    pub new_team_winner: Option<String>,
    pub first_winners: Vec<String>,
    pub crazy_happened: Vec<i32>,
    pub entered_by: i32,
    pub updated_at: DateTime<Utc>,
}

impl SeasonResultResponse {
    pub fn from_model(model: season_result::Model) -> Result<Self, AppError> {
        let result = model.to_result()?;
        Ok(Self {
            season: model.season,
            drivers_order: result.drivers_order,
            constructors_order: result.constructors_order,
            sackings: result.sackings.into_iter().collect(),
            new_team_winner: result.new_team_winner,
            first_winners: result.first_winners.into_iter().collect(),
            crazy_happened: result.crazy_happened.into_iter().collect(),
            entered_by: model.entered_by,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RaceResultRequest {
    #[schema(example = "VER")]
    pub pole: String,
    #[schema(example = "NOR")]
    pub first: String,
    #[schema(example = "VER")]
    pub second: String,
    #[schema(example = "LEC")]
    pub third: String,
    #[schema(example = "ALB")]
    pub midfield_hero: String,
    /// Rejected unless the race is a sprint weekend. Omit it when the sprint
    /// was dropped from the schedule.
    pub sprint: Option<SprintOutcome>,
    #[serde(default)]
    pub crazy_happened: Vec<i32>,
}

impl RaceResultRequest {
    pub fn into_result(self, race_id: i32) -> RaceResult {
        let trim = |s: String| s.trim().to_string();
        RaceResult {
            race_id,
            pole: trim(self.pole),
            first: trim(self.first),
            second: trim(self.second),
            third: trim(self.third),
            midfield_hero: trim(self.midfield_hero),
            sprint: self.sprint.map(|s| SprintOutcome {
                pole: trim(s.pole),
                winner: trim(s.winner),
                midfield_hero: trim(s.midfield_hero),
            }),
            crazy_happened: self.crazy_happened.into_iter().collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RaceResultResponse {
    #[schema(example = 7)]
    pub race_id: i32,
    pub pole: String,
    pub first: String,
    pub second: String,
    pub third: String,
    pub midfield_hero: String,
    pub sprint: Option<SprintOutcome>,
    pub crazy_happened: Vec<i32>,
    pub entered_by: i32,
    pub updated_at: DateTime<Utc>,
}

impl RaceResultResponse {
    pub fn from_model(model: race_result::Model) -> Result<Self, AppError> {
        let result = model.to_result()?;
        Ok(Self {
            race_id: model.race_id,
            pole: result.pole,
            first: result.first,
            second: result.second,
            third: result.third,
            midfield_hero: result.midfield_hero,
            sprint: result.sprint,
            crazy_happened: result.crazy_happened.into_iter().collect(),
            entered_by: model.entered_by,
            updated_at: model.updated_at,
        })
    }
}
