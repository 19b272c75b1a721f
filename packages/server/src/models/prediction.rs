use chrono::{DateTime, Utc};
use scoring::submission::normalize_crazy_text;
use scoring::{FirstWinPick, GridPairing, RacePrediction, SeasonPrediction, SprintPick};
use serde::{Deserialize, Serialize};

use super::shared::{normalize_ids, normalize_opt_id};
use crate::entity::{race_prediction, season_prediction};
use crate::error::AppError;

/// Full replacement of the caller's season prediction. Omitted questions are
/// stored as unanswered.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpsertSeasonPredictionRequest {
    /// Every entrant driver in predicted championship order, or empty.
    #[serde(default)]
    #[schema(example = json!(["NOR", "VER", "PIA", "LEC"]))]
    pub drivers_order: Vec<String>,
    #[serde(default)]
    #[schema(example = json!(["mclaren", "red_bull", "ferrari"]))]
    pub constructors_order: Vec<String>,
    /// Team principals or drivers predicted to be sacked. `[]` means "nobody".
    #[schema(example = json!(["horner"]))]
    pub sackings: Option<Vec<String>>,
    #[schema(example = "cadillac")]
    pub new_team_pick: Option<String>,
    pub first_winners: Option<FirstWinPick>,
    #[serde(default)]
    pub grid_next: Vec<GridPairing>,
    #[serde(default)]
    pub grid_following: Vec<GridPairing>,
    /// Free-text bold prediction, at most 500 characters.
    #[schema(example = "A Williams driver finishes on the podium")]
    pub crazy: Option<String>,
}

impl UpsertSeasonPredictionRequest {
    pub fn into_prediction(self, user_id: i32, season: i32) -> Result<SeasonPrediction, AppError> {
        Ok(SeasonPrediction {
            id: 0,
            user_id,
            season,
            drivers_order: normalize_ids("drivers_order", self.drivers_order)?,
            constructors_order: normalize_ids("constructors_order", self.constructors_order)?,
            sackings: self
                .sackings
                .map(|ids| normalize_ids("sackings", ids))
                .transpose()?
                .map(|ids| ids.into_iter().collect()),
            new_team_pick: normalize_opt_id(self.new_team_pick),
            first_winners: self.first_winners,
            grid_next: self.grid_next,
            grid_following: self.grid_following,
            crazy: normalize_crazy_text(self.crazy)?,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SeasonPredictionResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = 2026)]
    pub season: i32,
    pub drivers_order: Vec<String>,
    pub constructors_order: Vec<String>,
    pub sackings: Option<Vec<String>>,
    pub new_team_pick: Option<String>,
    pub first_winners: Option<FirstWinPick>,
    pub grid_next: Vec<GridPairing>,
    pub grid_following: Vec<GridPairing>,
    pub crazy: Option<String>,
    /// Stored total, NULL until the season result is entered.
    pub points: Option<i32>,
    pub scored_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SeasonPredictionResponse {
    pub fn from_model(model: season_prediction::Model) -> Result<Self, AppError> {
        let prediction = model.to_prediction()?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            season: model.season,
            drivers_order: prediction.drivers_order,
            constructors_order: prediction.constructors_order,
            sackings: prediction.sackings.map(|s| s.into_iter().collect()),
            new_team_pick: prediction.new_team_pick,
            first_winners: prediction.first_winners,
            grid_next: prediction.grid_next,
            grid_following: prediction.grid_following,
            crazy: prediction.crazy,
            points: model.points,
            scored_at: model.scored_at,
            updated_at: model.updated_at,
        })
    }
}

/// Full replacement of the caller's prediction for one race.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpsertRacePredictionRequest {
    #[schema(example = "VER")]
    pub pole: Option<String>,
    #[schema(example = "NOR")]
    pub first: Option<String>,
    #[schema(example = "VER")]
    pub second: Option<String>,
    #[schema(example = "LEC")]
    pub third: Option<String>,
    /// Best finisher outside the top teams.
    #[schema(example = "ALB")]
    pub midfield_hero: Option<String>,
    /// Only accepted on sprint weekends.
    pub sprint: Option<SprintPick>,
    pub crazy: Option<String>,
}

impl UpsertRacePredictionRequest {
    pub fn into_prediction(self, user_id: i32, race_id: i32) -> Result<RacePrediction, AppError> {
        let sprint = self.sprint.map(|s| SprintPick {
            pole: normalize_opt_id(s.pole),
            winner: normalize_opt_id(s.winner),
            midfield_hero: normalize_opt_id(s.midfield_hero),
        });
        Ok(RacePrediction {
            id: 0,
            user_id,
            race_id,
            pole: normalize_opt_id(self.pole),
            first: normalize_opt_id(self.first),
            second: normalize_opt_id(self.second),
            third: normalize_opt_id(self.third),
            midfield_hero: normalize_opt_id(self.midfield_hero),
            sprint,
            crazy: normalize_crazy_text(self.crazy)?,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RacePredictionResponse {
    #[schema(example = 31)]
    pub id: i32,
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = 7)]
    pub race_id: i32,
    pub pole: Option<String>,
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
    pub midfield_hero: Option<String>,
    pub sprint: Option<SprintPick>,
    pub crazy: Option<String>,
    /// Stored total, NULL until the race result is entered.
    pub points: Option<i32>,
    pub scored_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<race_prediction::Model> for RacePredictionResponse {
    fn from(model: race_prediction::Model) -> Self {
        let prediction = model.to_prediction();
        Self {
            id: model.id,
            user_id: model.user_id,
            race_id: model.race_id,
            pole: prediction.pole,
            first: prediction.first,
            second: prediction.second,
            third: prediction.third,
            midfield_hero: prediction.midfield_hero,
            sprint: prediction.sprint,
            crazy: prediction.crazy,
            points: model.points,
            scored_at: model.scored_at,
            updated_at: model.updated_at,
        }
    }
}
