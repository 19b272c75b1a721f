use chrono::{DateTime, Utc};
use scoring::submission::SeasonRoster;
use serde::{Deserialize, Serialize};

use super::shared::{normalize_ids, validate_name, validate_season_year};
use crate::entity::{race, season};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSeasonRequest {
    #[schema(example = 2026)]
    pub year: i32,
    /// Every entrant driver id.
    #[schema(example = json!(["VER", "NOR", "LEC", "PIA"]))]
    pub drivers: Vec<String>,
    /// Every entrant constructor id.
    #[schema(example = json!(["red_bull", "mclaren", "ferrari"]))]
    pub constructors: Vec<String>,
    /// Exactly two constructor ids offered for the new-team question.
    #[schema(example = json!(["cadillac", "audi"]))]
    pub new_teams: Vec<String>,
    pub prediction_deadline: DateTime<Utc>,
}

impl CreateSeasonRequest {
    /// Validate and turn the payload into a roster.
    pub fn into_roster(self) -> Result<SeasonRoster, AppError> {
        validate_season_year(self.year)?;
        let new_teams: [String; 2] = normalize_ids("new_teams", self.new_teams)?
            .try_into()
            .map_err(|_| {
                AppError::Validation("new_teams: exactly two options are required".into())
            })?;
        let roster = SeasonRoster {
            season: self.year,
            drivers: normalize_ids("drivers", self.drivers)?,
            constructors: normalize_ids("constructors", self.constructors)?,
            new_teams,
        };
        roster.validate()?;
        Ok(roster)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SeasonResponse {
    #[schema(example = 2026)]
    pub year: i32,
    pub drivers: Vec<String>,
    pub constructors: Vec<String>,
    pub new_teams: Vec<String>,
    pub prediction_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SeasonResponse {
    pub fn from_model(model: season::Model) -> Result<Self, AppError> {
        let roster = model.roster()?;
        Ok(Self {
            year: model.year,
            drivers: roster.drivers,
            constructors: roster.constructors,
            new_teams: roster.new_teams.to_vec(),
            prediction_deadline: model.prediction_deadline,
            created_at: model.created_at,
        })
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRaceRequest {
    /// 1-based calendar position, unique within the season.
    #[schema(example = 1)]
    pub round: i32,
    #[schema(example = "Australian Grand Prix")]
    pub name: String,
    #[serde(default)]
    pub has_sprint: bool,
    pub prediction_deadline: DateTime<Utc>,
}

impl CreateRaceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.round < 1 {
            return Err(AppError::Validation("round must be >= 1".into()));
        }
        validate_name("name", &self.name, 128)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RaceResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 2026)]
    pub season: i32,
    #[schema(example = 1)]
    pub round: i32,
    #[schema(example = "Australian Grand Prix")]
    pub name: String,
    pub has_sprint: bool,
    pub prediction_deadline: DateTime<Utc>,
}

impl From<race::Model> for RaceResponse {
    fn from(race: race::Model) -> Self {
        Self {
            id: race.id,
            season: race.season,
            round: race.round,
            name: race.name,
            has_sprint: race.has_sprint,
            prediction_deadline: race.prediction_deadline,
        }
    }
}
