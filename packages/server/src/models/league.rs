use chrono::{DateTime, Utc};
use scoring::LeaderboardEntry;
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::league;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLeagueRequest {
    #[schema(example = "Office Paddock Club")]
    pub name: String,
}

impl CreateLeagueRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name("name", &self.name, 64)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeagueMemberResponse {
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = "tifosi_77")]
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeagueResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Office Paddock Club")]
    pub name: String,
    #[schema(example = 42)]
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub members: Vec<LeagueMemberResponse>,
}

impl LeagueResponse {
    pub fn new(model: league::Model, members: Vec<LeagueMemberResponse>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
            created_at: model.created_at,
            members,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Season year to rank.
    #[param(example = 2026)]
    pub season: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    #[schema(example = 3)]
    pub league_id: i32,
    #[schema(example = 2026)]
    pub season: i32,
    pub entries: Vec<LeaderboardEntry>,
}
