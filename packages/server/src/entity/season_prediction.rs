use scoring::SeasonPrediction;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's season-long prediction. Unique per `(user_id, season)`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "season_prediction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub season: i32,
    #[sea_orm(belongs_to, from = "season", to = "year")]
    pub season_ref: HasOne<super::season::Entity>,

    /// Driver ids in predicted finishing order; empty when unanswered.
    #[sea_orm(column_type = "JsonBinary")]
    pub drivers_order: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub constructors_order: Json,
    /// NULL when unanswered, `[]` for an explicit "no sackings".
    #[sea_orm(column_type = "JsonBinary")]
    pub sackings: Option<Json>,
    pub new_team_pick: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub first_winners: Option<Json>,
    #[sea_orm(column_type = "JsonBinary")]
    pub grid_next: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub grid_following: Json,

    pub crazy: Option<String>,
    /// Admin decision that replaces the peer votes when set.
    pub crazy_override: Option<bool>,

    /// Last computed total; NULL until the season result exists.
    pub points: Option<i32>,
    pub scored_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn to_prediction(&self) -> Result<SeasonPrediction, serde_json::Error> {
        Ok(SeasonPrediction {
            id: self.id,
            user_id: self.user_id,
            season: self.season,
            drivers_order: serde_json::from_value(self.drivers_order.clone())?,
            constructors_order: serde_json::from_value(self.constructors_order.clone())?,
            sackings: self
                .sackings
                .clone()
                .map(serde_json::from_value)
                .transpose()?,
            new_team_pick: self.new_team_pick.clone(),
            crazy: self.crazy.clone(),
            first_winners: self
                .first_winners
                .clone()
                .map(serde_json::from_value)
                .transpose()?,
            grid_next: serde_json::from_value(self.grid_next.clone())?,
            grid_following: serde_json::from_value(self.grid_following.clone())?,
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
