use scoring::SeasonResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authoritative season outcome. At most one per season.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "season_result")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub season: i32,
    #[sea_orm(belongs_to, from = "season", to = "year")]
    pub season_ref: HasOne<super::season::Entity>,

    #[sea_orm(column_type = "JsonBinary")]
    pub drivers_order: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub constructors_order: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub sackings: Json,
    pub new_team_winner: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub first_winners: Json,
    /// Season prediction ids whose crazy prediction came true.
    #[sea_orm(column_type = "JsonBinary")]
    pub crazy_happened: Json,

    /// User id of the admin who last wrote the result.
    pub entered_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn to_result(&self) -> Result<SeasonResult, serde_json::Error> {
        Ok(SeasonResult {
            season: self.season,
            drivers_order: serde_json::from_value(self.drivers_order.clone())?,
            constructors_order: serde_json::from_value(self.constructors_order.clone())?,
            sackings: serde_json::from_value(self.sackings.clone())?,
            new_team_winner: self.new_team_winner.clone(),
            first_winners: serde_json::from_value(self.first_winners.clone())?,
            crazy_happened: serde_json::from_value(self.crazy_happened.clone())?,
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
