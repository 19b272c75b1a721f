use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,

    #[sea_orm(has_many)]
    pub season_predictions: HasMany<super::season_prediction::Entity>,

    #[sea_orm(has_many)]
    pub race_predictions: HasMany<super::race_prediction::Entity>,

    #[sea_orm(has_many, via = "league_member")]
    pub leagues: HasMany<super::league::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
