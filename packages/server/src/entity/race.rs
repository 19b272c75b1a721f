use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub season: i32,
    #[sea_orm(belongs_to, from = "season", to = "year")]
    pub season_ref: HasOne<super::season::Entity>,

    /// 1-based position in the calendar, unique within a season.
    pub round: i32,
    pub name: String,
    pub has_sprint: bool,
    /// Race predictions are read-only after this instant.
    pub prediction_deadline: DateTimeUtc,

    #[sea_orm(has_many)]
    pub predictions: HasMany<super::race_prediction::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
