use scoring::submission::SeasonRoster;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "season")]
pub struct Model {
    /// Calendar year of the championship.
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,

    /// Entrant driver ids as a JSON array.
    #[sea_orm(column_type = "JsonBinary")]
    pub drivers: Json,
    /// Entrant constructor ids as a JSON array.
    #[sea_orm(column_type = "JsonBinary")]
    pub constructors: Json,
    /// The two constructor ids offered for the new-team question.
    #[sea_orm(column_type = "JsonBinary")]
    pub new_teams: Json,

    /// Season predictions are read-only after this instant.
    pub prediction_deadline: DateTimeUtc,

    #[sea_orm(has_many)]
    pub races: HasMany<super::race::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn roster(&self) -> Result<SeasonRoster, serde_json::Error> {
        Ok(SeasonRoster {
            season: self.year,
            drivers: serde_json::from_value(self.drivers.clone())?,
            constructors: serde_json::from_value(self.constructors.clone())?,
            new_teams: serde_json::from_value(self.new_teams.clone())?,
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
