use scoring::{RaceResult, SprintOutcome};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authoritative race outcome. At most one per race.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_result")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub race_id: i32,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: HasOne<super::race::Entity>,

    pub pole: String,
    pub first: String,
    pub second: String,
    pub third: String,
    pub midfield_hero: String,

    /// All three are set on sprint weekends and NULL otherwise.
    pub sprint_pole: Option<String>,
    pub sprint_winner: Option<String>,
    pub sprint_midfield_hero: Option<String>,

    /// Race prediction ids whose crazy prediction came true.
    #[sea_orm(column_type = "JsonBinary")]
    pub crazy_happened: Json,

    pub entered_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn to_result(&self) -> Result<RaceResult, serde_json::Error> {
        let sprint = match (
            &self.sprint_pole,
            &self.sprint_winner,
            &self.sprint_midfield_hero,
        ) {
            (Some(pole), Some(winner), Some(midfield_hero)) => Some(SprintOutcome {
                pole: pole.clone(),
                winner: winner.clone(),
                midfield_hero: midfield_hero.clone(),
            }),
            _ => None,
        };

        Ok(RaceResult {
            race_id: self.race_id,
            pole: self.pole.clone(),
            first: self.first.clone(),
            second: self.second.clone(),
            third: self.third.clone(),
            midfield_hero: self.midfield_hero.clone(),
            sprint,
            crazy_happened: serde_json::from_value(self.crazy_happened.clone())?,
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
