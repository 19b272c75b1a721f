use scoring::{RacePrediction, SprintPick};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's prediction for a race weekend. Unique per `(user_id, race_id)`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_prediction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub race_id: i32,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: HasOne<super::race::Entity>,

    pub pole: Option<String>,
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
    pub midfield_hero: Option<String>,

    pub sprint_pole: Option<String>,
    pub sprint_winner: Option<String>,
    pub sprint_midfield_hero: Option<String>,

    pub crazy: Option<String>,
    pub crazy_override: Option<bool>,

    /// Last computed total; NULL until the race result exists.
    pub points: Option<i32>,
    pub scored_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn to_prediction(&self) -> RacePrediction {
        let sprint = (self.sprint_pole.is_some()
            || self.sprint_winner.is_some()
            || self.sprint_midfield_hero.is_some())
        .then(|| SprintPick {
            pole: self.sprint_pole.clone(),
            winner: self.sprint_winner.clone(),
            midfield_hero: self.sprint_midfield_hero.clone(),
        });

        RacePrediction {
            id: self.id,
            user_id: self.user_id,
            race_id: self.race_id,
            pole: self.pole.clone(),
            first: self.first.clone(),
            second: self.second.clone(),
            third: self.third.clone(),
            midfield_hero: self.midfield_hero.clone(),
            sprint,
            crazy: self.crazy.clone(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
