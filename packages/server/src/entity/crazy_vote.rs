use scoring::Vote;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A peer's accept/reject vote on one crazy prediction.
///
/// `kind` is `"season"` or `"race"` and selects which prediction table
/// `prediction_id` refers to.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crazy_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub validator_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub kind: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub prediction_id: i32,
    #[sea_orm(belongs_to, from = "validator_id", to = "id")]
    pub validator: HasOne<super::user::Entity>,

    pub accepted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn to_vote(&self) -> Vote {
        Vote {
            validator_id: self.validator_id,
            accepted: self.accepted,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
