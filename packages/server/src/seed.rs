use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{crazy_vote, race, race_prediction, role, role_permission, season_prediction};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "player"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "season:manage"),
    ("admin", "result:manage"),
    ("admin", "score:recalculate"),
    ("admin", "prediction:submit"),
    ("admin", "crazy:vote"),
    ("admin", "league:create"),
    ("admin", "league:manage"),
    // Player
    ("player", "prediction:submit"),
    ("player", "crazy:vote"),
    ("player", "league:create"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required composite indexes exist.
///
/// SeaORM's schema-sync doesn't create composite indexes, so they are added
/// on startup. The unique ones back the one-per-user prediction rule and the
/// one-race-per-round calendar rule.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes: [(&str, IndexCreateStatement); 4] = [
        (
            "idx_season_prediction_user_season",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_season_prediction_user_season")
                .table(season_prediction::Entity)
                .col(season_prediction::Column::UserId)
                .col(season_prediction::Column::Season)
                .to_owned(),
        ),
        (
            "idx_race_prediction_user_race",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_race_prediction_user_race")
                .table(race_prediction::Entity)
                .col(race_prediction::Column::UserId)
                .col(race_prediction::Column::RaceId)
                .to_owned(),
        ),
        (
            "idx_race_season_round",
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_race_season_round")
                .table(race::Entity)
                .col(race::Column::Season)
                .col(race::Column::Round)
                .to_owned(),
        ),
        // Vote lookups by target: SELECT .. FROM crazy_vote WHERE kind = ? AND prediction_id = ?
        (
            "idx_crazy_vote_target",
            Index::create()
                .if_not_exists()
                .name("idx_crazy_vote_target")
                .table(crazy_vote::Entity)
                .col(crazy_vote::Column::Kind)
                .col(crazy_vote::Column::PredictionId)
                .to_owned(),
        ),
    ];

    for (name, index) in indexes {
        let stmt = index.to_string(PostgresQueryBuilder);
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
