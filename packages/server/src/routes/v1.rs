use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/seasons", season_routes())
        .nest("/races", race_routes())
        .nest("/crazy", crazy_routes())
        .nest("/leagues", league_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn season_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::season::create_season))
        .routes(routes!(handlers::season::get_season))
        .routes(routes!(
            handlers::season::create_race,
            handlers::season::list_races
        ))
        .routes(routes!(
            handlers::prediction::upsert_season_prediction,
            handlers::prediction::get_season_prediction
        ))
        .routes(routes!(handlers::prediction::score_season_prediction))
        .routes(routes!(
            handlers::result::upsert_season_result,
            handlers::result::get_season_result
        ))
        .routes(routes!(handlers::crazy::list_season_crazy_predictions))
}

fn race_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::prediction::upsert_race_prediction,
            handlers::prediction::get_race_prediction
        ))
        .routes(routes!(handlers::prediction::score_race_prediction))
        .routes(routes!(
            handlers::result::upsert_race_result,
            handlers::result::get_race_result
        ))
}

fn crazy_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::crazy::get_crazy_prediction))
        .routes(routes!(handlers::crazy::cast_vote))
        .routes(routes!(handlers::crazy::override_crazy_prediction))
}

fn league_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::league::create_league))
        .routes(routes!(handlers::league::get_league))
        .routes(routes!(handlers::league::join_league))
        .routes(routes!(handlers::league::get_leaderboard))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::admin::recalculate_all))
}
