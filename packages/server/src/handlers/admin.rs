use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::admin::RecalculationReportResponse;
use crate::services::scoring::ScoringService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/recalculate",
    tag = "Admin",
    operation_id = "recalculateAll",
    summary = "Recompute every stored prediction score",
    description = "Requires `score:recalculate` permission. Idempotent. Predictions without a result are counted as deferred and their points cleared; per-prediction failures are reported without aborting the batch.",
    responses(
        (status = 200, description = "Recalculation report", body = RecalculationReportResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn recalculate_all(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RecalculationReportResponse>, AppError> {
    auth_user.require_permission("score:recalculate")?;
    let report = ScoringService::new(&state.db)
        .recalculate_all(state.config.scoring.recalc_concurrency)
        .await?;
    Ok(Json(report.into()))
}
