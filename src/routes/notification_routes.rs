use axum::{
    extract::{Extension, Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::notification_controller::NotificationController;
use crate::dto::notification_dto::NotificationList;
use crate::middleware::RequestContext;
use crate::models::notification::Notification;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", patch(mark_read))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<NotificationList>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.list(ctx.company_id).await?;
    Ok(Json(response))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let response = controller.mark_read(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn mark_all_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = NotificationController::new(state.pool.clone());
    let updated = controller.mark_all_read(ctx.company_id).await?;
    Ok(Json(json!({
        "success": true,
        "updated": updated
    })))
}
