use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::washer_controller::WasherController;
use crate::dto::washer_dto::{WasherPublicRequest, WasherPublicResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Consultas con token público, fuera del contexto de empresa
pub fn create_public_router() -> Router<AppState> {
    Router::new().route("/washer", post(washer_view))
}

async fn washer_view(
    State(state): State<AppState>,
    Json(request): Json<WasherPublicRequest>,
) -> Result<Json<WasherPublicResponse>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.public_view(request, &state.jwt).await?;
    Ok(Json(response))
}
