use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::user_controller::UserController;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterUserRequest};
use crate::dto::common::ApiResponse;
use crate::models::user::User;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Registro y login, sin autenticación previa
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/auth", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let controller = UserController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = UserController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.login(request).await?;
    Ok(Json(response))
}
