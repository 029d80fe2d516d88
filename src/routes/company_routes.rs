use axum::{
    extract::{Extension, Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::company_controller::CompanyController;
use crate::dto::auth_dto::{CompanyAuthRequest, TokenResponse};
use crate::dto::common::ApiResponse;
use crate::dto::company_dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::middleware::AuthUser;
use crate::models::company::{Company, CompanySummary};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Empresas del usuario autenticado
pub fn create_company_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_company).get(list_companies))
        .route("/auth", post(authenticate))
        .route("/:id", get(get_company).put(update_company))
        .route("/:id/status", patch(toggle_status))
}

async fn create_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<Json<ApiResponse<Company>>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.create(user.user_id, request).await?;
    Ok(Json(response))
}

async fn list_companies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CompanySummary>>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.list(user.user_id).await?;
    Ok(Json(response))
}

async fn authenticate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CompanyAuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.authenticate(user.user_id, request).await?;
    Ok(Json(response))
}

async fn get_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.get(user.user_id, id).await?;
    Ok(Json(response))
}

async fn update_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompanyRequest>,
) -> Result<Json<ApiResponse<Company>>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.update(user.user_id, id, request).await?;
    Ok(Json(response))
}

async fn toggle_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Company>>, AppError> {
    let controller = CompanyController::new(state.pool.clone(), state.jwt.clone());
    let response = controller.toggle_status(user.user_id, id).await?;
    Ok(Json(response))
}
