use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::washer_controller::WasherController;
use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::washer_dto::{CreateWasherRequest, UpdateWasherRequest, WasherTokenResponse};
use crate::middleware::RequestContext;
use crate::models::washer::{Washer, WasherWithStats};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_washer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_washer).get(list_washers))
        .route("/simple", get(list_active_washers))
        .route(
            "/:id",
            get(get_washer).put(update_washer).delete(delete_washer),
        )
        .route("/:id/toggle", patch(toggle_washer))
        .route("/:id/public-token", post(public_token))
}

async fn create_washer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateWasherRequest>,
) -> Result<Json<ApiResponse<Washer>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.create(ctx.company_id, request).await?;
    Ok(Json(response))
}

async fn list_washers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<WasherWithStats>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.list(ctx.company_id, query).await?;
    Ok(Json(response))
}

async fn list_active_washers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Washer>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.list_active(ctx.company_id).await?;
    Ok(Json(response))
}

async fn get_washer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Washer>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_washer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWasherRequest>,
) -> Result<Json<ApiResponse<Washer>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(response))
}

async fn toggle_washer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Washer>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.toggle(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn delete_washer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message("Lavador eliminado exitosamente")))
}

async fn public_token(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<WasherTokenResponse>, AppError> {
    let controller = WasherController::new(state.pool.clone());
    let response = controller.public_token(ctx.company_id, id, &state.jwt).await?;
    Ok(Json(response))
}
