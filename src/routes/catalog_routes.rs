//! Rutas de servicios y adicionales
//!
//! `/services` y `/addons` comparten handlers; el tipo de ítem se fija
//! como Extension al montar cada router.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::catalog_controller::CatalogController;
use crate::dto::catalog_dto::{
    CatalogItemResponse, CreateCatalogItemRequest, UpdateCatalogItemRequest,
};
use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::middleware::RequestContext;
use crate::models::order::ItemKind;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_service_router() -> Router<AppState> {
    create_catalog_router(ItemKind::Service)
}

pub fn create_addon_router() -> Router<AppState> {
    create_catalog_router(ItemKind::Addon)
}

fn create_catalog_router(kind: ItemKind) -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/simple", get(list_active_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .layer(Extension(kind))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
    Json(request): Json<CreateCatalogItemRequest>,
) -> Result<Json<ApiResponse<CatalogItemResponse>>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    let response = controller.create(ctx.company_id, request).await?;
    Ok(Json(response))
}

async fn list_items(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<CatalogItemResponse>>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    let response = controller.list(ctx.company_id, query).await?;
    Ok(Json(response))
}

async fn list_active_items(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
) -> Result<Json<Vec<CatalogItemResponse>>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    let response = controller.list_active(ctx.company_id).await?;
    Ok(Json(response))
}

async fn get_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
    Path(id): Path<Uuid>,
) -> Result<Json<CatalogItemResponse>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCatalogItemRequest>,
) -> Result<Json<ApiResponse<CatalogItemResponse>>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    let response = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(response))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(kind): Extension<ItemKind>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CatalogController::new(state.pool.clone(), kind);
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message(format!(
        "{} eliminado exitosamente",
        kind.label()
    ))))
}
