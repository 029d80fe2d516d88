use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::order_controller::OrderController;
use crate::dto::common::{ApiResponse, Paginated};
use crate::dto::order_dto::{
    CreateOrderRequest, OrderDetail, OrderFilters, OrderStats, StatsFilters, UpdateOrderRequest,
};
use crate::middleware::RequestContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/stats", get(order_stats))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/cancel", patch(cancel_order))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), AppError> {
    let controller = OrderController::new(state.pool.clone());
    let order = controller.create(ctx.company_id, request).await?;
    Ok(ApiResponse::created(order, "Orden de servicio creada exitosamente"))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(filters): Query<OrderFilters>,
) -> Result<Json<Paginated<OrderDetail>>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    let response = controller.list(ctx.company_id, filters).await?;
    Ok(Json(response))
}

async fn order_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(filters): Query<StatsFilters>,
) -> Result<Json<OrderStats>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    let response = controller.stats(ctx.company_id, filters).await?;
    Ok(Json(response))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderDetail>>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    let order = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Orden de servicio actualizada exitosamente",
    )))
}

async fn cancel_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderDetail>>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    let order = controller.cancel(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Orden de servicio cancelada",
    )))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = OrderController::new(state.pool.clone());
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message("Orden de servicio eliminada exitosamente")))
}
