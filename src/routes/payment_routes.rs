use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::payment_controller::PaymentController;
use crate::dto::common::ApiResponse;
use crate::dto::payment_dto::{
    CreatePaymentRequest, PaymentResponse, PaymentStats, PaymentStatsFilters,
    UpdatePaymentStatusRequest,
};
use crate::middleware::RequestContext;
use crate::models::payment::Payment;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/stats", get(payment_stats))
        .route("/order/:order_id", get(list_for_order))
        .route("/:id/status", put(update_status))
        .route("/:id", delete(delete_payment))
}

async fn create_payment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), AppError> {
    let controller = PaymentController::new(state.pool.clone());
    let response = controller.create(ctx.company_id, request).await?;
    Ok(ApiResponse::created(response, "Pago registrado exitosamente"))
}

async fn list_for_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let controller = PaymentController::new(state.pool.clone());
    let response = controller.list_for_order(ctx.company_id, order_id).await?;
    Ok(Json(response))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, AppError> {
    let controller = PaymentController::new(state.pool.clone());
    let response = controller.update_status(ctx.company_id, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Estado del pago actualizado",
    )))
}

async fn delete_payment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = PaymentController::new(state.pool.clone());
    let order_paid = controller.delete(ctx.company_id, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Pago eliminado exitosamente",
        "order_paid": order_paid
    })))
}

async fn payment_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(filters): Query<PaymentStatsFilters>,
) -> Result<Json<PaymentStats>, AppError> {
    let controller = PaymentController::new(state.pool.clone());
    let response = controller.stats(ctx.company_id, filters).await?;
    Ok(Json(response))
}
