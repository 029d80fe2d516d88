use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::customer_controller::CustomerController;
use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::customer_dto::{CreateCustomerRequest, CustomerDetail, UpdateCustomerRequest};
use crate::middleware::RequestContext;
use crate::models::customer::Customer;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/plate/:plate", get(find_by_plate))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn create_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.create(ctx.company_id, request).await?;
    Ok(Json(response))
}

async fn list_customers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Customer>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.list(ctx.company_id, query).await?;
    Ok(Json(response))
}

async fn find_by_plate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(plate): Path<String>,
) -> Result<Json<CustomerDetail>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.find_by_plate(ctx.company_id, &plate).await?;
    Ok(Json(response))
}

async fn get_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerDetail>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(response))
}

async fn delete_customer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message("Cliente eliminado exitosamente")))
}
