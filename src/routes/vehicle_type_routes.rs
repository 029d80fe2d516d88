use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_type_controller::VehicleTypeController;
use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::vehicle_type_dto::{CreateVehicleTypeRequest, UpdateVehicleTypeRequest};
use crate::middleware::RequestContext;
use crate::models::vehicle_type::VehicleType;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_type_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle_type).get(list_vehicle_types))
        .route("/subtypes/:category", get(list_subtypes))
        .route(
            "/:id",
            get(get_vehicle_type)
                .put(update_vehicle_type)
                .delete(delete_vehicle_type),
        )
}

async fn create_vehicle_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateVehicleTypeRequest>,
) -> Result<Json<ApiResponse<VehicleType>>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    let response = controller.create(ctx.company_id, request).await?;
    Ok(Json(response))
}

async fn list_vehicle_types(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<VehicleType>>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    let response = controller.list(ctx.company_id, query).await?;
    Ok(Json(response))
}

async fn list_subtypes(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(category): Path<String>,
) -> Result<Json<Vec<VehicleType>>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    let response = controller.subtypes(ctx.company_id, &category).await?;
    Ok(Json(response))
}

async fn get_vehicle_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleType>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_vehicle_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleTypeRequest>,
) -> Result<Json<ApiResponse<VehicleType>>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    let response = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleTypeController::new(state.pool.clone());
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message("Tipo de vehículo eliminado exitosamente")))
}
