use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common::{ApiResponse, Paginated};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters};
use crate::middleware::RequestContext;
use crate::models::vehicle::{Vehicle, VehicleDetail};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/plate/:plate", get(get_by_plate))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(ctx.company_id, request).await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Paginated<VehicleDetail>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list(ctx.company_id, filters).await?;
    Ok(Json(response))
}

async fn get_by_plate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(plate): Path<String>,
) -> Result<Json<VehicleDetail>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get_by_plate(ctx.company_id, &plate).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleDetail>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get(ctx.company_id, id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update(ctx.company_id, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(ctx.company_id, id).await?;
    Ok(Json(ApiResponse::message("Vehículo eliminado exitosamente")))
}
