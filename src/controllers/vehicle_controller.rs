use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{ApiResponse, Paginated};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters};
use crate::models::vehicle::{Vehicle, VehicleDetail};
use crate::repositories::{
    customer_repository::CustomerRepository, vehicle_repository::VehicleRepository,
    vehicle_type_repository::VehicleTypeRepository,
};
use crate::utils::errors::AppError;
use crate::utils::validation::{checked_plate, clean_optional, normalize_plate};

pub struct VehicleController {
    pool: PgPool,
    repository: VehicleRepository,
    customers: CustomerRepository,
    vehicle_types: VehicleTypeRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool.clone()),
            vehicle_types: VehicleTypeRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        self.ensure_customer(company_id, request.customer_id).await?;
        self.ensure_vehicle_type(company_id, request.vehicle_type_id).await?;

        let plate = checked_plate(&request.plate)?;
        if self.repository.plate_exists(&plate, None).await? {
            return Err(AppError::Conflict("La placa ya está registrada".to_string()));
        }

        let mut conn = self.pool.acquire().await?;
        let vehicle = VehicleRepository::insert(
            &mut conn,
            request.customer_id,
            request.vehicle_type_id,
            &plate,
            clean_optional(request.model).as_deref(),
            clean_optional(request.color).as_deref(),
            request.year,
        )
        .await?;

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehículo creado exitosamente",
        ))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        filters: VehicleFilters,
    ) -> Result<Paginated<VehicleDetail>, AppError> {
        let (vehicles, total) = self.repository.list(company_id, &filters).await?;
        Ok(Paginated::new(vehicles, &filters.page_query(), total))
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<VehicleDetail, AppError> {
        self.repository
            .find_detail(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))
    }

    pub async fn get_by_plate(&self, company_id: Uuid, plate: &str) -> Result<VehicleDetail, AppError> {
        self.repository
            .find_detail_by_plate(company_id, &normalize_plate(plate))
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let current = self.find(company_id, id).await?;

        if let Some(customer_id) = request.customer_id {
            self.ensure_customer(company_id, customer_id).await?;
        }
        self.ensure_vehicle_type(company_id, request.vehicle_type_id).await?;

        let plate = match request.plate.as_deref() {
            Some(raw) => {
                let plate = checked_plate(raw)?;
                if self.repository.plate_exists(&plate, Some(id)).await? {
                    return Err(AppError::Conflict("La placa ya está registrada".to_string()));
                }
                Some(plate)
            }
            None => None,
        };

        let vehicle = self
            .repository
            .update(
                current,
                request.customer_id,
                request.vehicle_type_id,
                plate,
                clean_optional(request.model),
                clean_optional(request.color),
                request.year,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehículo actualizado exitosamente",
        ))
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let vehicle = self.find(company_id, id).await?;

        if self.repository.has_orders(vehicle.id).await? {
            return Err(AppError::BadRequest(
                "El vehículo tiene órdenes de servicio asociadas".to_string(),
            ));
        }

        self.repository.delete(vehicle.id).await
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Vehicle, AppError> {
        self.repository
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))
    }

    async fn ensure_customer(&self, company_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        self.customers
            .find_by_id(company_id, customer_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))
    }

    async fn ensure_vehicle_type(&self, company_id: Uuid, type_id: Option<Uuid>) -> Result<(), AppError> {
        let Some(type_id) = type_id else {
            return Ok(());
        };

        if self.vehicle_types.count_owned(company_id, &[type_id]).await? != 1 {
            return Err(AppError::BadRequest("Tipo de vehículo inválido".to_string()));
        }
        Ok(())
    }
}
