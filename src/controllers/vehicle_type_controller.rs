use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::vehicle_type_dto::{CreateVehicleTypeRequest, UpdateVehicleTypeRequest};
use crate::models::vehicle_type::VehicleType;
use crate::repositories::vehicle_type_repository::VehicleTypeRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::clean_optional;

pub struct VehicleTypeController {
    repository: VehicleTypeRepository,
}

impl VehicleTypeController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleTypeRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateVehicleTypeRequest,
    ) -> Result<ApiResponse<VehicleType>, AppError> {
        request.validate()?;

        let name = request.name.trim().to_uppercase();
        let category = clean_optional(request.category).map(|c| c.to_uppercase());

        if self
            .repository
            .name_exists(company_id, &name, category.as_deref(), None)
            .await?
        {
            return Err(AppError::BadRequest(
                "Ya existe un tipo de vehículo con este nombre".to_string(),
            ));
        }

        let vehicle_type = self
            .repository
            .create(
                company_id,
                &name,
                category.as_deref(),
                clean_optional(request.description).as_deref(),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle_type,
            "Tipo de vehículo creado exitosamente",
        ))
    }

    pub async fn list(&self, company_id: Uuid, query: PageQuery) -> Result<Paginated<VehicleType>, AppError> {
        let (types, total) = self.repository.list(company_id, &query).await?;
        Ok(Paginated::new(types, &query, total))
    }

    /// Subtipos activos de una categoría (ej. CARRO → HATCH, SEDAN...)
    pub async fn subtypes(&self, company_id: Uuid, category: &str) -> Result<Vec<VehicleType>, AppError> {
        self.repository
            .subtypes(company_id, &category.trim().to_uppercase())
            .await
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<VehicleType, AppError> {
        self.repository
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tipo de vehículo no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateVehicleTypeRequest,
    ) -> Result<ApiResponse<VehicleType>, AppError> {
        request.validate()?;
        let current = self.get(company_id, id).await?;

        let name = request.name.map(|n| n.trim().to_uppercase());
        let category = clean_optional(request.category).map(|c| c.to_uppercase());

        if name.is_some() || category.is_some() {
            let check_name = name.as_deref().unwrap_or(&current.name);
            let check_category = category.as_deref().or(current.category.as_deref());
            if self
                .repository
                .name_exists(company_id, check_name, check_category, Some(id))
                .await?
            {
                return Err(AppError::BadRequest(
                    "Ya existe un tipo de vehículo con este nombre".to_string(),
                ));
            }
        }

        let vehicle_type = self
            .repository
            .update(
                current,
                name,
                category,
                clean_optional(request.description),
                request.active,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle_type,
            "Tipo de vehículo actualizado exitosamente",
        ))
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let vehicle_type = self.get(company_id, id).await?;

        if self.repository.is_referenced(vehicle_type.id).await? {
            return Err(AppError::BadRequest(
                "El tipo de vehículo está en uso por vehículos o tablas de precios".to_string(),
            ));
        }

        self.repository.delete(vehicle_type.id).await
    }
}
