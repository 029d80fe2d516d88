use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::customer_dto::{CreateCustomerRequest, CustomerDetail, UpdateCustomerRequest};
use crate::models::customer::Customer;
use crate::repositories::{customer_repository::CustomerRepository, vehicle_repository::VehicleRepository};
use crate::utils::errors::AppError;
use crate::utils::validation::{clean_optional, normalize_plate};

pub struct CustomerController {
    repository: CustomerRepository,
    vehicles: VehicleRepository,
}

impl CustomerController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateCustomerRequest,
    ) -> Result<ApiResponse<Customer>, AppError> {
        request.validate()?;

        let phone = clean_optional(request.phone);
        let email = clean_optional(request.email).map(|e| e.to_lowercase());

        if self
            .repository
            .contact_exists(company_id, phone.as_deref(), email.as_deref(), None)
            .await?
        {
            return Err(AppError::BadRequest(
                "Ya existe un cliente con este teléfono o e-mail".to_string(),
            ));
        }

        let customer = self
            .repository
            .create(company_id, request.name.trim(), phone.as_deref(), email.as_deref())
            .await?;

        Ok(ApiResponse::success_with_message(
            customer,
            "Cliente creado exitosamente",
        ))
    }

    pub async fn list(&self, company_id: Uuid, query: PageQuery) -> Result<Paginated<Customer>, AppError> {
        let (customers, total) = self.repository.list(company_id, &query).await?;
        Ok(Paginated::new(customers, &query, total))
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<CustomerDetail, AppError> {
        let customer = self.find(company_id, id).await?;
        let vehicles = self.vehicles.list_for_customer(customer.id).await?;

        Ok(CustomerDetail { customer, vehicles })
    }

    /// Cliente dueño de la placa dentro de la empresa
    pub async fn find_by_plate(&self, company_id: Uuid, plate: &str) -> Result<CustomerDetail, AppError> {
        let customer = self
            .repository
            .find_by_plate(company_id, &normalize_plate(plate))
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado para esta placa".to_string()))?;
        let vehicles = self.vehicles.list_for_customer(customer.id).await?;

        Ok(CustomerDetail { customer, vehicles })
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<ApiResponse<Customer>, AppError> {
        request.validate()?;
        let current = self.find(company_id, id).await?;

        let phone = clean_optional(request.phone);
        let email = clean_optional(request.email).map(|e| e.to_lowercase());

        if self
            .repository
            .contact_exists(company_id, phone.as_deref(), email.as_deref(), Some(id))
            .await?
        {
            return Err(AppError::BadRequest(
                "Ya existe un cliente con este teléfono o e-mail".to_string(),
            ));
        }

        let customer = self
            .repository
            .update(
                current,
                request.name.map(|n| n.trim().to_string()),
                phone,
                email,
                request.active,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            customer,
            "Cliente actualizado exitosamente",
        ))
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let customer = self.find(company_id, id).await?;

        if self.repository.has_dependents(customer.id).await? {
            return Err(AppError::BadRequest(
                "El cliente tiene vehículos u órdenes asociadas".to_string(),
            ));
        }

        self.repository.delete(customer.id).await
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Customer, AppError> {
        self.repository
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()))
    }
}
