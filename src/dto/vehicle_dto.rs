use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::common::PageQuery;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub customer_id: Uuid,
    pub vehicle_type_id: Option<Uuid>,
    #[validate(length(min = 1, max = 10, message = "La placa es requerida"))]
    pub plate: String,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Año inválido"))]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    pub customer_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    #[validate(length(min = 1, max = 10, message = "La placa es requerida"))]
    pub plate: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Año inválido"))]
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(alias = "clienteId")]
    pub customer_id: Option<Uuid>,
}

impl VehicleFilters {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            active: None,
        }
    }
}
