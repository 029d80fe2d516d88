use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleTypeRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido"))]
    pub name: String,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleTypeRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido"))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
