use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::order::OrderRow;
use crate::utils::validation::validate_percentage;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWasherRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: String,
    #[validate(custom = "validate_percentage")]
    pub commission: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWasherRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: Option<String>,
    #[validate(custom = "validate_percentage")]
    pub commission: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct WasherTokenResponse {
    pub token: String,
    pub expires_in_hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct WasherPublicRequest {
    pub token: String,
}

/// Datos visibles en la página pública del lavador
#[derive(Debug, Serialize)]
pub struct WasherPublicResponse {
    pub name: String,
    pub commission: Decimal,
    pub orders: Vec<OrderRow>,
}
