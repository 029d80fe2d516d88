//! Requests de servicios y adicionales

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::{CatalogItem, CatalogPrice};
use crate::utils::validation::validate_price;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PriceEntry {
    #[serde(alias = "tipoVeiculoId")]
    pub vehicle_type_id: Uuid,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogItemRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "La duración debe ser positiva"))]
    pub duration_minutes: Option<i32>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[validate]
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCatalogItemRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "La duración debe ser positiva"))]
    pub duration_minutes: Option<i32>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    /// Reemplaza la tabla completa cuando está presente
    pub prices: Option<Vec<PriceEntry>>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CatalogItemResponse {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub prices: Vec<CatalogPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<i64>,
}
