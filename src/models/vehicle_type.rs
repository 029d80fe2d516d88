//! Modelo de VehicleType
//!
//! Categoría usada para buscar precios en las tablas de servicios y adicionales.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleType {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
