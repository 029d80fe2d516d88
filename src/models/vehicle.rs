//! Modelo de Vehicle
//!
//! El vehículo pertenece a la empresa a través de su cliente.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_type_id: Option<Uuid>,
    pub plate: String,
    pub model: Option<String>,
    pub color: Option<String>,
    pub year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Vehículo con los nombres de cliente y tipo para listados
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub customer_name: String,
    pub vehicle_type_name: Option<String>,
}
