//! Modelo de Washer (lavador)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Washer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    /// Porcentaje 0-100 sobre el total de la orden
    pub commission: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WasherWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub washer: Washer,
    pub order_count: i64,
}
