//! Modelo de Company
//!
//! Este módulo contiene el struct Company y los valores por defecto
//! de configuración y preferencias de notificación.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Company principal - mapea exactamente a la tabla companies
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub active: bool,
    pub config: Value,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub auto_finalize: bool,
    pub require_washer_to_finalize: bool,
    pub notification_preferences: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Desfase horario local en minutos, `config.utc_offset_minutes` o el valor por defecto
    pub fn utc_offset_minutes(&self, default: i32) -> i32 {
        self.config
            .get("utc_offset_minutes")
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(default)
    }
}

/// Empresa con contadores para el listado del dueño
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompanySummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub company: Company,
    pub customer_count: i64,
    pub washer_count: i64,
    pub order_count: i64,
}

pub fn default_config() -> Value {
    json!({
        "currency": "BRL",
        "utc_offset_minutes": -180,
    })
}

pub fn default_notification_preferences() -> Value {
    json!({
        "order_created": true,
        "order_updated": true,
        "order_deleted": false,
        "auto_finalization": true,
    })
}

/// Tipos de vehículo creados junto con cada empresa: (nombre, categoría)
pub const DEFAULT_VEHICLE_TYPES: &[(&str, Option<&str>)] = &[
    ("CARRO", None),
    ("MOTO", None),
    ("OUTROS", None),
    ("HATCH", Some("CARRO")),
    ("SEDAN", Some("CARRO")),
    ("SUV", Some("CARRO")),
    ("PICKUP", Some("CARRO")),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn company(config: Value) -> Company {
        Company {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Lava Rápido".into(),
            active: true,
            config,
            opening_time: Some("08:00".into()),
            closing_time: Some("18:00".into()),
            auto_finalize: true,
            require_washer_to_finalize: false,
            notification_preferences: default_notification_preferences(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn offset_comes_from_config_or_default() {
        assert_eq!(company(json!({"utc_offset_minutes": 60})).utc_offset_minutes(-180), 60);
        assert_eq!(company(json!({})).utc_offset_minutes(-180), -180);
        assert_eq!(company(default_config()).utc_offset_minutes(0), -180);
    }
}
