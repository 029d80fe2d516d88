//! Modelo de catálogo: servicios y adicionales
//!
//! Ambos comparten forma: precio fijo opcional más una tabla de precios
//! por tipo de vehículo. `ItemKind` decide las tablas involucradas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::order::ItemKind;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Entrada de la tabla de precios por tipo de vehículo
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogPrice {
    pub item_id: Uuid,
    pub vehicle_type_id: Uuid,
    pub price: Decimal,
}

impl ItemKind {
    pub fn table(self) -> &'static str {
        match self {
            ItemKind::Service => "services",
            ItemKind::Addon => "addons",
        }
    }

    pub fn prices_table(self) -> &'static str {
        match self {
            ItemKind::Service => "service_prices",
            ItemKind::Addon => "addon_prices",
        }
    }

    /// Columna que referencia el ítem en order_items y en la tabla de precios
    pub fn item_column(self) -> &'static str {
        match self {
            ItemKind::Service => "service_id",
            ItemKind::Addon => "addon_id",
        }
    }

    /// Nombre para mensajes al usuario
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Service => "Servicio",
            ItemKind::Addon => "Adicional",
        }
    }
}
