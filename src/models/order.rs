//! Modelo de Order (orden de servicio)
//!
//! Estados, ítems y reglas de transición.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Finalized,
    Cancelled,
}

impl OrderStatus {
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Finalized | OrderStatus::Cancelled)
    }

    /// Transiciones permitidas; repetir el mismo estado no es una transición
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress | Finalized | Cancelled)
                | (InProgress, Pending | Finalized | Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Finalized => "FINALIZED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "IN_PROGRESS" => Ok(OrderStatus::InProgress),
            "FINALIZED" => Ok(OrderStatus::Finalized),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Estado inválido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Service,
    Addon,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub company_id: Uuid,
    pub order_number: i32,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub washer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub commission: Decimal,
    pub paid: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Ítem de la orden con el nombre del servicio o adicional
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kind: ItemKind,
    pub service_id: Option<Uuid>,
    pub addon_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Fila del listado con datos de cliente, vehículo y lavador
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_plate: String,
    pub vehicle_model: Option<String>,
    pub vehicle_type_id: Option<Uuid>,
    pub washer_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_never_transition() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Finalized,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Finalized.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn active_states_can_move_between_each_other_and_close() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Finalized));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn open_and_closed_states() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::InProgress.is_active());
        assert!(OrderStatus::Finalized.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("in_progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert!("DONE".parse::<OrderStatus>().is_err());
    }
}
