//! Requests, filtros y respuestas de órdenes de servicio

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::common::page_offset;
use crate::models::order::{ItemKind, OrderItem, OrderRow, OrderStatus};
use crate::models::payment::{Payment, PaymentMethod};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[serde(alias = "tipo")]
    pub kind: ItemKind,
    #[serde(alias = "itemId")]
    pub item_id: Uuid,
    #[serde(alias = "quantidade")]
    #[validate(range(min = 1, max = 999, message = "La cantidad debe estar entre 1 y 999"))]
    pub quantity: i32,
}

/// Al menos un ítem y cada uno válido
fn validate_items(items: &[OrderItemInput]) -> Result<(), ValidationError> {
    if items.is_empty() {
        let mut error = ValidationError::new("items");
        error.message = Some("La orden debe tener al menos un ítem".into());
        return Err(error);
    }

    if items.iter().any(|item| item.validate().is_err()) {
        let mut error = ValidationError::new("quantity");
        error.message = Some("La cantidad debe estar entre 1 y 999".into());
        return Err(error);
    }

    Ok(())
}

/// Cliente creado junto con la orden
#[derive(Debug, Deserialize, Validate)]
pub struct InlineCustomer {
    #[serde(alias = "nome")]
    #[validate(length(min = 2, max = 255, message = "El nombre del cliente es requerido"))]
    pub name: String,
    #[serde(alias = "telefone")]
    pub phone: Option<String>,
}

/// Vehículo creado junto con la orden
#[derive(Debug, Deserialize, Validate)]
pub struct InlineVehicle {
    #[serde(alias = "placa")]
    #[validate(length(min = 1, max = 10, message = "La placa es requerida"))]
    pub plate: String,
    #[serde(alias = "modelo")]
    pub model: Option<String>,
    #[serde(alias = "cor")]
    pub color: Option<String>,
    #[serde(alias = "tipoVeiculoId")]
    pub vehicle_type_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[serde(alias = "clienteId")]
    pub customer_id: Option<Uuid>,
    #[serde(alias = "novoCliente")]
    #[validate]
    pub new_customer: Option<InlineCustomer>,
    #[serde(alias = "veiculoId")]
    pub vehicle_id: Option<Uuid>,
    #[serde(alias = "novoVeiculo")]
    #[validate]
    pub new_vehicle: Option<InlineVehicle>,
    #[serde(alias = "lavadorId")]
    pub washer_id: Option<Uuid>,
    #[serde(alias = "itens")]
    #[validate(custom = "validate_items")]
    pub items: Vec<OrderItemInput>,
    #[serde(default, alias = "forcarCriacao")]
    pub force: bool,
    #[serde(alias = "observacoes")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    #[serde(alias = "lavadorId")]
    pub washer_id: Option<Uuid>,
    #[serde(alias = "observacoes")]
    pub notes: Option<String>,
    #[serde(alias = "itens")]
    #[validate(custom = "validate_items")]
    pub items: Option<Vec<OrderItemInput>>,
}

/// Filtros del listado de órdenes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilters {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    /// `ACTIVE`, un estado o una lista separada por comas
    pub status: Option<String>,
    #[serde(alias = "clienteId")]
    pub customer_id: Option<Uuid>,
    #[serde(alias = "lavadorId")]
    pub washer_id: Option<Uuid>,
    #[serde(alias = "dataInicio")]
    pub date_from: Option<NaiveDate>,
    #[serde(alias = "dataFim")]
    pub date_to: Option<NaiveDate>,
    #[serde(alias = "metodoPagamento")]
    pub payment_method: Option<PaymentMethod>,
}

impl OrderFilters {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        page_offset(self.page(), self.limit())
    }

    /// Estados pedidos: `ACTIVE` equivale a PENDING + IN_PROGRESS
    pub fn statuses(&self) -> Result<Vec<OrderStatus>, String> {
        let Some(raw) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Vec::new());
        };

        let mut statuses = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if part.eq_ignore_ascii_case("ACTIVE") {
                statuses.extend([OrderStatus::Pending, OrderStatus::InProgress]);
            } else {
                statuses.push(part.parse()?);
            }
        }
        statuses.dedup();
        Ok(statuses)
    }
}

/// Filtros de estadísticas, sobre la fecha de finalización
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsFilters {
    #[serde(alias = "dataInicio")]
    pub date_from: Option<NaiveDate>,
    #[serde(alias = "dataFim")]
    pub date_to: Option<NaiveDate>,
    #[serde(alias = "lavadorId")]
    pub washer_id: Option<Uuid>,
    #[serde(alias = "servicoId")]
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ServiceRanking {
    pub service_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct WasherRanking {
    pub washer_id: Uuid,
    pub name: String,
    pub order_count: i64,
    pub total_value: Decimal,
    pub total_commission: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_value: Decimal,
    pub average_ticket: Decimal,
    /// Porcentaje de órdenes finalizadas sobre las creadas en el período
    pub completion_rate: Decimal,
    pub top_services: Vec<ServiceRanking>,
    pub top_washers: Vec<WasherRanking>,
    pub paid_by_method: Vec<MethodTotal>,
    pub pending_value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(status: &str) -> OrderFilters {
        OrderFilters {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn active_expands_to_open_states() {
        assert_eq!(
            with_status("ACTIVE").statuses().unwrap(),
            vec![OrderStatus::Pending, OrderStatus::InProgress]
        );
    }

    #[test]
    fn comma_lists_are_parsed() {
        assert_eq!(
            with_status("FINALIZED, cancelled").statuses().unwrap(),
            vec![OrderStatus::Finalized, OrderStatus::Cancelled]
        );
        assert!(with_status("FINALIZED,DONE").statuses().is_err());
        assert!(OrderFilters::default().statuses().unwrap().is_empty());
    }

    fn item(quantity: i32) -> OrderItemInput {
        OrderItemInput {
            kind: ItemKind::Service,
            item_id: Uuid::nil(),
            quantity,
        }
    }

    fn update_with(items: Option<Vec<OrderItemInput>>) -> UpdateOrderRequest {
        UpdateOrderRequest {
            status: None,
            washer_id: None,
            notes: None,
            items,
        }
    }

    #[test]
    fn update_rejects_bad_quantities_and_empty_lists() {
        assert!(update_with(Some(vec![item(-3)])).validate().is_err());
        assert!(update_with(Some(vec![item(2), item(0)])).validate().is_err());
        assert!(update_with(Some(vec![item(1_000)])).validate().is_err());
        assert!(update_with(Some(vec![])).validate().is_err());
        assert!(update_with(Some(vec![item(2)])).validate().is_ok());
        assert!(update_with(None).validate().is_ok());
    }

    #[test]
    fn create_checks_every_item() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer_id": Uuid::nil(),
            "vehicle_id": Uuid::nil(),
            "items": [{"kind": "ADDON", "item_id": Uuid::nil(), "quantity": 0}]
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let filters = OrderFilters {
            page: Some(i64::MAX),
            limit: Some(50),
            ..Default::default()
        };
        assert!(filters.offset() > 0);
    }

    #[test]
    fn request_accepts_original_field_names() {
        let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clienteId": Uuid::nil(),
            "veiculoId": Uuid::nil(),
            "itens": [{"tipo": "SERVICE", "itemId": Uuid::nil(), "quantidade": 2}],
            "forcarCriacao": true
        }))
        .unwrap();

        assert!(request.force);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.items[0].kind, ItemKind::Service);
    }
}
