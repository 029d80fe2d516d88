use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::order_dto::MethodTotal;
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::utils::validation::validate_positive_amount;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[serde(alias = "ordemId")]
    pub order_id: Uuid,
    #[serde(alias = "metodo")]
    pub method: PaymentMethod,
    #[serde(alias = "valor")]
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[serde(alias = "observacoes")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentStatsFilters {
    #[serde(alias = "dataInicio")]
    pub date_from: Option<NaiveDate>,
    #[serde(alias = "dataFim")]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StatusTotal {
    pub status: PaymentStatus,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PaymentStats {
    pub by_method: Vec<MethodTotal>,
    pub by_status: Vec<StatusTotal>,
    pub pending: Vec<Payment>,
}

/// Pago registrado con el estado resultante de la orden
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub order_paid: bool,
}
