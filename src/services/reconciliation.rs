//! Conciliación de pagos
//!
//! Una orden está pagada cuando la suma de sus pagos PAID cubre el total.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::repositories::{order_repository::OrderRepository, payment_repository::PaymentRepository};
use crate::utils::errors::AppError;

pub fn is_fully_paid(total: Decimal, paid_sum: Decimal) -> bool {
    paid_sum >= total
}

/// Recalcula y guarda el flag `paid` de la orden dentro de la transacción
pub async fn reconcile(conn: &mut PgConnection, order_id: Uuid) -> Result<bool, AppError> {
    let total = OrderRepository::total_of(&mut *conn, order_id).await?;
    let paid_sum = PaymentRepository::paid_sum(&mut *conn, order_id).await?;
    let paid = is_fully_paid(total, paid_sum);

    OrderRepository::set_paid(&mut *conn, order_id, paid).await?;
    tracing::debug!("Orden {} conciliada: pagado {} de {}", order_id, paid_sum, total);

    Ok(paid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn paid_exactly_when_sum_covers_total() {
        assert!(is_fully_paid(dec("80.00"), dec("80.00")));
        assert!(is_fully_paid(dec("80.00"), dec("100")));
        assert!(!is_fully_paid(dec("80.00"), dec("79.99")));
        assert!(!is_fully_paid(dec("80.00"), Decimal::ZERO));
    }
}
