use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::payment_dto::{
    CreatePaymentRequest, PaymentResponse, PaymentStats, PaymentStatsFilters,
    UpdatePaymentStatusRequest,
};
use crate::models::order::OrderStatus;
use crate::models::payment::{Payment, PaymentStatus};
use crate::repositories::{
    order_repository::{day_bounds, OrderRepository},
    payment_repository::PaymentRepository,
};
use crate::services::reconciliation;
use crate::utils::errors::AppError;
use crate::utils::validation::clean_optional;

pub struct PaymentController {
    pool: PgPool,
    repository: PaymentRepository,
    orders: OrderRepository,
}

impl PaymentController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PaymentRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            pool,
        }
    }

    /// Registra el pago y concilia la orden en la misma transacción
    pub async fn create(&self, company_id: Uuid, request: CreatePaymentRequest) -> Result<PaymentResponse, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let order = OrderRepository::find_for_update(&mut tx, company_id, request.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orden no encontrada".to_string()))?;

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::BadRequest(
                "No se puede registrar un pago en una orden cancelada".to_string(),
            ));
        }

        let notes = clean_optional(request.notes);
        let payment = PaymentRepository::insert(
            &mut tx,
            order.id,
            company_id,
            request.method,
            request.amount.round_dp(2),
            request.method.initial_status(),
            notes.as_deref(),
        )
        .await?;
        let order_paid = reconciliation::reconcile(&mut tx, order.id).await?;
        tx.commit().await?;

        info!(
            "💰 Pago de {} ({:?}) registrado en la orden #{}",
            payment.amount, payment.method, order.order_number
        );

        Ok(PaymentResponse { payment, order_paid })
    }

    pub async fn list_for_order(&self, company_id: Uuid, order_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let order = self
            .orders
            .find_by_id(company_id, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orden no encontrada".to_string()))?;

        self.repository.list_for_orders(&[order.id]).await
    }

    pub async fn update_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<PaymentResponse, AppError> {
        let mut tx = self.pool.begin().await?;
        let current = PaymentRepository::find_for_update(&mut tx, company_id, id)
            .await?
            .ok_or_else(payment_not_found)?;

        let paid_at = match request.status {
            PaymentStatus::Paid => current.paid_at.or_else(|| Some(Utc::now())),
            _ => None,
        };

        let payment = PaymentRepository::update_status(&mut tx, current.id, request.status, paid_at).await?;
        let order_paid = reconciliation::reconcile(&mut tx, payment.order_id).await?;
        tx.commit().await?;

        Ok(PaymentResponse { payment, order_paid })
    }

    /// Borra el pago; devuelve el estado de pago resultante de la orden
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let payment = PaymentRepository::find_for_update(&mut tx, company_id, id)
            .await?
            .ok_or_else(payment_not_found)?;

        PaymentRepository::delete(&mut tx, payment.id).await?;
        let order_paid = reconciliation::reconcile(&mut tx, payment.order_id).await?;
        tx.commit().await?;

        Ok(order_paid)
    }

    pub async fn stats(&self, company_id: Uuid, filters: PaymentStatsFilters) -> Result<PaymentStats, AppError> {
        let (from, to) = day_bounds(filters.date_from, filters.date_to);

        Ok(PaymentStats {
            by_method: self.repository.totals_by_method(company_id, from, to).await?,
            by_status: self.repository.totals_by_status(company_id, from, to).await?,
            pending: self.repository.pending(company_id, from, to).await?,
        })
    }
}

fn payment_not_found() -> AppError {
    AppError::NotFound("Pago no encontrado".to_string())
}
