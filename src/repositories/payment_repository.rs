use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::order_dto::MethodTotal;
use crate::dto::payment_dto::StatusTotal;
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::utils::errors::AppError;

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        order_id: Uuid,
        company_id: Uuid,
        method: PaymentMethod,
        amount: Decimal,
        status: PaymentStatus,
        notes: Option<&str>,
    ) -> Result<Payment, AppError> {
        let now = Utc::now();
        let paid_at = (status == PaymentStatus::Paid).then_some(now);

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, order_id, company_id, method, amount, status, notes, paid_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(company_id)
        .bind(method)
        .bind(amount)
        .bind(status)
        .bind(notes)
        .bind(paid_at)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(payment)
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;

        Ok(payment)
    }

    pub async fn list_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ANY($1) ORDER BY created_at",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Suma de pagos PAID de la orden
    pub async fn paid_sum(conn: &mut PgConnection, order_id: Uuid) -> Result<Decimal, AppError> {
        let sum = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE order_id = $1 AND status = 'PAID'",
        )
        .bind(order_id)
        .fetch_one(conn)
        .await?;

        Ok(sum)
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $2, paid_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(paid_at)
        .fetch_one(conn)
        .await?;

        Ok(payment)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn totals_by_method(
        &self,
        company_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<MethodTotal>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT p.method, COUNT(*) AS count, COALESCE(SUM(p.amount), 0) AS total FROM payments p",
        );
        push_filters(&mut builder, company_id, from, to);
        builder.push(" AND p.status = 'PAID' GROUP BY p.method ORDER BY total DESC");

        let totals = builder
            .build_query_as::<MethodTotal>()
            .fetch_all(&self.pool)
            .await?;

        Ok(totals)
    }

    pub async fn totals_by_status(
        &self,
        company_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<StatusTotal>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT p.status, COUNT(*) AS count, COALESCE(SUM(p.amount), 0) AS total FROM payments p",
        );
        push_filters(&mut builder, company_id, from, to);
        builder.push(" GROUP BY p.status ORDER BY p.status");

        let totals = builder
            .build_query_as::<StatusTotal>()
            .fetch_all(&self.pool)
            .await?;

        Ok(totals)
    }

    pub async fn pending(
        &self,
        company_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Payment>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT p.* FROM payments p");
        push_filters(&mut builder, company_id, from, to);
        builder.push(" AND p.status = 'PENDING' ORDER BY p.created_at DESC");

        let payments = builder
            .build_query_as::<Payment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    company_id: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) {
    builder.push(" WHERE p.company_id = ").push_bind(company_id);
    if let Some(from) = from {
        builder.push(" AND p.created_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        builder.push(" AND p.created_at < ").push_bind(to);
    }
}
