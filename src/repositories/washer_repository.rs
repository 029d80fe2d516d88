use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::PageQuery;
use crate::models::washer::{Washer, WasherWithStats};
use crate::utils::errors::AppError;

pub struct WasherRepository {
    pool: PgPool,
}

impl WasherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, company_id: Uuid, name: &str, commission: Decimal) -> Result<Washer, AppError> {
        let washer = sqlx::query_as::<_, Washer>(
            r#"
            INSERT INTO washers (id, company_id, name, commission, active, created_at)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(name)
        .bind(commission)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(washer)
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Washer>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, company_id, id).await
    }

    pub async fn find_in(
        conn: &mut PgConnection,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Washer>, AppError> {
        let washer = sqlx::query_as::<_, Washer>(
            "SELECT * FROM washers WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;

        Ok(washer)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        query: &PageQuery,
    ) -> Result<(Vec<WasherWithStats>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM washers w");
        push_filters(&mut count, company_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT w.*, (SELECT COUNT(*) FROM orders o WHERE o.washer_id = w.id) AS order_count FROM washers w",
        );
        push_filters(&mut select, company_id, query);
        select
            .push(" ORDER BY w.name LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());
        let washers = select
            .build_query_as::<WasherWithStats>()
            .fetch_all(&self.pool)
            .await?;

        Ok((washers, total))
    }

    /// Lavadores activos para selects
    pub async fn list_active(&self, company_id: Uuid) -> Result<Vec<Washer>, AppError> {
        let washers = sqlx::query_as::<_, Washer>(
            "SELECT * FROM washers WHERE company_id = $1 AND active = TRUE ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(washers)
    }

    pub async fn update(
        &self,
        current: Washer,
        name: Option<String>,
        commission: Option<Decimal>,
        active: Option<bool>,
    ) -> Result<Washer, AppError> {
        let washer = sqlx::query_as::<_, Washer>(
            "UPDATE washers SET name = $2, commission = $3, active = $4 WHERE id = $1 RETURNING *",
        )
        .bind(current.id)
        .bind(name.unwrap_or(current.name))
        .bind(commission.unwrap_or(current.commission))
        .bind(active.unwrap_or(current.active))
        .fetch_one(&self.pool)
        .await?;

        Ok(washer)
    }

    pub async fn has_orders(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM orders WHERE washer_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM washers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, query: &PageQuery) {
    builder.push(" WHERE w.company_id = ").push_bind(company_id);

    if let Some(pattern) = query.search_pattern() {
        builder.push(" AND w.name ILIKE ").push_bind(pattern);
    }

    if let Some(active) = query.active {
        builder.push(" AND w.active = ").push_bind(active);
    }
}
