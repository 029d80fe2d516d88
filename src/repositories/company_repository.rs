use chrono::Utc;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::company::{Company, CompanySummary};
use crate::utils::errors::AppError;

/// Campos editables de una empresa; `None` conserva el valor actual
#[derive(Debug, Default)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub config: Option<Value>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub auto_finalize: Option<bool>,
    pub require_washer_to_finalize: Option<bool>,
    pub notification_preferences: Option<Value>,
}

pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: Uuid,
        name: &str,
        config: Value,
        opening_time: Option<String>,
        closing_time: Option<String>,
        auto_finalize: bool,
        notification_preferences: Value,
    ) -> Result<Company, AppError> {
        let now = Utc::now();
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                id, user_id, name, active, config, opening_time, closing_time,
                auto_finalize, require_washer_to_finalize, notification_preferences,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, TRUE, $4, $5, $6, $7, FALSE, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(config)
        .bind(opening_time)
        .bind(closing_time)
        .bind(auto_finalize)
        .bind(notification_preferences)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(company)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    /// Empresa activa perteneciente al usuario
    pub async fn find_active_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND user_id = $2 AND active = TRUE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CompanySummary>, AppError> {
        let companies = sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT c.*,
                (SELECT COUNT(*) FROM customers cu WHERE cu.company_id = c.id) AS customer_count,
                (SELECT COUNT(*) FROM washers w WHERE w.company_id = c.id) AS washer_count,
                (SELECT COUNT(*) FROM orders o WHERE o.company_id = c.id) AS order_count
            FROM companies c
            WHERE c.user_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    pub async fn refs_for_user(&self, user_id: Uuid) -> Result<Vec<(Uuid, String)>, AppError> {
        let refs = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM companies WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(refs)
    }

    pub async fn name_exists_for_user(
        &self,
        user_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM companies
                WHERE user_id = $1 AND LOWER(name) = LOWER($2)
                AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(&self, current: Company, changes: CompanyChanges) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2, config = $3, opening_time = $4, closing_time = $5,
                auto_finalize = $6, require_washer_to_finalize = $7,
                notification_preferences = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(changes.name.unwrap_or(current.name))
        .bind(changes.config.unwrap_or(current.config))
        .bind(changes.opening_time.or(current.opening_time))
        .bind(changes.closing_time.or(current.closing_time))
        .bind(changes.auto_finalize.unwrap_or(current.auto_finalize))
        .bind(
            changes
                .require_washer_to_finalize
                .unwrap_or(current.require_washer_to_finalize),
        )
        .bind(
            changes
                .notification_preferences
                .unwrap_or(current.notification_preferences),
        )
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Company, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    /// Preferencias de notificación, `None` si la empresa no existe
    pub async fn notification_preferences(&self, id: Uuid) -> Result<Option<Value>, AppError> {
        let prefs = sqlx::query_scalar::<_, Value>(
            "SELECT notification_preferences FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prefs)
    }

    /// Empresas activas con finalización automática
    pub async fn find_auto_finalize(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE active = TRUE AND auto_finalize = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    /// Bloquea la fila de la empresa y devuelve el siguiente número de orden
    pub async fn next_order_number(conn: &mut PgConnection, company_id: Uuid) -> Result<i32, AppError> {
        sqlx::query("SELECT id FROM companies WHERE id = $1 FOR UPDATE")
            .bind(company_id)
            .execute(&mut *conn)
            .await?;

        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(order_number), 0) + 1 FROM orders WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(next)
    }
}
