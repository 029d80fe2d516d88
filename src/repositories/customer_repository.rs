use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::PageQuery;
use crate::models::customer::Customer;
use crate::utils::errors::AppError;

pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        conn: &mut PgConnection,
        company_id: Uuid,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Customer, AppError> {
        let now = Utc::now();
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, company_id, name, phone, email, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(customer)
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Customer, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, company_id, name, phone, email).await
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, company_id, id).await
    }

    pub async fn find_in(
        conn: &mut PgConnection,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    /// Cliente con el mismo nombre y teléfono, para reutilizar en órdenes
    pub async fn find_by_name_and_phone(
        conn: &mut PgConnection,
        company_id: Uuid,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE company_id = $1 AND name = $2 AND phone IS NOT DISTINCT FROM $3
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(phone)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    pub async fn find_by_plate(&self, company_id: Uuid, plate: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT c.* FROM customers c
            JOIN vehicles v ON v.customer_id = c.id
            WHERE c.company_id = $1 AND v.plate = $2
            "#,
        )
        .bind(company_id)
        .bind(plate)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list(&self, company_id: Uuid, query: &PageQuery) -> Result<(Vec<Customer>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers c");
        push_filters(&mut count, company_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT c.* FROM customers c");
        push_filters(&mut select, company_id, query);
        select
            .push(" ORDER BY c.name LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());
        let customers = select
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        Ok((customers, total))
    }

    /// Teléfono o e-mail ya usado por otro cliente de la empresa
    pub async fn contact_exists(
        &self,
        company_id: Uuid,
        phone: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        if phone.is_none() && email.is_none() {
            return Ok(false);
        }

        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM customers
                WHERE company_id = $1
                AND (($2::text IS NOT NULL AND phone = $2) OR ($3::text IS NOT NULL AND LOWER(email) = LOWER($3)))
                AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(company_id)
        .bind(phone)
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        current: Customer,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        active: Option<bool>,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, email = $4, active = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(name.unwrap_or(current.name))
        .bind(phone.or(current.phone))
        .bind(email.or(current.email))
        .bind(active.unwrap_or(current.active))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Vehículos u órdenes que impiden borrar el cliente
    pub async fn has_dependents(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM vehicles WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM orders WHERE customer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, query: &PageQuery) {
    builder.push(" WHERE c.company_id = ").push_bind(company_id);

    if let Some(pattern) = query.search_pattern() {
        builder
            .push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(active) = query.active {
        builder.push(" AND c.active = ").push_bind(active);
    }
}
