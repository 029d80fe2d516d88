use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::common::PageQuery;
use crate::models::vehicle_type::VehicleType;
use crate::utils::errors::AppError;

pub struct VehicleTypeRepository {
    pool: PgPool,
}

impl VehicleTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        conn: &mut PgConnection,
        company_id: Uuid,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<VehicleType, AppError> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>(
            r#"
            INSERT INTO vehicle_types (id, company_id, name, category, description, active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(name)
        .bind(category)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(vehicle_type)
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<VehicleType, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, company_id, name, category, description).await
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<VehicleType>, AppError> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>(
            "SELECT * FROM vehicle_types WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle_type)
    }

    /// Cantidad de ids (distintos) que pertenecen a la empresa
    pub async fn count_owned(&self, company_id: Uuid, ids: &[Uuid]) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vehicle_types WHERE company_id = $1 AND id = ANY($2)",
        )
        .bind(company_id)
        .bind(ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list(&self, company_id: Uuid, query: &PageQuery) -> Result<(Vec<VehicleType>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicle_types vt");
        push_filters(&mut count, company_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT vt.* FROM vehicle_types vt");
        push_filters(&mut select, company_id, query);
        select
            .push(" ORDER BY vt.category NULLS FIRST, vt.name LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());
        let types = select
            .build_query_as::<VehicleType>()
            .fetch_all(&self.pool)
            .await?;

        Ok((types, total))
    }

    /// Subtipos activos de una categoría (p. ej. CARRO)
    pub async fn subtypes(&self, company_id: Uuid, category: &str) -> Result<Vec<VehicleType>, AppError> {
        let types = sqlx::query_as::<_, VehicleType>(
            r#"
            SELECT * FROM vehicle_types
            WHERE company_id = $1 AND UPPER(category) = UPPER($2) AND active = TRUE
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    pub async fn name_exists(
        &self,
        company_id: Uuid,
        name: &str,
        category: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vehicle_types
                WHERE company_id = $1 AND UPPER(name) = UPPER($2)
                AND category IS NOT DISTINCT FROM $3
                AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(category)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(
        &self,
        current: VehicleType,
        name: Option<String>,
        category: Option<String>,
        description: Option<String>,
        active: Option<bool>,
    ) -> Result<VehicleType, AppError> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>(
            r#"
            UPDATE vehicle_types
            SET name = $2, category = $3, description = $4, active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(name.unwrap_or(current.name))
        .bind(category.or(current.category))
        .bind(description.or(current.description))
        .bind(active.unwrap_or(current.active))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle_type)
    }

    /// Vehículos o tablas de precios que usan el tipo
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM vehicles WHERE vehicle_type_id = $1)
                OR EXISTS(SELECT 1 FROM service_prices WHERE vehicle_type_id = $1)
                OR EXISTS(SELECT 1 FROM addon_prices WHERE vehicle_type_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM vehicle_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, query: &PageQuery) {
    builder.push(" WHERE vt.company_id = ").push_bind(company_id);

    if let Some(pattern) = query.search_pattern() {
        builder
            .push(" AND (vt.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR vt.category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(active) = query.active {
        builder.push(" AND vt.active = ").push_bind(active);
    }
}
