use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::vehicle_dto::VehicleFilters;
use crate::dto::common::PageQuery;
use crate::models::vehicle::{Vehicle, VehicleDetail};
use crate::utils::errors::AppError;

const DETAIL_SELECT: &str = r#"
    SELECT v.*, c.name AS customer_name, vt.name AS vehicle_type_name
    FROM vehicles v
    JOIN customers c ON c.id = v.customer_id
    LEFT JOIN vehicle_types vt ON vt.id = v.vehicle_type_id
"#;

/// Vehículo con la empresa dueña, resuelta por el cliente
#[derive(Debug, sqlx::FromRow)]
pub struct OwnedVehicle {
    #[sqlx(flatten)]
    pub vehicle: Vehicle,
    pub company_id: Uuid,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        customer_id: Uuid,
        vehicle_type_id: Option<Uuid>,
        plate: &str,
        model: Option<&str>,
        color: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, customer_id, vehicle_type_id, plate, model, color, year, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(vehicle_type_id)
        .bind(plate)
        .bind(model)
        .bind(color)
        .bind(year)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, company_id, id).await
    }

    pub async fn find_in(
        conn: &mut PgConnection,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT v.* FROM vehicles v
            JOIN customers c ON c.id = v.customer_id
            WHERE v.id = $1 AND c.company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;

        Ok(vehicle)
    }

    /// Buscar placa en todas las empresas
    pub async fn find_owned_by_plate(
        conn: &mut PgConnection,
        plate: &str,
    ) -> Result<Option<OwnedVehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, OwnedVehicle>(
            r#"
            SELECT v.*, c.company_id FROM vehicles v
            JOIN customers c ON c.id = v.customer_id
            WHERE v.plate = $1
            "#,
        )
        .bind(plate)
        .fetch_optional(conn)
        .await?;

        Ok(vehicle)
    }

    pub async fn plate_exists(&self, plate: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE plate = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(plate)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn find_detail(&self, company_id: Uuid, id: Uuid) -> Result<Option<VehicleDetail>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        builder
            .push(" WHERE c.company_id = ")
            .push_bind(company_id)
            .push(" AND v.id = ")
            .push_bind(id);

        let vehicle = builder
            .build_query_as::<VehicleDetail>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_detail_by_plate(
        &self,
        company_id: Uuid,
        plate: &str,
    ) -> Result<Option<VehicleDetail>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        builder
            .push(" WHERE c.company_id = ")
            .push_bind(company_id)
            .push(" AND v.plate = ")
            .push_bind(plate.to_string());

        let vehicle = builder
            .build_query_as::<VehicleDetail>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        filters: &VehicleFilters,
    ) -> Result<(Vec<VehicleDetail>, i64), AppError> {
        let page = filters.page_query();

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM vehicles v JOIN customers c ON c.id = v.customer_id",
        );
        push_filters(&mut count, company_id, filters, &page);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        push_filters(&mut select, company_id, filters, &page);
        select
            .push(" ORDER BY v.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let vehicles = select
            .build_query_as::<VehicleDetail>()
            .fetch_all(&self.pool)
            .await?;

        Ok((vehicles, total))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        current: Vehicle,
        customer_id: Option<Uuid>,
        vehicle_type_id: Option<Uuid>,
        plate: Option<String>,
        model: Option<String>,
        color: Option<String>,
        year: Option<i32>,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET customer_id = $2, vehicle_type_id = $3, plate = $4, model = $5, color = $6, year = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(customer_id.unwrap_or(current.customer_id))
        .bind(vehicle_type_id.or(current.vehicle_type_id))
        .bind(plate.unwrap_or(current.plate))
        .bind(model.or(current.model))
        .bind(color.or(current.color))
        .bind(year.or(current.year))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn has_orders(&self, id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM orders WHERE vehicle_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    company_id: Uuid,
    filters: &VehicleFilters,
    page: &PageQuery,
) {
    builder.push(" WHERE c.company_id = ").push_bind(company_id);

    if let Some(customer_id) = filters.customer_id {
        builder.push(" AND v.customer_id = ").push_bind(customer_id);
    }

    if let Some(pattern) = page.search_pattern() {
        builder
            .push(" AND (v.plate ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.model ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
