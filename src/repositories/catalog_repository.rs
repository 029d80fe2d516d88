//! Repositorio de servicios y adicionales
//!
//! Las dos tablas tienen la misma forma; `ItemKind` elige los nombres.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::catalog_dto::PriceEntry;
use crate::dto::common::PageQuery;
use crate::models::catalog::{CatalogItem, CatalogPrice};
use crate::models::order::ItemKind;
use crate::utils::errors::AppError;

pub struct CatalogRepository {
    pool: PgPool,
    kind: ItemKind,
}

impl CatalogRepository {
    pub fn new(pool: PgPool, kind: ItemKind) -> Self {
        Self { pool, kind }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        kind: ItemKind,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
        duration_minutes: Option<i32>,
        price: Option<Decimal>,
    ) -> Result<CatalogItem, AppError> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, company_id, name, description, duration_minutes, price, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            RETURNING *
            "#,
            kind.table()
        );

        let item = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(name)
            .bind(description)
            .bind(duration_minutes)
            .bind(price)
            .bind(Utc::now())
            .fetch_one(conn)
            .await?;

        Ok(item)
    }

    /// Reemplaza la tabla de precios completa del ítem
    pub async fn replace_prices(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_id: Uuid,
        prices: &[PriceEntry],
    ) -> Result<(), AppError> {
        let delete = format!("DELETE FROM {} WHERE {} = $1", kind.prices_table(), kind.item_column());
        sqlx::query(&delete).bind(item_id).execute(&mut *conn).await?;

        if prices.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}, vehicle_type_id, price) ",
            kind.prices_table(),
            kind.item_column()
        ));
        builder.push_values(prices, |mut row, entry| {
            row.push_bind(item_id)
                .push_bind(entry.vehicle_type_id)
                .push_bind(entry.price);
        });
        builder.build().execute(&mut *conn).await?;

        Ok(())
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<CatalogItem>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, self.kind, company_id, id).await
    }

    pub async fn find_in(
        conn: &mut PgConnection,
        kind: ItemKind,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CatalogItem>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND company_id = $2", kind.table());
        let item = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(conn)
            .await?;

        Ok(item)
    }

    pub async fn prices_in(
        conn: &mut PgConnection,
        kind: ItemKind,
        item_ids: &[Uuid],
    ) -> Result<Vec<CatalogPrice>, AppError> {
        let sql = format!(
            "SELECT {} AS item_id, vehicle_type_id, price FROM {} WHERE {} = ANY($1)",
            kind.item_column(),
            kind.prices_table(),
            kind.item_column()
        );
        let prices = sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(item_ids)
            .fetch_all(conn)
            .await?;

        Ok(prices)
    }

    pub async fn prices_for(&self, item_ids: &[Uuid]) -> Result<Vec<CatalogPrice>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::prices_in(&mut conn, self.kind, item_ids).await
    }

    pub async fn list(&self, company_id: Uuid, query: &PageQuery) -> Result<(Vec<CatalogItem>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} i", self.kind.table()));
        push_filters(&mut count, company_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT i.* FROM {} i", self.kind.table()));
        push_filters(&mut select, company_id, query);
        select
            .push(" ORDER BY i.name LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());
        let items = select
            .build_query_as::<CatalogItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    pub async fn list_active(&self, company_id: Uuid) -> Result<Vec<CatalogItem>, AppError> {
        let sql = format!(
            "SELECT * FROM {} WHERE company_id = $1 AND active = TRUE ORDER BY name",
            self.kind.table()
        );
        let items = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Cantidad de ítems de orden que referencian cada id
    pub async fn usage_counts(&self, item_ids: &[Uuid]) -> Result<Vec<(Uuid, i64)>, AppError> {
        let column = self.kind.item_column();
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM order_items WHERE {column} = ANY($1) GROUP BY {column}"
        );
        let counts = sqlx::query_as::<_, (Uuid, i64)>(&sql)
            .bind(item_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(counts)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        conn: &mut PgConnection,
        kind: ItemKind,
        current: CatalogItem,
        name: Option<String>,
        description: Option<String>,
        duration_minutes: Option<i32>,
        price: Option<Decimal>,
        active: Option<bool>,
    ) -> Result<CatalogItem, AppError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET name = $2, description = $3, duration_minutes = $4, price = $5, active = $6
            WHERE id = $1
            RETURNING *
            "#,
            kind.table()
        );

        let item = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(current.id)
            .bind(name.unwrap_or(current.name))
            .bind(description.or(current.description))
            .bind(duration_minutes.or(current.duration_minutes))
            .bind(price.or(current.price))
            .bind(active.unwrap_or(current.active))
            .fetch_one(conn)
            .await?;

        Ok(item)
    }

    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM order_items WHERE {} = $1)",
            self.kind.item_column()
        );
        let result: (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;

        Ok(result.0)
    }

    /// La tabla de precios se borra en cascada
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.kind.table());
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, query: &PageQuery) {
    builder.push(" WHERE i.company_id = ").push_bind(company_id);

    if let Some(pattern) = query.search_pattern() {
        builder
            .push(" AND (i.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(active) = query.active {
        builder.push(" AND i.active = ").push_bind(active);
    }
}
