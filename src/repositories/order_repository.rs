//! Repositorio de órdenes de servicio
//!
//! Las escrituras reciben `&mut PgConnection` para correr dentro de la
//! transacción del controlador.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::order_dto::{
    MethodTotal, OrderFilters, ServiceRanking, StatsFilters, WasherRanking,
};
use crate::models::order::{Order, OrderItem, OrderRow, OrderStatus};
use crate::services::pricing::PricedLine;
use crate::utils::errors::AppError;

const ROW_SELECT: &str = r#"
    SELECT o.*,
        c.name AS customer_name, c.phone AS customer_phone,
        v.plate AS vehicle_plate, v.model AS vehicle_model, v.vehicle_type_id,
        w.name AS washer_name
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
    JOIN vehicles v ON v.id = o.vehicle_id
    LEFT JOIN washers w ON w.id = o.washer_id
"#;

const ITEM_SELECT: &str = r#"
    SELECT oi.id, oi.order_id, oi.kind, oi.service_id, oi.addon_id,
        COALESCE(s.name, a.name, '') AS name,
        oi.quantity, oi.unit_price, oi.subtotal
    FROM order_items oi
    LEFT JOIN services s ON s.id = oi.service_id
    LEFT JOIN addons a ON a.id = oi.addon_id
"#;

/// Datos de una orden nueva ya calculada
#[derive(Debug)]
pub struct NewOrder {
    pub company_id: Uuid,
    pub order_number: i32,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub washer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub commission: Decimal,
    pub notes: Option<String>,
}

/// Totales de órdenes finalizadas en el período
#[derive(Debug, Default, sqlx::FromRow)]
pub struct FinalizedTotals {
    pub total_orders: i64,
    pub total_value: Decimal,
}

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(conn: &mut PgConnection, order: NewOrder) -> Result<Order, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, company_id, order_number, customer_id, vehicle_id, washer_id,
                status, total, commission, paid, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.company_id)
        .bind(order.order_number)
        .bind(order.customer_id)
        .bind(order.vehicle_id)
        .bind(order.washer_id)
        .bind(order.status)
        .bind(order.total)
        .bind(order.commission)
        .bind(order.notes)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    pub async fn insert_items(
        conn: &mut PgConnection,
        order_id: Uuid,
        lines: &[PricedLine],
    ) -> Result<(), AppError> {
        if lines.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO order_items (id, order_id, kind, service_id, addon_id, quantity, unit_price, subtotal, created_at) ",
        );
        builder.push_values(lines, |mut row, line| {
            row.push_bind(Uuid::new_v4())
                .push_bind(order_id)
                .push_bind(line.kind)
                .push_bind(line.service_id())
                .push_bind(line.addon_id())
                .push_bind(line.quantity)
                .push_bind(line.unit_price)
                .push_bind(line.subtotal)
                .push_bind(now);
        });
        builder.build().execute(conn).await?;

        Ok(())
    }

    pub async fn delete_items(conn: &mut PgConnection, order_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Orden de la empresa con la fila bloqueada hasta el fin de la transacción
    pub async fn find_for_update(
        conn: &mut PgConnection,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(conn)
        .await?;

        Ok(order)
    }

    pub async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn find_row(&self, company_id: Uuid, id: Uuid) -> Result<Option<OrderRow>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(ROW_SELECT);
        builder
            .push(" WHERE o.company_id = ")
            .push_bind(company_id)
            .push(" AND o.id = ")
            .push_bind(id);

        let row = builder
            .build_query_as::<OrderRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        filters: &OrderFilters,
        statuses: &[OrderStatus],
    ) -> Result<(Vec<OrderRow>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*) FROM orders o
            JOIN customers c ON c.id = o.customer_id
            JOIN vehicles v ON v.id = o.vehicle_id
            "#,
        );
        push_list_filters(&mut count, company_id, filters, statuses);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(ROW_SELECT);
        push_list_filters(&mut select, company_id, filters, statuses);
        select
            .push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(filters.limit())
            .push(" OFFSET ")
            .push_bind(filters.offset());
        let rows = select
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Órdenes EN CURSO o FINALIZADAS del lavador desde `since`
    pub async fn rows_for_washer(
        &self,
        company_id: Uuid,
        washer_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<OrderRow>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(ROW_SELECT);
        builder
            .push(" WHERE o.company_id = ")
            .push_bind(company_id)
            .push(" AND o.washer_id = ")
            .push_bind(washer_id)
            .push(" AND o.created_at >= ")
            .push_bind(since)
            .push(" AND o.status IN ('IN_PROGRESS', 'FINALIZED') ORDER BY o.created_at DESC");

        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn items_for(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(ITEM_SELECT);
        builder
            .push(" WHERE oi.order_id = ANY(")
            .push_bind(order_ids.to_vec())
            .push(") ORDER BY oi.created_at");

        let items = builder
            .build_query_as::<OrderItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn has_active_for_vehicle(
        conn: &mut PgConnection,
        company_id: Uuid,
        vehicle_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM orders
                WHERE company_id = $1 AND vehicle_id = $2
                AND status IN ('PENDING', 'IN_PROGRESS')
                AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(company_id)
        .bind(vehicle_id)
        .bind(exclude_id)
        .fetch_one(conn)
        .await?;

        Ok(result.0)
    }

    /// Persistir los campos recalculados de la orden
    pub async fn save(conn: &mut PgConnection, order: &Order) -> Result<Order, AppError> {
        let saved = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET washer_id = $2, status = $3, total = $4, commission = $5, paid = $6,
                notes = $7, finished_at = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.washer_id)
        .bind(order.status)
        .bind(order.total)
        .bind(order.commission)
        .bind(order.paid)
        .bind(&order.notes)
        .bind(order.finished_at)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(saved)
    }

    pub async fn set_paid(conn: &mut PgConnection, id: Uuid, paid: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE orders SET paid = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(paid)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn total_of(conn: &mut PgConnection, id: Uuid) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>("SELECT total FROM orders WHERE id = $1")
            .bind(id)
            .fetch_one(conn)
            .await?;

        Ok(total)
    }

    /// Borra pagos, ítems y la orden
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM payments WHERE order_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Finaliza todas las órdenes activas de la empresa
    pub async fn finalize_active(conn: &mut PgConnection, company_id: Uuid) -> Result<Vec<Order>, AppError> {
        let now = Utc::now();
        let orders = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'FINALIZED', finished_at = $2, updated_at = $2
            WHERE company_id = $1 AND status IN ('PENDING', 'IN_PROGRESS')
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(now)
        .fetch_all(conn)
        .await?;

        Ok(orders)
    }

    pub async fn finalized_totals(
        &self,
        company_id: Uuid,
        filters: &StatsFilters,
    ) -> Result<FinalizedTotals, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS total_orders, COALESCE(SUM(o.total), 0) AS total_value FROM orders o",
        );
        push_stats_filters(&mut builder, company_id, filters);

        let totals = builder
            .build_query_as::<FinalizedTotals>()
            .fetch_one(&self.pool)
            .await?;

        Ok(totals)
    }

    /// Órdenes no canceladas creadas en el período, base de la tasa de finalización
    pub async fn created_count(&self, company_id: Uuid, filters: &StatsFilters) -> Result<i64, AppError> {
        let (from, to) = day_bounds(filters.date_from, filters.date_to);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders o WHERE o.company_id = ");
        builder.push_bind(company_id).push(" AND o.status <> 'CANCELLED'");
        if let Some(from) = from {
            builder.push(" AND o.created_at >= ").push_bind(from);
        }
        if let Some(to) = to {
            builder.push(" AND o.created_at < ").push_bind(to);
        }
        push_washer_service(&mut builder, filters);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn top_services(
        &self,
        company_id: Uuid,
        filters: &StatsFilters,
    ) -> Result<Vec<ServiceRanking>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT s.id AS service_id, s.name, SUM(oi.quantity)::BIGINT AS quantity,
                COALESCE(SUM(oi.subtotal), 0) AS total_value
            FROM order_items oi
            JOIN services s ON s.id = oi.service_id
            JOIN orders o ON o.id = oi.order_id
            "#,
        );
        push_stats_filters(&mut builder, company_id, filters);
        builder.push(" GROUP BY s.id, s.name ORDER BY quantity DESC, s.name LIMIT 5");

        let ranking = builder
            .build_query_as::<ServiceRanking>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ranking)
    }

    pub async fn top_washers(
        &self,
        company_id: Uuid,
        filters: &StatsFilters,
    ) -> Result<Vec<WasherRanking>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT w.id AS washer_id, w.name, COUNT(*) AS order_count,
                COALESCE(SUM(o.total), 0) AS total_value,
                COALESCE(SUM(o.commission), 0) AS total_commission
            FROM orders o
            JOIN washers w ON w.id = o.washer_id
            "#,
        );
        push_stats_filters(&mut builder, company_id, filters);
        builder.push(" GROUP BY w.id, w.name ORDER BY order_count DESC, w.name LIMIT 5");

        let ranking = builder
            .build_query_as::<WasherRanking>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ranking)
    }

    pub async fn paid_by_method(
        &self,
        company_id: Uuid,
        filters: &StatsFilters,
    ) -> Result<Vec<MethodTotal>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT p.method, COUNT(*) AS count, COALESCE(SUM(p.amount), 0) AS total
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            "#,
        );
        push_stats_filters(&mut builder, company_id, filters);
        builder.push(" AND p.status = 'PAID' GROUP BY p.method ORDER BY total DESC");

        let totals = builder
            .build_query_as::<MethodTotal>()
            .fetch_all(&self.pool)
            .await?;

        Ok(totals)
    }

    pub async fn pending_value(&self, company_id: Uuid, filters: &StatsFilters) -> Result<Decimal, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(SUM(p.amount), 0) FROM payments p JOIN orders o ON o.id = p.order_id",
        );
        push_stats_filters(&mut builder, company_id, filters);
        builder.push(" AND p.status = 'PENDING'");

        let value: Decimal = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(value)
    }
}

/// Límites UTC de un rango de días completos: [desde 00:00, hasta+1 00:00)
pub fn day_bounds(
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let start = from.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
    let end = to
        .and_then(|d| d.succ_opt())
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
    (start, end)
}

fn push_list_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    company_id: Uuid,
    filters: &OrderFilters,
    statuses: &[OrderStatus],
) {
    builder.push(" WHERE o.company_id = ").push_bind(company_id);

    if !statuses.is_empty() {
        builder.push(" AND o.status IN (");
        let mut separated = builder.separated(", ");
        for status in statuses {
            separated.push_bind(*status);
        }
        separated.push_unseparated(")");
    }

    if let Some(customer_id) = filters.customer_id {
        builder.push(" AND o.customer_id = ").push_bind(customer_id);
    }

    if let Some(washer_id) = filters.washer_id {
        builder.push(" AND o.washer_id = ").push_bind(washer_id);
    }

    let (from, to) = day_bounds(filters.date_from, filters.date_to);
    if let Some(from) = from {
        builder.push(" AND o.created_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        builder.push(" AND o.created_at < ").push_bind(to);
    }

    if let Some(method) = filters.payment_method {
        builder
            .push(" AND EXISTS(SELECT 1 FROM payments p WHERE p.order_id = o.id AND p.method = ")
            .push_bind(method)
            .push(")");
    }

    if let Some(search) = filters
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.plate ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_stats_filters(builder: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, filters: &StatsFilters) {
    builder
        .push(" WHERE o.company_id = ")
        .push_bind(company_id)
        .push(" AND o.status = 'FINALIZED'");

    let (from, to) = day_bounds(filters.date_from, filters.date_to);
    if let Some(from) = from {
        builder.push(" AND o.finished_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        builder.push(" AND o.finished_at < ").push_bind(to);
    }

    push_washer_service(builder, filters);
}

fn push_washer_service(builder: &mut QueryBuilder<'_, Postgres>, filters: &StatsFilters) {
    if let Some(washer_id) = filters.washer_id {
        builder.push(" AND o.washer_id = ").push_bind(washer_id);
    }

    if let Some(service_id) = filters.service_id {
        builder
            .push(" AND EXISTS(SELECT 1 FROM order_items si WHERE si.order_id = o.id AND si.service_id = ")
            .push_bind(service_id)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn day_bounds_cover_whole_days() {
        let from = NaiveDate::from_ymd_opt(2024, 3, 1);
        let to = NaiveDate::from_ymd_opt(2024, 3, 31);
        let (start, end) = day_bounds(from, to);

        assert_eq!(start.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2024-04-01T00:00:00+00:00");
        assert_eq!(day_bounds(None, None), (None, None));
    }

    #[test]
    fn list_filters_bind_each_status() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders o");
        let filters = OrderFilters {
            customer_id: Some(Uuid::nil()),
            ..Default::default()
        };
        push_list_filters(
            &mut builder,
            Uuid::nil(),
            &filters,
            &[OrderStatus::Pending, OrderStatus::InProgress],
        );

        let sql = builder.sql();
        assert!(sql.contains("o.status IN ($2, $3)"));
        assert!(sql.contains("o.customer_id = $4"));
        assert!(!sql.contains("ILIKE"));
    }
}
