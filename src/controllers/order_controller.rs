//! Órdenes de servicio
//!
//! Creación y edición corren en una sola transacción: cliente y vehículo
//! en línea, precios del catálogo, totales, comisión y conciliación.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{Paginated, Pagination};
use crate::dto::order_dto::{
    CreateOrderRequest, OrderDetail, OrderFilters, OrderItemInput, OrderStats, StatsFilters,
    UpdateOrderRequest,
};
use crate::models::customer::Customer;
use crate::models::notification::NotificationKind;
use crate::models::order::{OrderItem, OrderRow, OrderStatus};
use crate::models::payment::Payment;
use crate::models::vehicle::Vehicle;
use crate::models::washer::Washer;
use crate::repositories::{
    catalog_repository::CatalogRepository,
    company_repository::CompanyRepository,
    customer_repository::CustomerRepository,
    order_repository::{NewOrder, OrderRepository},
    payment_repository::PaymentRepository,
    vehicle_repository::VehicleRepository,
    vehicle_type_repository::VehicleTypeRepository,
    washer_repository::WasherRepository,
};
use crate::services::notification_service::NotificationService;
use crate::services::pricing::{self, PricedLine};
use crate::services::reconciliation;
use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::{checked_plate, clean_optional, MAX_AMOUNT};

pub struct OrderController {
    pool: PgPool,
    repository: OrderRepository,
    payments: PaymentRepository,
    companies: CompanyRepository,
    vehicle_types: VehicleTypeRepository,
    notifications: NotificationService,
}

impl OrderController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OrderRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool.clone()),
            vehicle_types: VehicleTypeRepository::new(pool.clone()),
            notifications: NotificationService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, company_id: Uuid, request: CreateOrderRequest) -> Result<OrderDetail, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let customer = resolve_customer(&mut tx, company_id, &request).await?;
        let vehicle = self
            .resolve_vehicle(&mut tx, company_id, customer.id, &request)
            .await?;

        let has_active = OrderRepository::has_active_for_vehicle(&mut tx, company_id, vehicle.id, None).await?;
        ensure_no_active_order(has_active, request.force)?;

        let washer = match request.washer_id {
            Some(washer_id) => Some(active_washer(&mut tx, company_id, washer_id).await?),
            None => None,
        };

        let lines = price_lines(&mut tx, company_id, &request.items, vehicle.vehicle_type_id).await?;
        let total = checked_total(&lines)?;
        let commission = pricing::commission(total, washer.as_ref().map(|w| w.commission));

        let order_number = CompanyRepository::next_order_number(&mut tx, company_id).await?;
        let order = OrderRepository::insert(
            &mut tx,
            NewOrder {
                company_id,
                order_number,
                customer_id: customer.id,
                vehicle_id: vehicle.id,
                washer_id: washer.as_ref().map(|w| w.id),
                status: pricing::initial_status(washer.is_some()),
                total,
                commission,
                notes: clean_optional(request.notes),
            },
        )
        .await?;
        OrderRepository::insert_items(&mut tx, order.id, &lines).await?;

        tx.commit().await?;
        info!(
            "🧾 Orden #{} creada para la empresa {} (total {})",
            order.order_number, company_id, order.total
        );

        self.notifications
            .notify(
                company_id,
                NotificationKind::OrderCreated,
                &format!("Nueva orden #{} para {}", order.order_number, vehicle.plate),
                Some(&order_link(order.id)),
            )
            .await;

        self.get(company_id, order.id).await
    }

    pub async fn list(&self, company_id: Uuid, filters: OrderFilters) -> Result<Paginated<OrderDetail>, AppError> {
        let statuses = filters.statuses().map_err(AppError::BadRequest)?;
        let (rows, total) = self.repository.list(company_id, &filters, &statuses).await?;
        let details = self.with_children(rows).await?;

        Ok(Paginated {
            items: details,
            pagination: Pagination::new(filters.page(), filters.limit(), total),
        })
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<OrderDetail, AppError> {
        let row = self
            .repository
            .find_row(company_id, id)
            .await?
            .ok_or_else(order_not_found)?;

        let mut details = self.with_children(vec![row]).await?;
        details.pop().ok_or_else(order_not_found)
    }

    /// Edita estado, lavador, notas e ítems; recalcula y concilia
    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderDetail, AppError> {
        request.validate()?;

        let company = self
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Empresa no encontrada".to_string()))?;

        let mut tx = self.pool.begin().await?;
        let mut order = OrderRepository::find_for_update(&mut tx, company_id, id)
            .await?
            .ok_or_else(order_not_found)?;

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::BadRequest(
                "No se puede editar una orden cancelada".to_string(),
            ));
        }

        let mut recalculate = false;

        if let Some(items) = &request.items {
            let vehicle = VehicleRepository::find_in(&mut tx, company_id, order.vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
            let lines = price_lines(&mut tx, company_id, items, vehicle.vehicle_type_id).await?;

            OrderRepository::delete_items(&mut tx, order.id).await?;
            OrderRepository::insert_items(&mut tx, order.id, &lines).await?;
            order.total = checked_total(&lines)?;
            recalculate = true;
        }

        if let Some(washer_id) = request.washer_id {
            if order.washer_id != Some(washer_id) {
                active_washer(&mut tx, company_id, washer_id).await?;
                order.washer_id = Some(washer_id);
                recalculate = true;

                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::InProgress;
                }
            }
        }

        if let Some(next) = request.status {
            if next != order.status {
                if !order.status.can_transition_to(next) {
                    return Err(AppError::BadRequest(format!(
                        "No se puede cambiar el estado de {} a {}",
                        order.status.as_str(),
                        next.as_str()
                    )));
                }

                if next == OrderStatus::Finalized {
                    if company.require_washer_to_finalize && order.washer_id.is_none() {
                        return Err(AppError::BadRequest(
                            "Asigne un lavador antes de finalizar la orden".to_string(),
                        ));
                    }
                    order.finished_at = Some(Utc::now());
                    recalculate = true;
                }

                order.status = next;
            }
        }

        if let Some(notes) = request.notes {
            order.notes = clean_optional(Some(notes));
        }

        if recalculate {
            let percentage = match order.washer_id {
                Some(washer_id) => WasherRepository::find_in(&mut tx, company_id, washer_id)
                    .await?
                    .map(|w| w.commission),
                None => None,
            };
            order.commission = pricing::commission(order.total, percentage);
        }

        let order = OrderRepository::save(&mut tx, &order).await?;
        reconciliation::reconcile(&mut tx, order.id).await?;
        tx.commit().await?;

        self.notifications
            .notify(
                company_id,
                NotificationKind::OrderUpdated,
                &format!("Orden #{} actualizada ({})", order.order_number, order.status.as_str()),
                Some(&order_link(order.id)),
            )
            .await;

        self.get(company_id, order.id).await
    }

    pub async fn cancel(&self, company_id: Uuid, id: Uuid) -> Result<OrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut order = OrderRepository::find_for_update(&mut tx, company_id, id)
            .await?
            .ok_or_else(order_not_found)?;

        ensure_cancellable(order.status)?;

        order.status = OrderStatus::Cancelled;
        let order = OrderRepository::save(&mut tx, &order).await?;
        tx.commit().await?;
        info!("🚫 Orden #{} cancelada", order.order_number);

        self.notifications
            .notify(
                company_id,
                NotificationKind::OrderUpdated,
                &format!("Orden #{} cancelada", order.order_number),
                Some(&order_link(order.id)),
            )
            .await;

        self.get(company_id, order.id).await
    }

    /// Borra la orden con sus ítems y pagos
    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let order = OrderRepository::find_for_update(&mut tx, company_id, id)
            .await?
            .ok_or_else(order_not_found)?;

        OrderRepository::delete(&mut tx, order.id).await?;
        tx.commit().await?;
        info!("🗑️ Orden #{} eliminada", order.order_number);

        self.notifications
            .notify(
                company_id,
                NotificationKind::OrderDeleted,
                &format!("Orden #{} eliminada", order.order_number),
                None,
            )
            .await;

        Ok(())
    }

    pub async fn stats(&self, company_id: Uuid, filters: StatsFilters) -> Result<OrderStats, AppError> {
        let totals = self.repository.finalized_totals(company_id, &filters).await?;
        let created = self.repository.created_count(company_id, &filters).await?;

        Ok(OrderStats {
            total_orders: totals.total_orders,
            total_value: totals.total_value,
            average_ticket: average_ticket(totals.total_value, totals.total_orders),
            completion_rate: completion_rate(totals.total_orders, created),
            top_services: self.repository.top_services(company_id, &filters).await?,
            top_washers: self.repository.top_washers(company_id, &filters).await?,
            paid_by_method: self.repository.paid_by_method(company_id, &filters).await?,
            pending_value: self.repository.pending_value(company_id, &filters).await?,
        })
    }

    /// Vehículo existente o creado en línea; siempre de la empresa
    async fn resolve_vehicle(
        &self,
        conn: &mut PgConnection,
        company_id: Uuid,
        customer_id: Uuid,
        request: &CreateOrderRequest,
    ) -> Result<Vehicle, AppError> {
        if let Some(vehicle_id) = request.vehicle_id {
            let vehicle = VehicleRepository::find_in(&mut *conn, company_id, vehicle_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

            if vehicle.customer_id != customer_id {
                return Err(AppError::BadRequest(
                    "El vehículo no pertenece al cliente".to_string(),
                ));
            }
            return Ok(vehicle);
        }

        let Some(new_vehicle) = &request.new_vehicle else {
            return Err(validation_error(
                "vehicle_id",
                "Informe un vehículo o los datos de un vehículo nuevo",
            ));
        };

        let plate = checked_plate(&new_vehicle.plate)?;
        if let Some(owned) = VehicleRepository::find_owned_by_plate(&mut *conn, &plate).await? {
            if owned.company_id != company_id {
                return Err(AppError::Conflict(
                    "La placa ya está registrada en otra empresa".to_string(),
                ));
            }
            return Ok(owned.vehicle);
        }

        if let Some(type_id) = new_vehicle.vehicle_type_id {
            if self.vehicle_types.count_owned(company_id, &[type_id]).await? != 1 {
                return Err(AppError::BadRequest("Tipo de vehículo inválido".to_string()));
            }
        }

        let model = clean_optional(new_vehicle.model.clone());
        let color = clean_optional(new_vehicle.color.clone());
        VehicleRepository::insert(
            conn,
            customer_id,
            new_vehicle.vehicle_type_id,
            &plate,
            model.as_deref(),
            color.as_deref(),
            None,
        )
        .await
    }

    async fn with_children(&self, rows: Vec<OrderRow>) -> Result<Vec<OrderDetail>, AppError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.order.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = group_by_order(self.repository.items_for(&ids).await?, |i: &OrderItem| i.order_id);
        let mut payments =
            group_by_order(self.payments.list_for_orders(&ids).await?, |p: &Payment| p.order_id);

        Ok(rows
            .into_iter()
            .map(|row| OrderDetail {
                items: items.remove(&row.order.id).unwrap_or_default(),
                payments: payments.remove(&row.order.id).unwrap_or_default(),
                order: row,
            })
            .collect())
    }
}

/// Cliente existente, o reutilizado/creado por nombre y teléfono
async fn resolve_customer(
    conn: &mut PgConnection,
    company_id: Uuid,
    request: &CreateOrderRequest,
) -> Result<Customer, AppError> {
    if let Some(customer_id) = request.customer_id {
        return CustomerRepository::find_in(conn, company_id, customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente no encontrado".to_string()));
    }

    let Some(new_customer) = &request.new_customer else {
        return Err(validation_error(
            "customer_id",
            "Informe un cliente o los datos de un cliente nuevo",
        ));
    };

    let name = new_customer.name.trim();
    let phone = clean_optional(new_customer.phone.clone());

    if let Some(existing) =
        CustomerRepository::find_by_name_and_phone(&mut *conn, company_id, name, phone.as_deref()).await?
    {
        return Ok(existing);
    }

    CustomerRepository::insert(conn, company_id, name, phone.as_deref(), None).await
}

async fn active_washer(conn: &mut PgConnection, company_id: Uuid, washer_id: Uuid) -> Result<Washer, AppError> {
    WasherRepository::find_in(conn, company_id, washer_id)
        .await?
        .filter(|washer| washer.active)
        .ok_or_else(|| AppError::NotFound("Lavador no encontrado o inactivo".to_string()))
}

/// Resuelve el precio de cada línea con la categoría del vehículo
async fn price_lines(
    conn: &mut PgConnection,
    company_id: Uuid,
    items: &[OrderItemInput],
    vehicle_type_id: Option<Uuid>,
) -> Result<Vec<PricedLine>, AppError> {
    let mut lines = Vec::with_capacity(items.len());

    for input in items {
        let kind = input.kind;
        let item = CatalogRepository::find_in(&mut *conn, kind, company_id, input.item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} no encontrado", kind.label())))?;

        if !item.active {
            return Err(AppError::BadRequest(format!(
                "{} inactivo: {}",
                kind.label(),
                item.name
            )));
        }

        let prices = CatalogRepository::prices_in(&mut *conn, kind, &[item.id]).await?;
        let unit_price = pricing::resolve_unit_price(item.id, item.price, &prices, vehicle_type_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "{} sin precio para esta categoría de vehículo: {}",
                    kind.label(),
                    item.name
                ))
            })?;

        lines.push(PricedLine::new(kind, item.id, input.quantity, unit_price));
    }

    Ok(lines)
}

fn group_by_order<T>(values: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for value in values {
        grouped.entry(key(&value)).or_default().push(value);
    }
    grouped
}

/// Una orden activa por vehículo, salvo creación forzada
pub fn ensure_no_active_order(has_active: bool, force: bool) -> Result<(), AppError> {
    if has_active && !force {
        return Err(AppError::ActiveOrderExists);
    }
    Ok(())
}

pub fn ensure_cancellable(status: OrderStatus) -> Result<(), AppError> {
    if !status.is_terminal() {
        return Ok(());
    }
    let state = if status == OrderStatus::Finalized { "finalizada" } else { "cancelada" };
    Err(AppError::BadRequest(format!("La orden ya está {}", state)))
}

/// Total de las líneas, dentro del rango de la columna
pub fn checked_total(lines: &[PricedLine]) -> Result<Decimal, AppError> {
    let total = pricing::order_total(lines);
    if total > MAX_AMOUNT {
        return Err(validation_error("items", "El total de la orden excede el máximo permitido"));
    }
    Ok(total)
}

fn order_not_found() -> AppError {
    AppError::NotFound("Orden no encontrada".to_string())
}

fn order_link(id: Uuid) -> String {
    format!("/orders/{}", id)
}

pub fn average_ticket(total_value: Decimal, total_orders: i64) -> Decimal {
    if total_orders == 0 {
        return Decimal::ZERO;
    }
    (total_value / Decimal::from(total_orders)).round_dp(2)
}

/// Finalizadas sobre creadas no canceladas, en porcentaje (tope 100)
pub fn completion_rate(finalized: i64, created: i64) -> Decimal {
    if created == 0 {
        return Decimal::ZERO;
    }
    let rate = Decimal::from(finalized) * Decimal::ONE_HUNDRED / Decimal::from(created);
    rate.min(Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn active_order_blocks_creation_unless_forced() {
        assert!(matches!(ensure_no_active_order(true, false), Err(AppError::ActiveOrderExists)));
        assert!(ensure_no_active_order(true, true).is_ok());
        assert!(ensure_no_active_order(false, false).is_ok());
    }

    #[test]
    fn only_open_orders_can_be_cancelled() {
        for status in [OrderStatus::Finalized, OrderStatus::Cancelled] {
            let err = ensure_cancellable(status).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
        assert!(ensure_cancellable(OrderStatus::Pending).is_ok());
        assert!(ensure_cancellable(OrderStatus::InProgress).is_ok());
    }

    #[test]
    fn totals_beyond_the_column_range_are_rejected() {
        let huge = vec![
            PricedLine::new(crate::models::order::ItemKind::Service, Uuid::new_v4(), 999, dec("9999999999.99")),
        ];
        assert!(matches!(checked_total(&huge), Err(AppError::Validation(_))));

        let normal = vec![PricedLine::new(crate::models::order::ItemKind::Service, Uuid::new_v4(), 1, dec("80.00"))];
        assert_eq!(checked_total(&normal).unwrap(), dec("80.00"));
    }

    #[test]
    fn average_ticket_handles_empty_periods() {
        assert_eq!(average_ticket(Decimal::ZERO, 0), Decimal::ZERO);
        assert_eq!(average_ticket(dec("250.00"), 3), dec("83.33"));
    }

    #[test]
    fn completion_rate_is_a_capped_percentage() {
        assert_eq!(completion_rate(0, 0), Decimal::ZERO);
        assert_eq!(completion_rate(3, 4), dec("75"));
        assert_eq!(completion_rate(5, 4), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn grouping_keeps_order_within_each_key() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let grouped = group_by_order(vec![(a, 1), (b, 2), (a, 3)], |v| v.0);

        assert_eq!(grouped[&a], vec![(a, 1), (a, 3)]);
        assert_eq!(grouped[&b], vec![(b, 2)]);
    }
}
