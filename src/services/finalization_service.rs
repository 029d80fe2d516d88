//! Finalización automática de órdenes
//!
//! Cada intervalo revisa las empresas activas con finalización automática.
//! Pasada la hora de cierre local, finaliza las órdenes PENDING/IN_PROGRESS,
//! crea un pago PENDING por el total de cada una y emite una notificación
//! con la cantidad. Una bandera impide que dos barridos corran a la vez.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::company::Company;
use crate::models::notification::NotificationKind;
use crate::models::order::Order;
use crate::models::payment::{PaymentMethod, PaymentStatus};
use crate::repositories::{
    company_repository::CompanyRepository, order_repository::OrderRepository,
    payment_repository::PaymentRepository,
};
use crate::services::notification_service::NotificationService;
use crate::utils::errors::AppError;

/// Hora de cierre para empresas sin horario configurado
const DEFAULT_CLOSING_TIME: &str = "19:00";
const FINALIZED_LINK: &str = "/orders?status=FINALIZED";

/// Resultado de un barrido
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub companies_checked: usize,
    pub companies_closed: usize,
    pub orders_finalized: usize,
    pub failures: usize,
}

/// Marca de barrido en curso; se libera al soltarla
struct SweepGuard<'a>(&'a AtomicBool);

impl<'a> SweepGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct FinalizationSweep {
    pool: PgPool,
    default_offset_minutes: i32,
    running: Arc<AtomicBool>,
}

impl FinalizationSweep {
    pub fn new(pool: PgPool, default_offset_minutes: i32) -> Self {
        Self {
            pool,
            default_offset_minutes,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Lanza el barrido periódico en una tarea de tokio
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("⏱️ Finalización automática cada {}s", every.as_secs());
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                match self.run_once(Utc::now()).await {
                    Some(report) if report.orders_finalized > 0 || report.failures > 0 => {
                        info!(
                            "✅ Barrido: {} empresas revisadas, {} órdenes finalizadas, {} errores",
                            report.companies_checked, report.orders_finalized, report.failures
                        );
                    }
                    Some(_) => {}
                    None => warn!("⚠️ Barrido anterior aún en curso, se omite este ciclo"),
                }
            }
        })
    }

    /// Ejecuta un barrido; `None` si ya hay uno en curso
    pub async fn run_once(&self, now: DateTime<Utc>) -> Option<SweepReport> {
        let _guard = SweepGuard::try_acquire(&self.running)?;
        let mut report = SweepReport::default();

        let companies = match CompanyRepository::new(self.pool.clone()).find_auto_finalize().await {
            Ok(companies) => companies,
            Err(e) => {
                error!("❌ Error buscando empresas para finalización automática: {}", e);
                report.failures += 1;
                return Some(report);
            }
        };

        for company in companies {
            report.companies_checked += 1;
            let offset = company.utc_offset_minutes(self.default_offset_minutes);
            if !is_past_closing(now, offset, company.closing_time.as_deref()) {
                continue;
            }

            report.companies_closed += 1;
            match self.finalize_company(&company).await {
                Ok(count) => report.orders_finalized += count,
                Err(e) => {
                    error!("❌ Error finalizando órdenes de la empresa {}: {}", company.name, e);
                    report.failures += 1;
                }
            }
        }

        Some(report)
    }

    async fn finalize_company(&self, company: &Company) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let orders = OrderRepository::finalize_active(&mut *tx, company.id).await?;
        for (order_id, amount) in pending_settlements(&orders) {
            PaymentRepository::insert(
                &mut *tx,
                order_id,
                company.id,
                PaymentMethod::Pending,
                amount,
                PaymentStatus::Pending,
                None,
            )
            .await?;
        }

        tx.commit().await?;

        if !orders.is_empty() {
            info!("🏁 {} órdenes finalizadas para la empresa {}", orders.len(), company.name);
            NotificationService::new(self.pool.clone())
                .notify(
                    company.id,
                    NotificationKind::AutoFinalization,
                    &finalization_message(orders.len()),
                    Some(FINALIZED_LINK),
                )
                .await;
        }

        Ok(orders.len())
    }
}

/// Hora local (desfase fijo) igual o posterior al cierre
pub fn is_past_closing(now: DateTime<Utc>, offset_minutes: i32, closing_time: Option<&str>) -> bool {
    let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60))
        .or_else(|| FixedOffset::east_opt(0));
    let closing = closing_time
        .and_then(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
        .or_else(|| NaiveTime::parse_from_str(DEFAULT_CLOSING_TIME, "%H:%M").ok());

    match (offset, closing) {
        (Some(offset), Some(closing)) => now.with_timezone(&offset).time() >= closing,
        _ => false,
    }
}

/// Un pago PENDING por el total de cada orden; las de total cero no generan pago
pub fn pending_settlements(orders: &[Order]) -> Vec<(Uuid, Decimal)> {
    orders
        .iter()
        .filter(|order| order.total > Decimal::ZERO)
        .map(|order| (order.id, order.total))
        .collect()
}

pub fn finalization_message(count: usize) -> String {
    if count == 1 {
        "1 orden de servicio fue finalizada automáticamente".to_string()
    } else {
        format!("{} órdenes de servicio fueron finalizadas automáticamente", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderStatus;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    #[test]
    fn closing_is_compared_in_local_time() {
        // 21:30 UTC = 18:30 en UTC-3
        assert!(!is_past_closing(utc(21, 30), -180, Some("19:00")));
        assert!(is_past_closing(utc(22, 0), -180, Some("19:00")));
        assert!(is_past_closing(utc(21, 30), -180, Some("18:30")));
    }

    #[test]
    fn missing_or_invalid_closing_defaults_to_seven_pm() {
        assert!(!is_past_closing(utc(18, 59), 0, None));
        assert!(is_past_closing(utc(19, 0), 0, None));
        assert!(is_past_closing(utc(19, 0), 0, Some("7pm")));
    }

    fn finalized(total: &str) -> Order {
        let now = utc(22, 0);
        Order {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            order_number: 1,
            customer_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            washer_id: None,
            status: OrderStatus::Finalized,
            total: total.parse().unwrap(),
            commission: Decimal::ZERO,
            paid: false,
            notes: None,
            created_at: now,
            updated_at: now,
            finished_at: Some(now),
        }
    }

    #[test]
    fn each_finalized_order_gets_one_pending_payment_for_its_total() {
        let orders = vec![finalized("80.00"), finalized("0"), finalized("45.50")];
        let settlements = pending_settlements(&orders);

        assert_eq!(
            settlements,
            vec![(orders[0].id, orders[0].total), (orders[2].id, orders[2].total)]
        );
        // Una sola notificación por empresa con la cantidad total
        assert!(finalization_message(orders.len()).starts_with("3 órdenes"));
    }

    #[test]
    fn message_is_singular_for_one_order() {
        assert_eq!(finalization_message(1), "1 orden de servicio fue finalizada automáticamente");
        assert!(finalization_message(3).starts_with("3 órdenes"));
    }

    #[test]
    fn guard_prevents_overlapping_runs() {
        let flag = AtomicBool::new(false);
        let first = SweepGuard::try_acquire(&flag);
        assert!(first.is_some());
        assert!(SweepGuard::try_acquire(&flag).is_none());

        drop(first);
        assert!(SweepGuard::try_acquire(&flag).is_some());
    }
}
