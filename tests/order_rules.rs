//! Reglas de una orden de punta a punta, sin base de datos:
//! precio, comisión, estado inicial, orden activa, pago y cancelación.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use carwash_backend::{
    controllers::order_controller::{checked_total, ensure_cancellable, ensure_no_active_order},
    models::order::{ItemKind, OrderStatus},
    services::{
        pricing::{self, PricedLine},
        reconciliation::is_fully_paid,
    },
    utils::validation::validate_positive_amount,
};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn washer_order_is_priced_started_and_settled() {
    let wash = Uuid::new_v4();
    let joe_commission = dec("25");

    let unit_price = pricing::resolve_unit_price(wash, Some(dec("80.00")), &[], None).unwrap();
    let lines = vec![PricedLine::new(ItemKind::Service, wash, 1, unit_price)];
    let total = checked_total(&lines).unwrap();

    assert_eq!(total, dec("80.00"));
    assert_eq!(pricing::commission(total, Some(joe_commission)), dec("20.00"));
    assert_eq!(pricing::initial_status(true), OrderStatus::InProgress);

    // Un pago PAID de 80.00 cubre la orden
    assert!(validate_positive_amount(&dec("80.00")).is_ok());
    assert!(!is_fully_paid(total, Decimal::ZERO));
    assert!(is_fully_paid(total, dec("80.00")));
}

#[test]
fn second_open_order_for_the_same_vehicle_conflicts() {
    let err = ensure_no_active_order(true, false).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert!(ensure_no_active_order(true, true).is_ok());
}

#[test]
fn closed_orders_cannot_be_cancelled_again() {
    for status in [OrderStatus::Finalized, OrderStatus::Cancelled] {
        assert_eq!(ensure_cancellable(status).unwrap_err().status_code(), StatusCode::BAD_REQUEST);
    }
    assert!(ensure_cancellable(OrderStatus::InProgress).is_ok());
}
