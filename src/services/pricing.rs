//! Cálculo de precios, totales y comisión de órdenes
//!
//! Funciones puras: el controlador de órdenes carga los ítems del catálogo
//! y sus tablas de precios, y aquí se resuelve cada línea.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::catalog::CatalogPrice;
use crate::models::order::{ItemKind, OrderStatus};

/// Línea de orden con precio resuelto
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub kind: ItemKind,
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl PricedLine {
    pub fn new(kind: ItemKind, item_id: Uuid, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            kind,
            item_id,
            quantity,
            unit_price,
            subtotal: line_subtotal(unit_price, quantity),
        }
    }

    pub fn service_id(&self) -> Option<Uuid> {
        (self.kind == ItemKind::Service).then_some(self.item_id)
    }

    pub fn addon_id(&self) -> Option<Uuid> {
        (self.kind == ItemKind::Addon).then_some(self.item_id)
    }
}

/// Precio unitario: entrada del tipo de vehículo, si no precio fijo
pub fn resolve_unit_price(
    item_id: Uuid,
    flat_price: Option<Decimal>,
    prices: &[CatalogPrice],
    vehicle_type_id: Option<Uuid>,
) -> Option<Decimal> {
    vehicle_type_id
        .and_then(|type_id| {
            prices
                .iter()
                .find(|p| p.item_id == item_id && p.vehicle_type_id == type_id)
                .map(|p| p.price)
        })
        .or(flat_price)
}

pub fn line_subtotal(unit_price: Decimal, quantity: i32) -> Decimal {
    (unit_price * Decimal::from(quantity)).round_dp(2)
}

pub fn order_total(lines: &[PricedLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.subtotal)
        .sum::<Decimal>()
        .round_dp(2)
}

/// `total × porcentaje / 100`, cero sin lavador
pub fn commission(total: Decimal, washer_percentage: Option<Decimal>) -> Decimal {
    match washer_percentage {
        Some(pct) if pct > Decimal::ZERO => (total * pct / Decimal::ONE_HUNDRED).round_dp(2),
        _ => Decimal::ZERO,
    }
}

/// Estado inicial de una orden nueva
pub fn initial_status(has_washer: bool) -> OrderStatus {
    if has_washer {
        OrderStatus::InProgress
    } else {
        OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn category_price_wins_over_flat_price() {
        let item = Uuid::new_v4();
        let suv = Uuid::new_v4();
        let hatch = Uuid::new_v4();
        let prices = vec![CatalogPrice {
            item_id: item,
            vehicle_type_id: suv,
            price: dec("95.00"),
        }];

        assert_eq!(resolve_unit_price(item, Some(dec("60")), &prices, Some(suv)), Some(dec("95.00")));
        assert_eq!(resolve_unit_price(item, Some(dec("60")), &prices, Some(hatch)), Some(dec("60")));
        assert_eq!(resolve_unit_price(item, None, &prices, Some(hatch)), None);
        assert_eq!(resolve_unit_price(item, None, &prices, None), None);
    }

    #[test]
    fn prices_of_other_items_are_ignored() {
        let suv = Uuid::new_v4();
        let prices = vec![CatalogPrice {
            item_id: Uuid::new_v4(),
            vehicle_type_id: suv,
            price: dec("10"),
        }];
        assert_eq!(resolve_unit_price(Uuid::new_v4(), None, &prices, Some(suv)), None);
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let lines = vec![
            PricedLine::new(ItemKind::Service, Uuid::new_v4(), 1, dec("80.00")),
            PricedLine::new(ItemKind::Addon, Uuid::new_v4(), 3, dec("12.50")),
        ];
        assert_eq!(lines[1].subtotal, dec("37.50"));
        assert_eq!(order_total(&lines), dec("117.50"));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn commission_is_percentage_of_total() {
        assert_eq!(commission(dec("80.00"), Some(dec("25"))), dec("20.00"));
        assert_eq!(commission(dec("33.33"), Some(dec("10"))), dec("3.33"));
        assert_eq!(commission(dec("80.00"), Some(Decimal::ZERO)), Decimal::ZERO);
        assert_eq!(commission(dec("80.00"), None), Decimal::ZERO);
    }

    #[test]
    fn washer_assignment_starts_the_order() {
        assert_eq!(initial_status(true), OrderStatus::InProgress);
        assert_eq!(initial_status(false), OrderStatus::Pending);
    }

    #[test]
    fn line_ids_follow_kind() {
        let id = Uuid::new_v4();
        let line = PricedLine::new(ItemKind::Addon, id, 1, dec("5"));
        assert_eq!(line.addon_id(), Some(id));
        assert_eq!(line.service_id(), None);
    }
}
