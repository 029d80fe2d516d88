//! Servicios de negocio
//!
//! Lógica que no pertenece a un único repositorio: precios, conciliación
//! de pagos, notificaciones y finalización automática.

pub mod finalization_service;
pub mod notification_service;
pub mod pricing;
pub mod reconciliation;
