//! Repositorios
//!
//! Acceso a PostgreSQL con SQLx, un repositorio por entidad.

pub mod catalog_repository;
pub mod company_repository;
pub mod customer_repository;
pub mod notification_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod user_repository;
pub mod vehicle_repository;
pub mod vehicle_type_repository;
pub mod washer_repository;
