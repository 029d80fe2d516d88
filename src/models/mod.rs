//! Modelos de datos
//!
//! Structs que mapean las tablas de PostgreSQL y los enums del dominio.

pub mod catalog;
pub mod company;
pub mod customer;
pub mod notification;
pub mod order;
pub mod payment;
pub mod user;
pub mod vehicle;
pub mod vehicle_type;
pub mod washer;
