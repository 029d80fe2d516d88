//! DTOs de la API
//!
//! Requests, filtros de listados y formas de respuesta.

pub mod auth_dto;
pub mod catalog_dto;
pub mod common;
pub mod company_dto;
pub mod customer_dto;
pub mod notification_dto;
pub mod order_dto;
pub mod payment_dto;
pub mod vehicle_dto;
pub mod vehicle_type_dto;
pub mod washer_dto;
