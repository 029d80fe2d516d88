pub mod catalog_routes;
pub mod company_routes;
pub mod customer_routes;
pub mod notification_routes;
pub mod order_routes;
pub mod payment_routes;
pub mod public_routes;
pub mod user_routes;
pub mod vehicle_routes;
pub mod vehicle_type_routes;
pub mod washer_routes;
