pub mod catalog_controller;
pub mod company_controller;
pub mod customer_controller;
pub mod notification_controller;
pub mod order_controller;
pub mod payment_controller;
pub mod user_controller;
pub mod vehicle_controller;
pub mod vehicle_type_controller;
pub mod washer_controller;
