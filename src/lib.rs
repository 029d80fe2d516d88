//! Backend multi-empresa para lavaderos de autos
//!
//! Clientes, vehículos, lavadores, catálogo de servicios, órdenes de
//! servicio, pagos y notificaciones, con finalización automática al
//! cierre de cada empresa.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{auth_middleware, cors_layer, tenant_middleware};
use crate::routes::{
    catalog_routes, company_routes, customer_routes, notification_routes, order_routes,
    payment_routes, public_routes, user_routes, vehicle_routes, vehicle_type_routes,
    washer_routes,
};
use crate::state::AppState;

/// Router completo de la aplicación
pub fn build_router(state: AppState) -> Router {
    // Datos de una empresa: token + x-empresa-id
    let tenant_routes = Router::new()
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/vehicle-types", vehicle_type_routes::create_vehicle_type_router())
        .nest("/washers", washer_routes::create_washer_router())
        .nest("/services", catalog_routes::create_service_router())
        .nest("/addons", catalog_routes::create_addon_router())
        .nest("/orders", order_routes::create_order_router())
        .nest("/payments", payment_routes::create_payment_router())
        .nest("/notifications", notification_routes::create_notification_router())
        .route_layer(from_fn_with_state(state.clone(), tenant_middleware));

    // Solo token de usuario
    let user_routes = Router::new()
        .nest("/companies", company_routes::create_company_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let open_routes = Router::new()
        .nest("/users", user_routes::create_user_router())
        .nest("/public", public_routes::create_public_router());

    let api = Router::new()
        .merge(open_routes)
        .merge(user_routes)
        .merge(tenant_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
