// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

// Quantas fotos cabem num envio antes do corpo ser recusado
const MULTIPART_FILES_PER_REQUEST: usize = 10;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
    }
}

pub fn build_router(app_state: AppState) -> Router {
    let multipart_limit = DefaultBodyLimit::max(
        app_state.config.max_upload_bytes * MULTIPART_FILES_PER_REQUEST + 64 * 1024,
    );

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register/client", post(handlers::auth::register_client))
        .route(
            "/register/supplier",
            post(handlers::auth::register_supplier).layer(multipart_limit.clone()),
        )
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/approval", get(handlers::auth::get_my_approval));

    let client_routes = Router::new()
        .route("/home", get(handlers::client::client_home))
        .route("/quote", get(handlers::client::client_quote))
        .route(
            "/orders",
            post(handlers::client::create_order).get(handlers::client::list_orders),
        )
        .route("/orders/{id}/confirm", post(handlers::client::confirm_order));

    let supplier_routes = Router::new()
        .route("/home", get(handlers::supplier::supplier_home))
        .route("/orders", get(handlers::supplier::list_orders))
        .route(
            "/orders/{id}/ship",
            post(handlers::supplier::ship_order).layer(multipart_limit),
        )
        .route("/finance", get(handlers::supplier::supplier_finance))
        .route("/withdrawals", post(handlers::supplier::request_withdrawal));

    let order_routes = Router::new()
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/disputes", post(handlers::orders::open_dispute));

    let admin_routes = Router::new()
        .route("/home", get(handlers::admin::admin_home))
        .route("/finance", get(handlers::admin::admin_finance))
        .route("/clients", get(handlers::admin::list_clients))
        .route("/clients/{id}/fee-rate", put(handlers::admin::update_fee_rate))
        .route("/suppliers", get(handlers::admin::list_suppliers))
        .route("/suppliers/{id}/orders", get(handlers::admin::supplier_orders))
        .route("/suppliers/{id}/approve", post(handlers::admin::approve_supplier))
        .route("/suppliers/{id}/reject", post(handlers::admin::reject_supplier))
        .route("/withdrawals/{id}/approve", post(handlers::admin::approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(handlers::admin::reject_withdrawal))
        .route("/disputes", get(handlers::admin::list_disputes))
        .route("/disputes/{id}/resolve", post(handlers::admin::resolve_dispute));

    // Tudo que exige token passa pelo mesmo guard; o papel é conferido nos extratores
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/client", client_routes)
        .nest("/supplier", supplier_routes)
        .nest("/orders", order_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api = Router::new()
        .route("/health", get(handlers::quote::health))
        .route("/quote", get(handlers::quote::public_quote))
        .nest("/auth", auth_routes)
        .merge(protected);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .nest_service("/storage", ServeDir::new(&app_state.config.storage_dir))
        .layer(cors_layer(&app_state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
