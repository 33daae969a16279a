// src/handlers/client.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ClientOnly, RequireRole},
    },
    models::{
        dashboard::ClientHome,
        order::{CreateOrderPayload, Order, OrderWithImages, Quote, QuoteQuery},
    },
};

// GET /api/client/home
#[utoipa::path(
    get,
    path = "/api/client/home",
    tag = "Client",
    responses((status = 200, description = "Resumo do cliente", body = ClientHome)),
    security(("api_jwt" = []))
)]
pub async fn client_home(
    State(app_state): State<AppState>,
    locale: Locale,
    client: RequireRole<ClientOnly>,
) -> Result<Json<ClientHome>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let home = app_state
        .dashboard_service
        .client_home(&mut *tx, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(home))
}

// GET /api/client/quote?amount=&direction=
#[utoipa::path(
    get,
    path = "/api/client/quote",
    tag = "Client",
    params(QuoteQuery),
    responses(
        (status = 200, description = "Cotação com a taxa do cliente", body = Quote),
        (status = 400, description = "Valor inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn client_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    client: RequireRole<ClientOnly>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let quote = app_state
        .dashboard_service
        .client_quote(&mut *tx, &client.principal, query.amount, query.direction)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(quote))
}

// POST /api/client/orders
#[utoipa::path(
    post,
    path = "/api/client/orders",
    tag = "Client",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = Order),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Fornecedor não encontrado ou não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    client: RequireRole<ClientOnly>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_rls_transaction(&app_state, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .create_order(&mut *tx, &client.principal, &payload.supplier_code, payload.amount_brl)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/client/orders
#[utoipa::path(
    get,
    path = "/api/client/orders",
    tag = "Client",
    responses((status = 200, description = "Pedidos do cliente com fotos", body = Vec<OrderWithImages>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    client: RequireRole<ClientOnly>,
) -> Result<Json<Vec<OrderWithImages>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let orders = app_state
        .order_service
        .list_client_orders(&mut *tx, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

// POST /api/client/orders/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/client/orders/{id}/confirm",
    tag = "Client",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Recebimento confirmado, valor liberado", body = Order),
        (status = 409, description = "Pedido não enviado ou com disputa aberta")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_order(
    State(app_state): State<AppState>,
    locale: Locale,
    client: RequireRole<ClientOnly>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &client.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .confirm_receipt(&mut *tx, &client.principal, order_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(order))
}
