// src/handlers/supplier.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    handlers::upload::read_form,
    middleware::{
        i18n::Locale,
        rbac::{ApprovedSupplier, RequireRole},
    },
    models::{
        dashboard::SupplierHome,
        finance::{RequestWithdrawalPayload, SupplierFinance, Withdrawal},
        order::{Order, OrderWithImages, ShipOrderForm},
    },
};

// GET /api/supplier/home
#[utoipa::path(
    get,
    path = "/api/supplier/home",
    tag = "Supplier",
    responses(
        (status = 200, description = "Resumo do fornecedor", body = SupplierHome),
        (status = 403, description = "Fornecedor não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn supplier_home(
    State(app_state): State<AppState>,
    locale: Locale,
    supplier: RequireRole<ApprovedSupplier>,
) -> Result<Json<SupplierHome>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let home = app_state
        .dashboard_service
        .supplier_home(&mut *tx, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(home))
}

// GET /api/supplier/orders
#[utoipa::path(
    get,
    path = "/api/supplier/orders",
    tag = "Supplier",
    responses((status = 200, description = "Pedidos do fornecedor (com nome do cliente)", body = Vec<OrderWithImages>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    supplier: RequireRole<ApprovedSupplier>,
) -> Result<Json<Vec<OrderWithImages>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let orders = app_state
        .order_service
        .list_supplier_orders(&mut *tx, supplier.user_id())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

// POST /api/supplier/orders/{id}/ship (multipart: tracking_code + images)
#[utoipa::path(
    post,
    path = "/api/supplier/orders/{id}/ship",
    tag = "Supplier",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body(content = ShipOrderForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Pedido marcado como enviado", body = Order),
        (status = 400, description = "Rastreio ou fotos ausentes"),
        (status = 409, description = "Pedido não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn ship_order(
    State(app_state): State<AppState>,
    locale: Locale,
    supplier: RequireRole<ApprovedSupplier>,
    Path(order_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Order>, ApiError> {
    let mut form = read_form(&mut multipart, app_state.config.max_upload_bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let tracking_code = form.text("tracking_code");
    let images = form.take_files("images");

    let mut tx = begin_rls_transaction(&app_state, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .ship_order(&mut *tx, &supplier.principal, order_id, &tracking_code, images)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(order))
}

// GET /api/supplier/finance
#[utoipa::path(
    get,
    path = "/api/supplier/finance",
    tag = "Supplier",
    responses((status = 200, description = "Saldo, a liberar e histórico de saques", body = SupplierFinance)),
    security(("api_jwt" = []))
)]
pub async fn supplier_finance(
    State(app_state): State<AppState>,
    locale: Locale,
    supplier: RequireRole<ApprovedSupplier>,
) -> Result<Json<SupplierFinance>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let finance = app_state
        .finance_service
        .supplier_finance(&mut *tx, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(finance))
}

// POST /api/supplier/withdrawals
#[utoipa::path(
    post,
    path = "/api/supplier/withdrawals",
    tag = "Supplier",
    request_body = RequestWithdrawalPayload,
    responses(
        (status = 201, description = "Saque solicitado", body = Withdrawal),
        (status = 400, description = "Valor inválido"),
        (status = 422, description = "Saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    supplier: RequireRole<ApprovedSupplier>,
    Json(payload): Json<RequestWithdrawalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &supplier.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let withdrawal = app_state
        .finance_service
        .request_withdrawal(&mut *tx, &supplier.principal, payload.amount)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}
