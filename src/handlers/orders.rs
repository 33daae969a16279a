// src/handlers/orders.rs
// Rotas comuns às duas partes do pedido (e ao admin)

use axum::{
    extract::{Path, State},
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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        dispute::{Dispute, OpenDisputePayload},
        order::OrderDetail,
    },
};

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com fotos e disputas", body = OrderDetail),
        (status = 403, description = "Usuário não participa do pedido"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .order_service
        .get_order_detail(&mut *tx, &user.0, order_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// POST /api/orders/{id}/disputes
#[utoipa::path(
    post,
    path = "/api/orders/{id}/disputes",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = OpenDisputePayload,
    responses(
        (status = 201, description = "Disputa aberta", body = Dispute),
        (status = 400, description = "Motivo vazio"),
        (status = 403, description = "Usuário não participa do pedido"),
        (status = 409, description = "Pedido concluído ou disputa já aberta")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_dispute(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OpenDisputePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let dispute = app_state
        .dispute_service
        .open_dispute(&mut *tx, &user.0, order_id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(dispute)))
}
