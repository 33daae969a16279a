// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        dashboard::AdminHome,
        dispute::{Dispute, DisputeFilter, DisputeSummary, ResolveDisputePayload},
        finance::{AdminFinance, Withdrawal},
        order::OrderWithImages,
        profile::{
            ApprovalFilter, ApprovalStatus, ClientDetail, ClientSummary, SupplierDetail, SupplierSummary,
            UpdateFeeRatePayload,
        },
    },
};

// =============================================================================
//  PAINEL
// =============================================================================

// GET /api/admin/home
#[utoipa::path(
    get,
    path = "/api/admin/home",
    tag = "Admin",
    responses((status = 200, description = "Totais do período e pedidos em aberto", body = AdminHome)),
    security(("api_jwt" = []))
)]
pub async fn admin_home(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
) -> Result<Json<AdminHome>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let home = app_state
        .dashboard_service
        .admin_home(&mut *tx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(home))
}

// GET /api/admin/finance
#[utoipa::path(
    get,
    path = "/api/admin/finance",
    tag = "Admin",
    responses((status = 200, description = "Saques (pendentes primeiro) e transações recentes", body = AdminFinance)),
    security(("api_jwt" = []))
)]
pub async fn admin_finance(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
) -> Result<Json<AdminFinance>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let finance = app_state
        .finance_service
        .admin_finance(&mut *tx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(finance))
}

// =============================================================================
//  CLIENTES
// =============================================================================

// GET /api/admin/clients
#[utoipa::path(
    get,
    path = "/api/admin/clients",
    tag = "Admin",
    responses((status = 200, description = "Clientes com contagem de pedidos", body = Vec<ClientSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
) -> Result<Json<Vec<ClientSummary>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let clients = app_state
        .onboarding_service
        .list_clients(&mut *tx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(clients))
}

// PUT /api/admin/clients/{id}/fee-rate
#[utoipa::path(
    put,
    path = "/api/admin/clients/{id}/fee-rate",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do cadastro de cliente (client_details)")),
    request_body = UpdateFeeRatePayload,
    responses(
        (status = 200, description = "Taxa atualizada", body = ClientDetail),
        (status = 400, description = "Taxa fora de [0, 100)"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_fee_rate(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(client_detail_id): Path<Uuid>,
    Json(payload): Json<UpdateFeeRatePayload>,
) -> Result<Json<ClientDetail>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .onboarding_service
        .update_client_fee_rate(&mut *tx, &admin.principal, client_detail_id, payload.fee_rate)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// =============================================================================
//  FORNECEDORES
// =============================================================================

// GET /api/admin/suppliers?status=pending
#[utoipa::path(
    get,
    path = "/api/admin/suppliers",
    tag = "Admin",
    params(ApprovalFilter),
    responses((status = 200, description = "Fornecedores (filtro opcional por status)", body = Vec<SupplierSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Query(filter): Query<ApprovalFilter>,
) -> Result<Json<Vec<SupplierSummary>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let suppliers = app_state
        .onboarding_service
        .list_suppliers(&mut *tx, filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(suppliers))
}

// GET /api/admin/suppliers/{id}/orders ({id} = user id do fornecedor)
#[utoipa::path(
    get,
    path = "/api/admin/suppliers/{id}/orders",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID de usuário do fornecedor")),
    responses((status = 200, description = "Pedidos do fornecedor", body = Vec<OrderWithImages>)),
    security(("api_jwt" = []))
)]
pub async fn supplier_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(supplier_user_id): Path<Uuid>,
) -> Result<Json<Vec<OrderWithImages>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let orders = app_state
        .order_service
        .list_supplier_orders(&mut *tx, supplier_user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

async fn decide_supplier(
    app_state: &AppState,
    locale: &Locale,
    admin: &RequireRole<AdminOnly>,
    supplier_detail_id: Uuid,
    decision: ApprovalStatus,
) -> Result<Json<SupplierDetail>, ApiError> {
    let mut tx = begin_rls_transaction(app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    let detail = app_state
        .onboarding_service
        .decide_supplier(&mut *tx, &admin.principal, supplier_detail_id, decision)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// POST /api/admin/suppliers/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/suppliers/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do cadastro de fornecedor (supplier_details)")),
    responses(
        (status = 200, description = "Fornecedor aprovado", body = SupplierDetail),
        (status = 409, description = "Cadastro já decidido")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(supplier_detail_id): Path<Uuid>,
) -> Result<Json<SupplierDetail>, ApiError> {
    decide_supplier(&app_state, &locale, &admin, supplier_detail_id, ApprovalStatus::Approved).await
}

// POST /api/admin/suppliers/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/suppliers/{id}/reject",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do cadastro de fornecedor (supplier_details)")),
    responses(
        (status = 200, description = "Fornecedor rejeitado", body = SupplierDetail),
        (status = 409, description = "Cadastro já decidido")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(supplier_detail_id): Path<Uuid>,
) -> Result<Json<SupplierDetail>, ApiError> {
    decide_supplier(&app_state, &locale, &admin, supplier_detail_id, ApprovalStatus::Rejected).await
}

// =============================================================================
//  SAQUES
// =============================================================================

async fn decide_withdrawal(
    app_state: &AppState,
    locale: &Locale,
    admin: &RequireRole<AdminOnly>,
    withdrawal_id: Uuid,
    decision: ApprovalStatus,
) -> Result<Json<Withdrawal>, ApiError> {
    let mut tx = begin_rls_transaction(app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    let withdrawal = app_state
        .finance_service
        .decide_withdrawal(&mut *tx, &admin.principal, withdrawal_id, decision)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(locale, &app_state.i18n_store))?;

    Ok(Json(withdrawal))
}

// POST /api/admin/withdrawals/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/withdrawals/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do saque")),
    responses(
        (status = 200, description = "Saque aprovado", body = Withdrawal),
        (status = 409, description = "Saque já processado"),
        (status = 422, description = "Saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(withdrawal_id): Path<Uuid>,
) -> Result<Json<Withdrawal>, ApiError> {
    decide_withdrawal(&app_state, &locale, &admin, withdrawal_id, ApprovalStatus::Approved).await
}

// POST /api/admin/withdrawals/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/withdrawals/{id}/reject",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do saque")),
    responses(
        (status = 200, description = "Saque rejeitado", body = Withdrawal),
        (status = 409, description = "Saque já processado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(withdrawal_id): Path<Uuid>,
) -> Result<Json<Withdrawal>, ApiError> {
    decide_withdrawal(&app_state, &locale, &admin, withdrawal_id, ApprovalStatus::Rejected).await
}

// =============================================================================
//  DISPUTAS
// =============================================================================

// GET /api/admin/disputes?status=open
#[utoipa::path(
    get,
    path = "/api/admin/disputes",
    tag = "Admin",
    params(DisputeFilter),
    responses((status = 200, description = "Disputas com número do pedido e quem abriu", body = Vec<DisputeSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_disputes(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Query(filter): Query<DisputeFilter>,
) -> Result<Json<Vec<DisputeSummary>>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disputes = app_state
        .dispute_service
        .list_disputes(&mut *tx, filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(disputes))
}

// POST /api/admin/disputes/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/admin/disputes/{id}/resolve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID da disputa")),
    request_body = ResolveDisputePayload,
    responses(
        (status = 200, description = "Disputa encerrada", body = Dispute),
        (status = 409, description = "Disputa já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_dispute(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(dispute_id): Path<Uuid>,
    Json(payload): Json<ResolveDisputePayload>,
) -> Result<Json<Dispute>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &admin.principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let dispute = app_state
        .dispute_service
        .resolve_dispute(&mut *tx, &admin.principal, dispute_id, payload.outcome)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(dispute))
}
