// src/handlers/auth.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_rls_transaction,
        error::{ApiError, AppError},
    },
    config::AppState,
    handlers::upload::read_form,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{AuthResponse, LoginUserPayload, RegisterClientPayload, RegisterSupplierForm, RegisterSupplierPayload},
        profile::{ApprovalStatusResponse, MeResponse},
    },
};

// POST /api/auth/register/client
#[utoipa::path(
    post,
    path = "/api/auth/register/client",
    tag = "Auth",
    request_body = RegisterClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail ou CPF já cadastrado")
    )
)]
pub async fn register_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .auth_service
        .register_client(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/register/supplier (multipart)
#[utoipa::path(
    post,
    path = "/api/auth/register/supplier",
    tag = "Auth",
    request_body(content = RegisterSupplierForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Fornecedor cadastrado, aguardando aprovação", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou QR Code ausente"),
        (status = 409, description = "E-mail já cadastrado"),
        (status = 413, description = "Arquivo muito grande")
    )
)]
pub async fn register_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = read_form(&mut multipart, app_state.config.max_upload_bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let payload = RegisterSupplierPayload {
        full_name: form.text("full_name"),
        email: form.text("email"),
        phone: form.text("phone"),
        password: form.text("password"),
    };
    let qr_code = form.take_file("alipay_qr_code");

    let response = app_state
        .auth_service
        .register_supplier(payload, qr_code)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Cadastro de fornecedor rejeitado")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário atual", body = MeResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Json<MeResponse>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let me = app_state
        .auth_service
        .me(&mut *tx, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(me))
}

// GET /api/users/me/approval (tela de espera, consultado a cada 5 s)
#[utoipa::path(
    get,
    path = "/api/users/me/approval",
    tag = "Users",
    responses(
        (status = 200, description = "Status de aprovação do fornecedor", body = ApprovalStatusResponse),
        (status = 403, description = "Usuário não é fornecedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_approval(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Json<ApprovalStatusResponse>, ApiError> {
    let mut tx = begin_rls_transaction(&app_state, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let status = app_state
        .auth_service
        .approval_status(&mut *tx, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(status))
}
