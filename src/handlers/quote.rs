// src/handlers/quote.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::order::{Quote, QuoteQuery},
};

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Public",
    responses((status = 200, description = "Servidor no ar", body = String))
)]
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/quote?amount=&direction= (calculadora da página inicial)
#[utoipa::path(
    get,
    path = "/api/quote",
    tag = "Public",
    params(QuoteQuery),
    responses(
        (status = 200, description = "Cotação com a taxa padrão", body = Quote),
        (status = 400, description = "Valor inválido")
    )
)]
pub async fn public_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, ApiError> {
    let quote = app_state
        .dashboard_service
        .public_quote(query.amount, query.direction)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(quote))
}
