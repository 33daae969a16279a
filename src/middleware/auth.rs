// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Principal,
};

// O middleware em si: valida o Bearer e publica o Principal nos extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let principal = app_state
        .auth_service
        .principal_from_token(bearer.token())
        .await
        .map_err(|e| {
            // Usuário apagado depois de emitir o token continua sendo 401
            let e = match e {
                AppError::UserNotFound => AppError::InvalidToken,
                other => other,
            };
            e.to_api_error(&locale, &app_state.i18n_store)
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

// Extrator para obter quem está autenticado diretamente nos handlers
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Principal);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(AuthenticatedUser(*principal)),
            None => {
                let app_state = AppState::from_ref(state);
                Err(AppError::InvalidToken.to_api_error(&Locale::from_parts(parts), &app_state.i18n_store))
            }
        }
    }
}
