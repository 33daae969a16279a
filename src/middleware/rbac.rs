// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{Principal, UserRole},
        profile::ApprovalStatus,
    },
};

/// 1. O trait que define quem pode passar
pub trait RoleDef: Send + Sync + 'static {
    fn check(principal: &Principal) -> Result<(), AppError>;
}

/// 2. O extractor (guardião). Devolve o Principal já conferido.
pub struct RequireRole<T> {
    pub principal: Principal,
    _role: PhantomData<T>,
}

impl<T> RequireRole<T> {
    pub fn user_id(&self) -> uuid::Uuid {
        self.principal.user_id
    }
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) = AuthenticatedUser::from_request_parts(parts, state).await?;

        T::check(&principal).map_err(|e| {
            let app_state = AppState::from_ref(state);
            e.to_api_error(&Locale::from_parts(parts), &app_state.i18n_store)
        })?;

        Ok(RequireRole {
            principal,
            _role: PhantomData,
        })
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn check(principal: &Principal) -> Result<(), AppError> {
        if principal.role == UserRole::Admin { Ok(()) } else { Err(AppError::Forbidden) }
    }
}

pub struct ClientOnly;
impl RoleDef for ClientOnly {
    fn check(principal: &Principal) -> Result<(), AppError> {
        if principal.role == UserRole::Client { Ok(()) } else { Err(AppError::Forbidden) }
    }
}

/// Fornecedor que ainda não foi aprovado só enxerga a tela de espera.
pub struct ApprovedSupplier;
impl RoleDef for ApprovedSupplier {
    fn check(principal: &Principal) -> Result<(), AppError> {
        if principal.role != UserRole::Supplier {
            return Err(AppError::Forbidden);
        }
        match principal.approval_status {
            Some(ApprovalStatus::Approved) => Ok(()),
            Some(ApprovalStatus::Rejected) => Err(AppError::AccountRejected),
            Some(ApprovalStatus::Pending) | None => Err(AppError::AccountPendingApproval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn principal(role: UserRole, approval_status: Option<ApprovalStatus>) -> Principal {
        Principal { user_id: Uuid::new_v4(), role, approval_status }
    }

    #[test]
    fn roles_are_exclusive() {
        assert!(AdminOnly::check(&principal(UserRole::Admin, None)).is_ok());
        assert!(AdminOnly::check(&principal(UserRole::Client, None)).is_err());
        assert!(ClientOnly::check(&principal(UserRole::Client, None)).is_ok());
        assert!(ClientOnly::check(&principal(UserRole::Supplier, Some(ApprovalStatus::Approved))).is_err());
    }

    #[test]
    fn supplier_routes_need_approval() {
        assert!(ApprovedSupplier::check(&principal(UserRole::Supplier, Some(ApprovalStatus::Approved))).is_ok());
        assert!(matches!(
            ApprovedSupplier::check(&principal(UserRole::Supplier, Some(ApprovalStatus::Pending))),
            Err(AppError::AccountPendingApproval)
        ));
        assert!(matches!(
            ApprovedSupplier::check(&principal(UserRole::Supplier, Some(ApprovalStatus::Rejected))),
            Err(AppError::AccountRejected)
        ));
        assert!(matches!(
            ApprovedSupplier::check(&principal(UserRole::Admin, None)),
            Err(AppError::Forbidden)
        ));
    }
}
