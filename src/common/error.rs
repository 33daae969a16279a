// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Valor inválido: {0}")]
    InvalidAmount(String),

    #[error("Taxa inválida (0-100)")]
    InvalidFeeRate,

    #[error("Código de rastreio obrigatório")]
    MissingTrackingCode,

    #[error("Pelo menos uma foto do envio é obrigatória")]
    MissingShipmentImages,

    #[error("QR Code do Alipay obrigatório")]
    MissingQrCode,

    #[error("Motivo da disputa obrigatório")]
    EmptyDisputeReason,

    #[error("Upload inválido: {0}")]
    InvalidUpload(String),

    #[error("Formato de imagem não suportado")]
    UnsupportedImageFormat,

    #[error("Arquivo maior que o permitido ({0} bytes)")]
    FileTooLarge(usize),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("CPF já cadastrado")]
    DocumentAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Conta rejeitada")]
    AccountRejected,

    #[error("Conta aguardando aprovação")]
    AccountPendingApproval,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Fornecedor não encontrado ou não aprovado")]
    SupplierNotAvailable,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Solicitação já processada")]
    AlreadyProcessed,

    #[error("Já existe uma disputa aberta para este pedido")]
    DisputeAlreadyOpen,

    #[error("Pedido com disputa aberta")]
    OrderHasOpenDispute,

    #[error("Saldo insuficiente")]
    InsufficientBalance,

    #[error("Erro de armazenamento: {0}")]
    StorageError(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável, usado pelo frontend e como chave das traduções.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidAmount(_) => "INVALID_AMOUNT",
            AppError::InvalidFeeRate => "INVALID_FEE_RATE",
            AppError::MissingTrackingCode => "MISSING_TRACKING_CODE",
            AppError::MissingShipmentImages => "MISSING_SHIPMENT_IMAGES",
            AppError::MissingQrCode => "MISSING_QR_CODE",
            AppError::EmptyDisputeReason => "EMPTY_DISPUTE_REASON",
            AppError::InvalidUpload(_) => "INVALID_UPLOAD",
            AppError::UnsupportedImageFormat => "UNSUPPORTED_IMAGE_FORMAT",
            AppError::FileTooLarge(_) => "FILE_TOO_LARGE",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::DocumentAlreadyExists => "DOCUMENT_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::AccountRejected => "ACCOUNT_REJECTED",
            AppError::AccountPendingApproval => "ACCOUNT_PENDING_APPROVAL",
            AppError::Forbidden => "FORBIDDEN",
            AppError::SupplierNotAvailable => "SUPPLIER_NOT_AVAILABLE",
            AppError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::AlreadyProcessed => "ALREADY_PROCESSED",
            AppError::DisputeAlreadyOpen => "DISPUTE_ALREADY_OPEN",
            AppError::OrderHasOpenDispute => "ORDER_HAS_OPEN_DISPUTE",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidAmount(_)
            | AppError::InvalidFeeRate
            | AppError::MissingTrackingCode
            | AppError::MissingShipmentImages
            | AppError::MissingQrCode
            | AppError::EmptyDisputeReason
            | AppError::InvalidUpload(_)
            | AppError::UnsupportedImageFormat => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::EmailAlreadyExists
            | AppError::DocumentAlreadyExists
            | AppError::InvalidTransition { .. }
            | AppError::AlreadyProcessed
            | AppError::DisputeAlreadyOpen
            | AppError::OrderHasOpenDispute => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AccountRejected | AppError::AccountPendingApproval | AppError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AppError::UserNotFound
            | AppError::SupplierNotAvailable
            | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let error = store
            .translate(&locale.0, code)
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::InvalidTransition { from, to } => Some(json!({ "from": from, "to": to })),
            AppError::InvalidAmount(reason) | AppError::InvalidUpload(reason) => {
                Some(json!({ "reason": reason }))
            }
            AppError::ResourceNotFound(what) => Some(json!({ "resource": what })),
            AppError::FileTooLarge(max) => Some(json!({ "maxBytes": max })),
            _ => None,
        };

        ApiError {
            status,
            code: code.to_string(),
            error,
            details,
        }
    }
}

// Erro já pronto para o cliente (status + mensagem traduzida)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "code": self.code, "details": details }),
            None => json!({ "error": self.error, "code": self.code }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn business_rule_violations_map_to_conflict() {
        let err = AppError::InvalidTransition {
            from: "pending".into(),
            to: "completed".into(),
        };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DisputeAlreadyOpen.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyProcessed.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn input_errors_and_policy_errors_are_distinguished() {
        assert_eq!(AppError::EmptyDisputeReason.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidFeeRate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InsufficientBalance.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::StorageError("disk full at /var/lib".into());
        let api = err.to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code, "INTERNAL_ERROR");
        assert!(!api.error.contains("/var/lib"));
        assert!(api.details.is_none());
    }

    #[test]
    fn transition_errors_carry_both_states() {
        let err = AppError::InvalidTransition {
            from: "pending".into(),
            to: "completed".into(),
        };
        let api = err.to_api_error(&pt(), &I18nStore::new());
        let details = api.details.expect("details");
        assert_eq!(details["from"], "pending");
        assert_eq!(details["to"], "completed");
    }

    #[test]
    fn message_follows_locale() {
        let store = I18nStore::new();
        let zh = AppError::InsufficientBalance.to_api_error(&Locale("zh".into()), &store);
        let pt = AppError::InsufficientBalance.to_api_error(&pt(), &store);
        assert_ne!(zh.error, pt.error);
        assert_eq!(zh.code, pt.code);
    }
}
