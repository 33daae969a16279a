// src/models/profile.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Supplier,
}

/// Portão de aprovação do admin: cadastro de fornecedor e saques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Só `pending` pode ser decidido, e só para `approved` ou `rejected`.
    pub fn ensure_decision(self, decision: ApprovalStatus) -> Result<(), AppError> {
        match (self, decision) {
            (ApprovalStatus::Pending, ApprovalStatus::Approved | ApprovalStatus::Rejected) => Ok(()),
            (ApprovalStatus::Pending, ApprovalStatus::Pending) => Err(AppError::InvalidTransition {
                from: self.as_str().to_string(),
                to: decision.as_str().to_string(),
            }),
            _ => Err(AppError::AlreadyProcessed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub full_name: String,
    #[schema(example = "maria@exemplo.com.br")]
    pub email: String,
    #[schema(example = "+55 11 99999-8888")]
    pub phone: String,
    pub user_type: UserType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "123.456.789-09")]
    pub cpf: String,
    #[schema(example = "5.00")]
    pub custom_fee_rate: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Código público de 6 dígitos que o cliente usa para criar o pedido.
    #[schema(example = "483920")]
    pub supplier_id: String,
    pub approval_status: ApprovalStatus,
    pub alipay_qr_code_url: Option<String>,
    pub contact_info: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

// Linha da tela de clientes do admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cpf: String,
    pub custom_fee_rate: Decimal,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[schema(example = 12)]
    pub order_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

// Linha da tela de fornecedores do admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub supplier_id: String,
    pub approval_status: ApprovalStatus,
    pub alipay_qr_code_url: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

// GET /api/users/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub role: UserRole,
    pub email: String,
    pub profile: Option<Profile>,
    pub approval_status: Option<ApprovalStatus>,
    pub supplier_code: Option<String>,
    pub custom_fee_rate: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatusResponse {
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeeRatePayload {
    #[schema(example = "4.5")]
    pub fee_rate: Decimal,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApprovalFilter {
    pub status: Option<ApprovalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(ApprovalStatus::Pending.ensure_decision(ApprovalStatus::Approved).is_ok());
        assert!(ApprovalStatus::Pending.ensure_decision(ApprovalStatus::Rejected).is_ok());
    }

    #[test]
    fn processed_decisions_are_final() {
        for from in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            for to in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
                assert!(matches!(from.ensure_decision(to), Err(AppError::AlreadyProcessed)));
            }
        }
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert!(matches!(
            ApprovalStatus::Pending.ensure_decision(ApprovalStatus::Pending),
            Err(AppError::InvalidTransition { .. })
        ));
    }
}
