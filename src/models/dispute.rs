// src/models/dispute.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "dispute_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Open,
    Resolved,
    Rejected,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Rejected => "rejected",
        }
    }

    pub fn ensure_resolution(self, outcome: DisputeStatus) -> Result<(), AppError> {
        match (self, outcome) {
            (DisputeStatus::Open, DisputeStatus::Resolved | DisputeStatus::Rejected) => Ok(()),
            (DisputeStatus::Open, DisputeStatus::Open) => Err(AppError::InvalidTransition {
                from: self.as_str().to_string(),
                to: outcome.as_str().to_string(),
            }),
            _ => Err(AppError::AlreadyProcessed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: Uuid,
    pub order_id: Uuid,
    pub opened_by: Uuid,
    #[schema(example = "Mercadoria chegou danificada")]
    pub reason: String,
    pub status: DisputeStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
}

// Linha da fila de disputas do admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisputeSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub dispute: Dispute,
    pub order_number: String,
    pub opened_by_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenDisputePayload {
    #[schema(example = "Mercadoria chegou danificada")]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDisputePayload {
    /// `resolved` ou `rejected`.
    pub outcome: DisputeStatus,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DisputeFilter {
    pub status: Option<DisputeStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_dispute_can_be_closed_either_way() {
        assert!(DisputeStatus::Open.ensure_resolution(DisputeStatus::Resolved).is_ok());
        assert!(DisputeStatus::Open.ensure_resolution(DisputeStatus::Rejected).is_ok());
    }

    #[test]
    fn closed_dispute_cannot_be_reopened_or_changed() {
        assert!(matches!(
            DisputeStatus::Resolved.ensure_resolution(DisputeStatus::Rejected),
            Err(AppError::AlreadyProcessed)
        ));
        assert!(matches!(
            DisputeStatus::Rejected.ensure_resolution(DisputeStatus::Open),
            Err(AppError::AlreadyProcessed)
        ));
    }
}
