// src/services/onboarding_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::{
        auth::Principal,
        profile::{ApprovalStatus, ClientDetail, ClientSummary, SupplierDetail, SupplierSummary},
    },
    services::fee_calculator::{round_money, validate_fee_rate},
};

// Cadastro de fornecedores e taxas dos clientes (telas do admin)
#[derive(Clone)]
pub struct OnboardingService {
    profile_repo: ProfileRepository,
}

impl OnboardingService {
    pub fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    pub async fn list_suppliers<'e, E>(
        &self,
        executor: E,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<SupplierSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.profile_repo.list_suppliers(executor, status).await
    }

    pub async fn decide_supplier<'e, A>(
        &self,
        executor: A,
        admin: &Principal,
        supplier_detail_id: Uuid,
        decision: ApprovalStatus,
    ) -> Result<SupplierDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }
        let mut tx = executor.begin().await?;

        let current = self
            .profile_repo
            .find_supplier_detail_by_id(&mut *tx, supplier_detail_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("supplier".to_string()))?;
        current.approval_status.ensure_decision(decision)?;

        let decided = self
            .profile_repo
            .decide_supplier(&mut *tx, supplier_detail_id, decision, admin.user_id)
            .await?
            .ok_or(AppError::AlreadyProcessed)?;

        tx.commit().await?;

        tracing::info!(
            "📋 Fornecedor {} ({}) {}",
            decided.supplier_id,
            decided.user_id,
            decided.approval_status.as_str()
        );
        Ok(decided)
    }

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.profile_repo.list_clients(executor).await
    }

    /// Só vale para pedidos futuros; os existentes guardam a taxa antiga.
    pub async fn update_client_fee_rate<'e, E>(
        &self,
        executor: E,
        admin: &Principal,
        client_detail_id: Uuid,
        fee_rate: Decimal,
    ) -> Result<ClientDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }
        validate_fee_rate(fee_rate)?;

        let detail = self
            .profile_repo
            .update_fee_rate(executor, client_detail_id, round_money(fee_rate))
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("client".to_string()))?;

        tracing::info!("💱 Taxa do cliente {} alterada para {}%", detail.user_id, detail.custom_fee_rate);
        Ok(detail)
    }
}
