// src/services/dispute_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DisputeRepository, OrderRepository},
    models::{
        auth::Principal,
        dispute::{Dispute, DisputeStatus, DisputeSummary},
        order::Order,
    },
};

/// Motivo obrigatório (sem contar espaços). Devolve o texto aparado.
pub fn validate_reason(reason: &str) -> Result<&str, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::EmptyDisputeReason);
    }
    Ok(reason)
}

/// Só cliente ou fornecedor do pedido, e só antes da liberação do valor.
pub fn ensure_can_open(order: &Order, principal: &Principal) -> Result<(), AppError> {
    if order.client_id != principal.user_id && order.supplier_id != principal.user_id {
        return Err(AppError::Forbidden);
    }
    if !order.status.accepts_disputes() {
        return Err(AppError::InvalidTransition {
            from: order.status.as_str().to_string(),
            to: "disputed".to_string(),
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct DisputeService {
    dispute_repo: DisputeRepository,
    order_repo: OrderRepository,
}

impl DisputeService {
    pub fn new(dispute_repo: DisputeRepository, order_repo: OrderRepository) -> Self {
        Self { dispute_repo, order_repo }
    }

    /// Abrir disputa não muda o status do pedido; só bloqueia a confirmação.
    pub async fn open_dispute<'e, A>(
        &self,
        executor: A,
        principal: &Principal,
        order_id: Uuid,
        reason: &str,
    ) -> Result<Dispute, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let reason = validate_reason(reason)?;
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .lock_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("order".to_string()))?;
        ensure_can_open(&order, principal)?;

        if self.dispute_repo.has_open_dispute(&mut *tx, order_id).await? {
            return Err(AppError::DisputeAlreadyOpen);
        }
        let dispute = self
            .dispute_repo
            .create_dispute(&mut *tx, order_id, principal.user_id, reason)
            .await?;

        tx.commit().await?;

        tracing::info!("⚠️ Disputa {} aberta no pedido {} por {}", dispute.id, order.order_number, principal.user_id);
        Ok(dispute)
    }

    pub async fn list_disputes<'e, E>(
        &self,
        executor: E,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<DisputeSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.dispute_repo.list_disputes(executor, status).await
    }

    pub async fn resolve_dispute<'e, A>(
        &self,
        executor: A,
        admin: &Principal,
        dispute_id: Uuid,
        outcome: DisputeStatus,
    ) -> Result<Dispute, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }
        let mut tx = executor.begin().await?;

        let current = self
            .dispute_repo
            .find_dispute(&mut *tx, dispute_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("dispute".to_string()))?;
        current.status.ensure_resolution(outcome)?;

        // Outro admin pode ter fechado a disputa entre a leitura e o update
        let resolved = self
            .dispute_repo
            .resolve_dispute(&mut *tx, dispute_id, outcome, admin.user_id)
            .await?
            .ok_or(AppError::AlreadyProcessed)?;

        tx.commit().await?;

        tracing::info!("⚖️ Disputa {} encerrada como {}", resolved.id, resolved.status.as_str());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{auth::UserRole, order::OrderStatus};
    use rust_decimal::Decimal;

    fn order_with(status: OrderStatus, client_id: Uuid, supplier_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD1".to_string(),
            client_id,
            supplier_id,
            amount_brl: Decimal::ONE_HUNDRED,
            amount_cny: Decimal::ONE_HUNDRED,
            fee_rate: Decimal::ZERO,
            fee_amount: Decimal::ZERO,
            total_amount: Decimal::ONE_HUNDRED,
            status,
            tracking_code: None,
            created_at: None,
            shipped_at: None,
            completed_at: None,
        }
    }

    fn principal(user_id: Uuid, role: UserRole) -> Principal {
        Principal { user_id, role, approval_status: None }
    }

    #[test]
    fn blank_reason_is_rejected() {
        assert!(matches!(validate_reason("  \n "), Err(AppError::EmptyDisputeReason)));
        assert_eq!(validate_reason(" caixa amassada ").unwrap(), "caixa amassada");
    }

    #[test]
    fn either_party_can_dispute_before_completion() {
        let client = Uuid::new_v4();
        let supplier = Uuid::new_v4();
        for status in [OrderStatus::Pending, OrderStatus::Shipped] {
            let order = order_with(status, client, supplier);
            assert!(ensure_can_open(&order, &principal(client, UserRole::Client)).is_ok());
            assert!(ensure_can_open(&order, &principal(supplier, UserRole::Supplier)).is_ok());
        }
    }

    #[test]
    fn completed_orders_and_outsiders_cannot_dispute() {
        let client = Uuid::new_v4();
        let completed = order_with(OrderStatus::Completed, client, Uuid::new_v4());
        assert!(matches!(
            ensure_can_open(&completed, &principal(client, UserRole::Client)),
            Err(AppError::InvalidTransition { .. })
        ));

        let pending = order_with(OrderStatus::Pending, client, Uuid::new_v4());
        assert!(matches!(
            ensure_can_open(&pending, &principal(Uuid::new_v4(), UserRole::Admin)),
            Err(AppError::Forbidden)
        ));
    }
}
