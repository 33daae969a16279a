// src/services/finance_service.rs

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, ProfileRepository},
    models::{
        auth::Principal,
        finance::{AdminFinance, BalanceTotals, SupplierFinance, Withdrawal},
        profile::ApprovalStatus,
    },
    services::fee_calculator::validate_money,
};

const RECENT_TRANSACTIONS: i64 = 50;

/// Pedido de saque: positivo, em centavos e dentro do saldo ainda não comprometido.
pub fn check_withdrawal_request(amount: Decimal, totals: &BalanceTotals) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(amount.to_string()));
    }
    validate_money(amount)?;
    if amount > totals.requestable() {
        return Err(AppError::InsufficientBalance);
    }
    Ok(())
}

/// Na aprovação o próprio saque ainda conta como pendente, então a
/// conferência é contra o disponível.
pub fn check_withdrawal_approval(amount: Decimal, totals: &BalanceTotals) -> Result<(), AppError> {
    if amount > totals.available() {
        return Err(AppError::InsufficientBalance);
    }
    Ok(())
}

#[derive(Clone)]
pub struct FinanceService {
    finance_repo: FinanceRepository,
    profile_repo: ProfileRepository,
}

impl FinanceService {
    pub fn new(finance_repo: FinanceRepository, profile_repo: ProfileRepository) -> Self {
        Self { finance_repo, profile_repo }
    }

    // =========================================================================
    //  SAQUES
    // =========================================================================

    pub async fn request_withdrawal<'e, A>(
        &self,
        executor: A,
        supplier: &Principal,
        amount: Decimal,
    ) -> Result<Withdrawal, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Pedidos simultâneos do mesmo fornecedor passam um de cada vez
        self.profile_repo
            .lock_supplier(&mut *tx, supplier.user_id)
            .await?
            .ok_or(AppError::Forbidden)?;

        let totals = self.finance_repo.balance_totals(&mut *tx, supplier.user_id).await?;
        check_withdrawal_request(amount, &totals)?;

        let withdrawal = self
            .finance_repo
            .create_withdrawal(&mut *tx, supplier.user_id, amount)
            .await?;

        tx.commit().await?;

        tracing::info!("💸 Saque {} solicitado por {}: ¥ {}", withdrawal.id, supplier.user_id, amount);
        Ok(withdrawal)
    }

    pub async fn decide_withdrawal<'e, A>(
        &self,
        executor: A,
        admin: &Principal,
        withdrawal_id: Uuid,
        decision: ApprovalStatus,
    ) -> Result<Withdrawal, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }
        let mut tx = executor.begin().await?;

        let current = self
            .finance_repo
            .find_withdrawal(&mut *tx, withdrawal_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("withdrawal".to_string()))?;
        current.status.ensure_decision(decision)?;

        if decision == ApprovalStatus::Approved {
            self.profile_repo.lock_supplier(&mut *tx, current.supplier_id).await?;
            let totals = self.finance_repo.balance_totals(&mut *tx, current.supplier_id).await?;
            check_withdrawal_approval(current.amount, &totals)?;
        }

        let processed = self
            .finance_repo
            .decide_withdrawal(&mut *tx, withdrawal_id, decision, admin.user_id)
            .await?
            .ok_or(AppError::AlreadyProcessed)?;

        tx.commit().await?;

        tracing::info!(
            "🏦 Saque {} {} por {}",
            processed.id,
            processed.status.as_str(),
            admin.user_id
        );
        Ok(processed)
    }

    // =========================================================================
    //  TELAS FINANCEIRAS
    // =========================================================================

    pub async fn supplier_finance<'e, A>(&self, executor: A, supplier: &Principal) -> Result<SupplierFinance, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let week_start = Utc::now() - Duration::days(7);

        let week_total = self
            .finance_repo
            .transactions_total_since(&mut *tx, Some(supplier.user_id), week_start)
            .await?;
        let totals = self.finance_repo.balance_totals(&mut *tx, supplier.user_id).await?;
        let to_release = self.finance_repo.to_release(&mut *tx, supplier.user_id).await?;
        let withdrawals = self
            .finance_repo
            .list_withdrawals_for_supplier(&mut *tx, supplier.user_id)
            .await?;

        tx.commit().await?;

        Ok(SupplierFinance {
            week_total,
            available: totals.available(),
            to_release,
            pending_withdrawals: totals.pending_withdrawals,
            withdrawals,
        })
    }

    pub async fn admin_finance<'e, A>(&self, executor: A) -> Result<AdminFinance, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let withdrawals = self.finance_repo.list_withdrawals(&mut *tx, None).await?;
        let transactions = self
            .finance_repo
            .list_recent_transactions(&mut *tx, RECENT_TRANSACTIONS)
            .await?;
        tx.commit().await?;

        Ok(AdminFinance { withdrawals, transactions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals(completed: Decimal, approved: Decimal, pending: Decimal) -> BalanceTotals {
        BalanceTotals {
            completed_total: completed,
            approved_withdrawals: approved,
            pending_withdrawals: pending,
        }
    }

    #[test]
    fn request_limited_to_uncommitted_balance() {
        let t = totals(dec!(1349.00), Decimal::ZERO, dec!(1000.00));
        assert!(check_withdrawal_request(dec!(349.00), &t).is_ok());
        assert!(matches!(
            check_withdrawal_request(dec!(349.01), &t),
            Err(AppError::InsufficientBalance)
        ));
    }

    #[test]
    fn request_must_be_positive() {
        let t = totals(dec!(100), Decimal::ZERO, Decimal::ZERO);
        assert!(matches!(check_withdrawal_request(Decimal::ZERO, &t), Err(AppError::InvalidAmount(_))));
        assert!(matches!(check_withdrawal_request(dec!(-1), &t), Err(AppError::InvalidAmount(_))));
    }

    #[test]
    fn approval_rechecks_available_balance() {
        // O saque em análise (300) já está em `pending`
        let t = totals(dec!(1000), dec!(800), dec!(300));
        assert!(matches!(
            check_withdrawal_approval(dec!(300), &t),
            Err(AppError::InsufficientBalance)
        ));
        assert!(check_withdrawal_approval(dec!(200), &t).is_ok());
    }

    #[test]
    fn request_is_limited_to_cents() {
        let t = totals(dec!(100), Decimal::ZERO, Decimal::ZERO);
        assert!(matches!(check_withdrawal_request(dec!(0.001), &t), Err(AppError::InvalidAmount(_))));
        assert!(check_withdrawal_request(dec!(0.01), &t).is_ok());
    }

    #[test]
    fn request_above_column_range_is_invalid_not_insufficient() {
        let t = totals(dec!(100), Decimal::ZERO, Decimal::ZERO);
        assert!(matches!(
            check_withdrawal_request(dec!(10000000000000), &t),
            Err(AppError::InvalidAmount(_))
        ));
    }
}
