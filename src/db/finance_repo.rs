// src/db/finance_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        finance::{BalanceTotals, Transaction, TransactionSummary, Withdrawal, WithdrawalSummary},
        profile::ApprovalStatus,
    },
};

const WITHDRAWAL_COLUMNS: &str =
    "id, supplier_id, amount, status, requested_at, processed_at, processed_by";

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LIVRO-RAZÃO (transactions)
    // =========================================================================

    // Um único lançamento de liberação por pedido (índice único parcial)
    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        order_id: Option<Uuid>,
        supplier_id: Uuid,
        amount: Decimal,
        kind: &str,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (order_id, supplier_id, amount, type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, supplier_id, amount, type, created_at
            "#,
        )
        .bind(order_id)
        .bind(supplier_id)
        .bind(amount)
        .bind(kind)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::AlreadyProcessed;
                }
            }
            AppError::from(e)
        })?;

        Ok(transaction)
    }

    pub async fn list_recent_transactions<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<TransactionSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, TransactionSummary>(
            r#"
            SELECT t.id, t.order_id, t.supplier_id, t.amount, t.type, t.created_at,
                   p.full_name AS supplier_name
            FROM transactions t
            LEFT JOIN profiles p ON p.id = t.supplier_id
            ORDER BY t.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(transactions)
    }

    /// Σ dos lançamentos desde `since` (de um fornecedor, ou da plataforma toda).
    pub async fn transactions_total_since<'e, E>(
        &self,
        executor: E,
        supplier_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE created_at >= $2
              AND ($1::uuid IS NULL OR supplier_id = $1)
            "#,
        )
        .bind(supplier_id)
        .bind(since)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    /// Σ amount_cny dos pedidos enviados aguardando confirmação.
    pub async fn to_release<'e, E>(&self, executor: E, supplier_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cny), 0)
            FROM orders
            WHERE supplier_id = $1 AND status = 'shipped'
            "#,
        )
        .bind(supplier_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  SALDO
    // =========================================================================

    pub async fn balance_totals<'e, E>(&self, executor: E, supplier_id: Uuid) -> Result<BalanceTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, BalanceTotals>(
            r#"
            SELECT
                (SELECT COALESCE(SUM(amount_cny), 0) FROM orders
                  WHERE supplier_id = $1 AND status = 'completed') AS completed_total,
                (SELECT COALESCE(SUM(amount), 0) FROM withdrawals
                  WHERE supplier_id = $1 AND status = 'approved') AS approved_withdrawals,
                (SELECT COALESCE(SUM(amount), 0) FROM withdrawals
                  WHERE supplier_id = $1 AND status = 'pending') AS pending_withdrawals
            "#,
        )
        .bind(supplier_id)
        .fetch_one(executor)
        .await?;

        Ok(totals)
    }

    // =========================================================================
    //  SAQUES
    // =========================================================================

    pub async fn create_withdrawal<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
        amount: Decimal,
    ) -> Result<Withdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO withdrawals (supplier_id, amount, status)
            VALUES ($1, $2, 'pending')
            RETURNING {WITHDRAWAL_COLUMNS}
            "#
        );
        let withdrawal = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(supplier_id)
            .bind(amount)
            .fetch_one(executor)
            .await?;

        Ok(withdrawal)
    }

    pub async fn find_withdrawal<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE id = $1");
        let withdrawal = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(withdrawal)
    }

    /// Decide o saque somente se ainda estiver `pending`.
    pub async fn decide_withdrawal<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        decision: ApprovalStatus,
        admin_id: Uuid,
    ) -> Result<Option<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE withdrawals
            SET status = $2, processed_at = NOW(), processed_by = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING {WITHDRAWAL_COLUMNS}
            "#
        );
        let withdrawal = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(id)
            .bind(decision)
            .bind(admin_id)
            .fetch_optional(executor)
            .await?;

        Ok(withdrawal)
    }

    pub async fn list_withdrawals_for_supplier<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
    ) -> Result<Vec<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE supplier_id = $1 ORDER BY requested_at DESC"
        );
        let withdrawals = sqlx::query_as::<_, Withdrawal>(&sql)
            .bind(supplier_id)
            .fetch_all(executor)
            .await?;

        Ok(withdrawals)
    }

    // Fila do admin: pendentes primeiro, com o QR Code para pagamento
    pub async fn list_withdrawals<'e, E>(
        &self,
        executor: E,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<WithdrawalSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawals = sqlx::query_as::<_, WithdrawalSummary>(
            r#"
            SELECT
                w.id, w.supplier_id, w.amount, w.status,
                w.requested_at, w.processed_at, w.processed_by,
                p.full_name AS supplier_name,
                s.alipay_qr_code_url
            FROM withdrawals w
            LEFT JOIN profiles p ON p.id = w.supplier_id
            LEFT JOIN supplier_details s ON s.user_id = w.supplier_id
            WHERE ($1::approval_status IS NULL OR w.status = $1)
            ORDER BY (w.status = 'pending') DESC, w.requested_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(withdrawals)
    }
}
