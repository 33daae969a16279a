// src/db/dispute_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dispute::{Dispute, DisputeStatus, DisputeSummary},
};

const DISPUTE_COLUMNS: &str =
    "id, order_id, opened_by, reason, status, created_at, resolved_at, resolved_by";

#[derive(Clone)]
pub struct DisputeRepository {
    pool: PgPool,
}

impl DisputeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Uma disputa aberta por pedido: o índice único parcial vira DisputeAlreadyOpen
    pub async fn create_dispute<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        opened_by: Uuid,
        reason: &str,
    ) -> Result<Dispute, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO disputes (order_id, opened_by, reason, status)
            VALUES ($1, $2, $3, 'open')
            RETURNING {DISPUTE_COLUMNS}
            "#
        );
        let dispute = sqlx::query_as::<_, Dispute>(&sql)
            .bind(order_id)
            .bind(opened_by)
            .bind(reason)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some("disputes_one_open_per_order")
                    {
                        return AppError::DisputeAlreadyOpen;
                    }
                }
                AppError::from(e)
            })?;

        Ok(dispute)
    }

    pub async fn has_open_dispute<'e, E>(&self, executor: E, order_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM disputes WHERE order_id = $1 AND status = 'open')",
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn find_dispute<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Dispute>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1");
        let dispute = sqlx::query_as::<_, Dispute>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(dispute)
    }

    pub async fn list_for_order<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<Dispute>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE order_id = $1 ORDER BY created_at DESC"
        );
        let disputes = sqlx::query_as::<_, Dispute>(&sql)
            .bind(order_id)
            .fetch_all(executor)
            .await?;

        Ok(disputes)
    }

    pub async fn list_disputes<'e, E>(
        &self,
        executor: E,
        status: Option<DisputeStatus>,
    ) -> Result<Vec<DisputeSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let disputes = sqlx::query_as::<_, DisputeSummary>(
            r#"
            SELECT
                d.id, d.order_id, d.opened_by, d.reason, d.status,
                d.created_at, d.resolved_at, d.resolved_by,
                o.order_number,
                p.full_name AS opened_by_name
            FROM disputes d
            JOIN orders o ON o.id = d.order_id
            LEFT JOIN profiles p ON p.id = d.opened_by
            WHERE ($1::dispute_status IS NULL OR d.status = $1)
            ORDER BY d.created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(disputes)
    }

    /// Fecha a disputa somente se ainda estiver `open`.
    pub async fn resolve_dispute<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        outcome: DisputeStatus,
        admin_id: Uuid,
    ) -> Result<Option<Dispute>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE disputes
            SET status = $2, resolved_at = NOW(), resolved_by = $3
            WHERE id = $1 AND status = 'open'
            RETURNING {DISPUTE_COLUMNS}
            "#
        );
        let dispute = sqlx::query_as::<_, Dispute>(&sql)
            .bind(id)
            .bind(outcome)
            .bind(admin_id)
            .fetch_optional(executor)
            .await?;

        Ok(dispute)
    }
}
