// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::AdminHome};

/// Início de cada janela dos cards do painel.
#[derive(Debug, Clone, Copy)]
pub struct Windows {
    pub today: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplierCounters {
    pub pending_orders: i64,
    pub to_release: Decimal,
    pub today_earnings: Decimal,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Cards do admin (leitura consistente dentro de uma transação)
    pub async fn admin_summary<'e, A>(&self, executor: A, windows: Windows) -> Result<AdminHome, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let totals: (Decimal, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE created_at >= $1), 0),
                COALESCE(SUM(amount) FILTER (WHERE created_at >= $2), 0),
                COALESCE(SUM(amount) FILTER (WHERE created_at >= $3), 0)
            FROM transactions
            "#,
        )
        .bind(windows.today)
        .bind(windows.week)
        .bind(windows.month)
        .fetch_one(&mut *tx)
        .await?;

        let open_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE status IN ('pending', 'shipped')",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AdminHome {
            today_total: totals.0,
            week_total: totals.1,
            month_total: totals.2,
            open_orders,
        })
    }

    // 2. Contadores do fornecedor
    pub async fn supplier_counters<'e, A>(
        &self,
        executor: A,
        supplier_id: Uuid,
        today: DateTime<Utc>,
    ) -> Result<SupplierCounters, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (pending_orders, to_release): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending'),
                COALESCE(SUM(amount_cny) FILTER (WHERE status = 'shipped'), 0)
            FROM orders
            WHERE supplier_id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_one(&mut *tx)
        .await?;

        let today_earnings: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE supplier_id = $1 AND created_at >= $2
            "#,
        )
        .bind(supplier_id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SupplierCounters {
            pending_orders,
            to_release,
            today_earnings,
        })
    }
}
