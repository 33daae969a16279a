// src/db/profile_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{
        ApprovalStatus, ClientDetail, ClientSummary, Profile, SupplierDetail, SupplierSummary,
        UserType,
    },
};

const SUPPLIER_COLUMNS: &str = r#"
    id, user_id, supplier_id, approval_status, alipay_qr_code_url,
    contact_info, approved_at, approved_by, created_at
"#;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PERFIS
    // =========================================================================

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        full_name: &str,
        email: &str,
        phone: &str,
        user_type: UserType,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, full_name, email, phone, user_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, full_name, email, phone, user_type, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(user_type)
        .fetch_one(executor)
        .await?;

        Ok(profile)
    }

    pub async fn find_profile<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, email, phone, user_type, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(profile)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_client_detail<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        cpf: &str,
        fee_rate: Decimal,
    ) -> Result<ClientDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, ClientDetail>(
            r#"
            INSERT INTO client_details (user_id, cpf, custom_fee_rate)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, cpf, custom_fee_rate, created_at
            "#,
        )
        .bind(user_id)
        .bind(cpf)
        .bind(fee_rate)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("client_details_cpf_key") {
                    return AppError::DocumentAlreadyExists;
                }
            }
            AppError::from(e)
        })?;

        Ok(detail)
    }

    pub async fn find_client_detail<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<ClientDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, ClientDetail>(
            "SELECT id, user_id, cpf, custom_fee_rate, created_at FROM client_details WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<ClientSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, ClientSummary>(
            r#"
            SELECT
                c.id, c.user_id, c.cpf, c.custom_fee_rate,
                p.full_name, p.email, p.phone,
                (SELECT COUNT(*) FROM orders o WHERE o.client_id = c.user_id) AS order_count,
                c.created_at
            FROM client_details c
            JOIN profiles p ON p.id = c.user_id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(clients)
    }

    /// Altera a taxa do cliente; pedidos já criados mantêm a taxa congelada.
    pub async fn update_fee_rate<'e, E>(
        &self,
        executor: E,
        client_detail_id: Uuid,
        fee_rate: Decimal,
    ) -> Result<Option<ClientDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, ClientDetail>(
            r#"
            UPDATE client_details SET custom_fee_rate = $2
            WHERE id = $1
            RETURNING id, user_id, cpf, custom_fee_rate, created_at
            "#,
        )
        .bind(client_detail_id)
        .bind(fee_rate)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    // O código público de 6 dígitos é sorteado pelo banco (generate_supplier_id)
    pub async fn create_supplier_detail<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        alipay_qr_code_url: &str,
        contact_info: &str,
    ) -> Result<SupplierDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO supplier_details (user_id, supplier_id, alipay_qr_code_url, contact_info, approval_status)
            VALUES ($1, generate_supplier_id(), $2, $3, 'pending')
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(user_id)
            .bind(alipay_qr_code_url)
            .bind(contact_info)
            .fetch_one(executor)
            .await?;

        Ok(detail)
    }

    pub async fn find_supplier_detail<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<SupplierDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM supplier_details WHERE user_id = $1");
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(detail)
    }

    pub async fn find_supplier_by_code<'e, E>(
        &self,
        executor: E,
        supplier_code: &str,
    ) -> Result<Option<SupplierDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM supplier_details WHERE supplier_id = $1");
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(supplier_code)
            .fetch_optional(executor)
            .await?;

        Ok(detail)
    }

    /// Trava a linha do fornecedor até o fim da transação. Serializa as
    /// operações que dependem do saldo (pedido e aprovação de saque).
    pub async fn lock_supplier<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<SupplierDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM supplier_details WHERE user_id = $1 FOR UPDATE");
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(detail)
    }

    pub async fn find_supplier_detail_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<SupplierDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM supplier_details WHERE id = $1");
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(detail)
    }

    pub async fn list_suppliers<'e, E>(
        &self,
        executor: E,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<SupplierSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers = sqlx::query_as::<_, SupplierSummary>(
            r#"
            SELECT
                s.id, s.user_id, s.supplier_id, s.approval_status, s.alipay_qr_code_url,
                p.full_name, p.email, p.phone,
                s.approved_at, s.created_at
            FROM supplier_details s
            JOIN profiles p ON p.id = s.user_id
            WHERE ($1::approval_status IS NULL OR s.approval_status = $1)
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(suppliers)
    }

    /// Aplica a decisão do admin apenas se o cadastro ainda estiver `pending`.
    /// `None` significa que outro admin decidiu antes (ou o id não existe).
    pub async fn decide_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        decision: ApprovalStatus,
        admin_id: Uuid,
    ) -> Result<Option<SupplierDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE supplier_details
            SET approval_status = $2, approved_at = NOW(), approved_by = $3
            WHERE id = $1 AND approval_status = 'pending'
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        let detail = sqlx::query_as::<_, SupplierDetail>(&sql)
            .bind(id)
            .bind(decision)
            .bind(admin_id)
            .fetch_optional(executor)
            .await?;

        Ok(detail)
    }
}
