// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Order, OrderImage, OrderSummary},
};

const ORDER_COLUMNS: &str = r#"
    id, order_number, client_id, supplier_id,
    amount_brl, amount_cny, fee_rate, fee_amount, total_amount,
    status, tracking_code, created_at, shipped_at, completed_at
"#;

/// Valores já calculados (e congelados) de um novo pedido.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub client_id: Uuid,
    pub supplier_id: Uuid,
    pub amount_brl: Decimal,
    pub amount_cny: Decimal,
    pub fee_rate: Decimal,
    pub fee_amount: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, FromRow)]
pub struct PartyNames {
    pub client_name: Option<String>,
    pub supplier_name: Option<String>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn create_order<'e, E>(&self, executor: E, new_order: &NewOrder) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO orders (
                order_number, client_id, supplier_id,
                amount_brl, amount_cny, fee_rate, fee_amount, total_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(&new_order.order_number)
            .bind(new_order.client_id)
            .bind(new_order.supplier_id)
            .bind(new_order.amount_brl)
            .bind(new_order.amount_cny)
            .bind(new_order.fee_rate)
            .bind(new_order.fee_amount)
            .bind(new_order.total_amount)
            .fetch_one(executor)
            .await?;

        Ok(order)
    }

    pub async fn find_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    // Trava o pedido até o fim da transação (envio, confirmação, disputa)
    pub async fn lock_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    pub async fn find_party_names<'e, E>(&self, executor: E, order: &Order) -> Result<PartyNames, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let names = sqlx::query_as::<_, PartyNames>(
            r#"
            SELECT
                (SELECT full_name FROM profiles WHERE id = $1) AS client_name,
                (SELECT full_name FROM profiles WHERE id = $2) AS supplier_name
            "#,
        )
        .bind(order.client_id)
        .bind(order.supplier_id)
        .fetch_one(executor)
        .await?;

        Ok(names)
    }

    // Lista do cliente: contraparte é o fornecedor
    pub async fn list_for_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*, p.full_name AS counterparty_name
            FROM orders o
            LEFT JOIN profiles p ON p.id = o.supplier_id
            WHERE o.client_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;

        Ok(orders)
    }

    // Lista do fornecedor: contraparte é o cliente
    pub async fn list_for_supplier<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
    ) -> Result<Vec<OrderSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.*, p.full_name AS counterparty_name
            FROM orders o
            LEFT JOIN profiles p ON p.id = o.client_id
            WHERE o.supplier_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(supplier_id)
        .fetch_all(executor)
        .await?;

        Ok(orders)
    }

    /// pending -> shipped. `None` se o pedido não estava mais `pending`.
    pub async fn mark_shipped<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        tracking_code: &str,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = 'shipped', tracking_code = $2, shipped_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(tracking_code)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    /// shipped -> completed. `None` se o pedido não estava mais `shipped`.
    pub async fn mark_completed<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = 'completed', completed_at = NOW()
            WHERE id = $1 AND status = 'shipped'
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    // =========================================================================
    //  FOTOS
    // =========================================================================

    pub async fn add_images<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        image_urls: &[String],
    ) -> Result<Vec<OrderImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, OrderImage>(
            r#"
            INSERT INTO order_images (order_id, image_url)
            SELECT $1, url FROM UNNEST($2::text[]) AS url
            RETURNING id, order_id, image_url, uploaded_at
            "#,
        )
        .bind(order_id)
        .bind(image_urls)
        .fetch_all(executor)
        .await?;

        Ok(images)
    }

    pub async fn list_images<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, OrderImage>(
            r#"
            SELECT id, order_id, image_url, uploaded_at
            FROM order_images
            WHERE order_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(images)
    }

    // Fotos de vários pedidos de uma vez (lista do fornecedor/admin)
    pub async fn list_images_for_orders<'e, E>(
        &self,
        executor: E,
        order_ids: &[Uuid],
    ) -> Result<Vec<OrderImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, OrderImage>(
            r#"
            SELECT id, order_id, image_url, uploaded_at
            FROM order_images
            WHERE order_id = ANY($1)
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(executor)
        .await?;

        Ok(images)
    }
}
