// src/services/order_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{order_repo::NewOrder, DisputeRepository, FinanceRepository, OrderRepository, ProfileRepository},
    models::{
        auth::Principal,
        finance::ORDER_RELEASE,
        order::{Order, OrderDetail, OrderImage, OrderStatus, OrderSummary, OrderWithImages},
        profile::{ApprovalStatus, SupplierDetail},
    },
    services::{
        fee_calculator::{quote_brl_to_cny, validate_money},
        storage::{discard_objects, order_image_key, sniff_image, ImageUpload, ObjectStorage},
    },
};

/// Pedido só pode ser criado para fornecedor existente e aprovado.
pub fn ensure_supplier_available(detail: Option<&SupplierDetail>) -> Result<&SupplierDetail, AppError> {
    match detail {
        Some(d) if d.approval_status == ApprovalStatus::Approved => Ok(d),
        _ => Err(AppError::SupplierNotAvailable),
    }
}

pub fn validate_order_amount(amount_brl: Decimal) -> Result<(), AppError> {
    if amount_brl <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(amount_brl.to_string()));
    }
    validate_money(amount_brl)
}

/// Código de rastreio não vazio e ao menos uma foto. Devolve o código aparado.
pub fn validate_shipment<'a>(tracking_code: &'a str, image_count: usize) -> Result<&'a str, AppError> {
    let tracking_code = tracking_code.trim();
    if tracking_code.is_empty() {
        return Err(AppError::MissingTrackingCode);
    }
    if image_count == 0 {
        return Err(AppError::MissingShipmentImages);
    }
    Ok(tracking_code)
}

pub fn generate_order_number() -> String {
    format!("ORD{}", Utc::now().timestamp_millis())
}

fn ensure_party(order: &Order, principal: &Principal) -> Result<(), AppError> {
    let is_party = order.client_id == principal.user_id || order.supplier_id == principal.user_id;
    if is_party || principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn attach_images(orders: Vec<OrderSummary>, images: Vec<OrderImage>) -> Vec<OrderWithImages> {
    let mut by_order: HashMap<Uuid, Vec<String>> = HashMap::new();
    for image in images {
        by_order.entry(image.order_id).or_default().push(image.image_url);
    }
    orders
        .into_iter()
        .map(|order| {
            let images = by_order.remove(&order.order.id).unwrap_or_default();
            OrderWithImages { order, images }
        })
        .collect()
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    profile_repo: ProfileRepository,
    finance_repo: FinanceRepository,
    dispute_repo: DisputeRepository,
    storage: Arc<dyn ObjectStorage>,
    exchange_rate: Decimal,
    max_upload_bytes: usize,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        profile_repo: ProfileRepository,
        finance_repo: FinanceRepository,
        dispute_repo: DisputeRepository,
        storage: Arc<dyn ObjectStorage>,
        exchange_rate: Decimal,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            order_repo,
            profile_repo,
            finance_repo,
            dispute_repo,
            storage,
            exchange_rate,
            max_upload_bytes,
        }
    }

    // =========================================================================
    //  CRIAÇÃO (cliente)
    // =========================================================================

    pub async fn create_order<'e, A>(
        &self,
        executor: A,
        client: &Principal,
        supplier_code: &str,
        amount_brl: Decimal,
    ) -> Result<Order, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        validate_order_amount(amount_brl)?;
        let mut tx = executor.begin().await?;

        let supplier = self
            .profile_repo
            .find_supplier_by_code(&mut *tx, supplier_code.trim())
            .await?;
        let supplier = ensure_supplier_available(supplier.as_ref())?;

        // A taxa do cliente é copiada e congelada no pedido
        let client_detail = self
            .profile_repo
            .find_client_detail(&mut *tx, client.user_id)
            .await?
            .ok_or(AppError::Forbidden)?;
        let quote = quote_brl_to_cny(amount_brl, client_detail.custom_fee_rate, self.exchange_rate)?;

        let new_order = NewOrder {
            order_number: generate_order_number(),
            client_id: client.user_id,
            supplier_id: supplier.user_id,
            amount_brl: quote.amount_brl,
            amount_cny: quote.amount_cny,
            fee_rate: quote.fee_rate,
            fee_amount: quote.fee_amount,
            total_amount: quote.amount_brl,
        };
        let order = self.order_repo.create_order(&mut *tx, &new_order).await?;

        tx.commit().await?;

        tracing::info!(
            "🧾 Pedido {} criado: cliente {} -> fornecedor {} (R$ {} / ¥ {})",
            order.order_number,
            order.client_id,
            order.supplier_id,
            order.amount_brl,
            order.amount_cny
        );
        Ok(order)
    }

    // =========================================================================
    //  ENVIO (fornecedor)
    // =========================================================================

    /// Confere, grava as fotos e só então muda o status. Se o banco falhar as
    /// fotos gravadas são removidas.
    pub async fn ship_order<'e, A>(
        &self,
        executor: A,
        supplier: &Principal,
        order_id: Uuid,
        tracking_code: &str,
        images: Vec<Vec<u8>>,
    ) -> Result<Order, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let tracking_code = validate_shipment(tracking_code, images.len())?;
        let uploads = images
            .into_iter()
            .map(|bytes| sniff_image(bytes, self.max_upload_bytes))
            .collect::<Result<Vec<ImageUpload>, AppError>>()?;

        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .lock_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("order".to_string()))?;
        if order.supplier_id != supplier.user_id {
            return Err(AppError::Forbidden);
        }
        order.status.ensure_transition(OrderStatus::Shipped)?;

        let mut keys = Vec::with_capacity(uploads.len());
        let mut urls = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let key = order_image_key(order_id, upload.extension);
            match self.storage.put(&key, &upload.bytes).await {
                Ok(url) => {
                    keys.push(key);
                    urls.push(url);
                }
                Err(e) => {
                    discard_objects(self.storage.as_ref(), &keys).await;
                    return Err(e);
                }
            }
        }

        let persisted = async {
            self.order_repo.add_images(&mut *tx, order_id, &urls).await?;
            let shipped = self
                .order_repo
                .mark_shipped(&mut *tx, order_id, tracking_code)
                .await?
                .ok_or(AppError::InvalidTransition {
                    from: order.status.as_str().to_string(),
                    to: OrderStatus::Shipped.as_str().to_string(),
                })?;
            tx.commit().await?;
            Ok::<Order, AppError>(shipped)
        }
        .await;

        match persisted {
            Ok(shipped) => {
                tracing::info!(
                    "🚚 Pedido {} enviado com {} foto(s), rastreio {}",
                    shipped.order_number,
                    urls.len(),
                    tracking_code
                );
                Ok(shipped)
            }
            Err(e) => {
                discard_objects(self.storage.as_ref(), &keys).await;
                Err(e)
            }
        }
    }

    // =========================================================================
    //  CONFIRMAÇÃO DE RECEBIMENTO (cliente)
    // =========================================================================

    /// shipped -> completed e lançamento `order_release` na mesma transação.
    pub async fn confirm_receipt<'e, A>(
        &self,
        executor: A,
        client: &Principal,
        order_id: Uuid,
    ) -> Result<Order, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .lock_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("order".to_string()))?;
        if order.client_id != client.user_id {
            return Err(AppError::Forbidden);
        }
        order.status.ensure_transition(OrderStatus::Completed)?;

        if self.dispute_repo.has_open_dispute(&mut *tx, order_id).await? {
            return Err(AppError::OrderHasOpenDispute);
        }

        let completed = self
            .order_repo
            .mark_completed(&mut *tx, order_id)
            .await?
            .ok_or(AppError::AlreadyProcessed)?;
        self.finance_repo
            .insert_transaction(
                &mut *tx,
                Some(completed.id),
                completed.supplier_id,
                completed.amount_cny,
                ORDER_RELEASE,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Pedido {} concluído, ¥ {} liberados ao fornecedor {}",
            completed.order_number,
            completed.amount_cny,
            completed.supplier_id
        );
        Ok(completed)
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn list_client_orders<'e, A>(
        &self,
        executor: A,
        client: &Principal,
    ) -> Result<Vec<OrderWithImages>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let orders = self.order_repo.list_for_client(&mut *conn, client.user_id).await?;
        self.with_images(&mut *conn, orders).await
    }

    pub async fn list_supplier_orders<'e, A>(
        &self,
        executor: A,
        supplier_user_id: Uuid,
    ) -> Result<Vec<OrderWithImages>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let orders = self.order_repo.list_for_supplier(&mut *conn, supplier_user_id).await?;
        self.with_images(&mut *conn, orders).await
    }

    async fn with_images(
        &self,
        conn: &mut sqlx::PgConnection,
        orders: Vec<OrderSummary>,
    ) -> Result<Vec<OrderWithImages>, AppError> {
        let ids: Vec<Uuid> = orders.iter().map(|o| o.order.id).collect();
        let images = if ids.is_empty() {
            Vec::new()
        } else {
            self.order_repo.list_images_for_orders(&mut *conn, &ids).await?
        };
        Ok(attach_images(orders, images))
    }

    /// Detalhe para qualquer parte do pedido ou admin.
    pub async fn get_order_detail<'e, A>(
        &self,
        executor: A,
        principal: &Principal,
        order_id: Uuid,
    ) -> Result<OrderDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let order = self
            .order_repo
            .find_order(&mut *conn, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("order".to_string()))?;
        ensure_party(&order, principal)?;

        let names = self.order_repo.find_party_names(&mut *conn, &order).await?;
        let images = self.order_repo.list_images(&mut *conn, order_id).await?;
        let disputes = self.dispute_repo.list_for_order(&mut *conn, order_id).await?;

        Ok(OrderDetail {
            header: order,
            client_name: names.client_name,
            supplier_name: names.supplier_name,
            images,
            disputes,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use rust_decimal_macros::dec;

    fn supplier(status: ApprovalStatus) -> SupplierDetail {
        SupplierDetail {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            supplier_id: "483920".to_string(),
            approval_status: status,
            alipay_qr_code_url: None,
            contact_info: None,
            approved_at: None,
            approved_by: None,
            created_at: None,
        }
    }

    fn order(client_id: Uuid, supplier_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD1".to_string(),
            client_id,
            supplier_id,
            amount_brl: dec!(1000),
            amount_cny: dec!(1349),
            fee_rate: dec!(5),
            fee_amount: dec!(50),
            total_amount: dec!(1000),
            status: OrderStatus::Pending,
            tracking_code: None,
            created_at: None,
            shipped_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn only_approved_suppliers_receive_orders() {
        let approved = supplier(ApprovalStatus::Approved);
        assert!(ensure_supplier_available(Some(&approved)).is_ok());

        for status in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
            let s = supplier(status);
            assert!(matches!(
                ensure_supplier_available(Some(&s)),
                Err(AppError::SupplierNotAvailable)
            ));
        }
        assert!(matches!(ensure_supplier_available(None), Err(AppError::SupplierNotAvailable)));
    }

    #[test]
    fn shipment_needs_tracking_code_and_photo() {
        assert_eq!(validate_shipment("  LP001CN ", 1).unwrap(), "LP001CN");
        assert!(matches!(validate_shipment("   ", 2), Err(AppError::MissingTrackingCode)));
        assert!(matches!(validate_shipment("LP001CN", 0), Err(AppError::MissingShipmentImages)));
    }

    #[test]
    fn order_amount_must_be_positive() {
        assert!(validate_order_amount(dec!(0.01)).is_ok());
        assert!(matches!(validate_order_amount(Decimal::ZERO), Err(AppError::InvalidAmount(_))));
        assert!(matches!(validate_order_amount(dec!(-5)), Err(AppError::InvalidAmount(_))));
    }

    #[test]
    fn order_amount_must_fit_the_ledger() {
        assert!(validate_order_amount(dec!(999999999999.99)).is_ok());
        // 0.001 viraria 0.00 no banco
        assert!(matches!(validate_order_amount(dec!(0.001)), Err(AppError::InvalidAmount(_))));
        assert!(matches!(
            validate_order_amount(dec!(10000000000000)),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn order_number_has_prefix_and_millis() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD"));
        assert!(number[3..].parse::<i64>().is_ok());
    }

    #[test]
    fn only_parties_and_admin_see_an_order() {
        let client_id = Uuid::new_v4();
        let supplier_id = Uuid::new_v4();
        let o = order(client_id, supplier_id);

        let as_client = Principal { user_id: client_id, role: UserRole::Client, approval_status: None };
        let as_admin = Principal { user_id: Uuid::new_v4(), role: UserRole::Admin, approval_status: None };
        let stranger = Principal { user_id: Uuid::new_v4(), role: UserRole::Client, approval_status: None };

        assert!(ensure_party(&o, &as_client).is_ok());
        assert!(ensure_party(&o, &as_admin).is_ok());
        assert!(matches!(ensure_party(&o, &stranger), Err(AppError::Forbidden)));
    }

    #[test]
    fn images_are_grouped_by_order() {
        let a = order(Uuid::new_v4(), Uuid::new_v4());
        let b = order(Uuid::new_v4(), Uuid::new_v4());
        let image = OrderImage {
            id: Uuid::new_v4(),
            order_id: a.id,
            image_url: "http://x/storage/order-images/a/1.png".to_string(),
            uploaded_at: None,
        };
        let summaries = vec![
            OrderSummary { order: a.clone(), counterparty_name: None },
            OrderSummary { order: b.clone(), counterparty_name: None },
        ];

        let result = attach_images(summaries, vec![image]);
        assert_eq!(result[0].images.len(), 1);
        assert!(result[1].images.is_empty());
    }
}
