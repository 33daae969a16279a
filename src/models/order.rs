// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::dispute::Dispute;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,   // Aguardando envio
    Shipped,   // Enviado, aguardando confirmação do cliente
    Completed, // Recebido, valor liberado ao fornecedor
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
        }
    }

    /// Único próximo status possível: pending -> shipped -> completed.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }

    pub fn ensure_transition(self, target: OrderStatus) -> Result<(), AppError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }

    /// Disputas só podem ser abertas antes da liberação do valor.
    pub fn accepts_disputes(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Shipped)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = "ORD1718000000000")]
    pub order_number: String,
    pub client_id: Uuid,
    pub supplier_id: Uuid,

    // Valores congelados na criação
    #[schema(example = "1000.00")]
    pub amount_brl: Decimal,
    #[schema(example = "1349.00")]
    pub amount_cny: Decimal,
    #[schema(example = "5.00")]
    pub fee_rate: Decimal,
    #[schema(example = "50.00")]
    pub fee_amount: Decimal,
    #[schema(example = "1000.00")]
    pub total_amount: Decimal,

    pub status: OrderStatus,
    #[schema(example = "LP00123456789CN")]
    pub tracking_code: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderImage {
    pub id: Uuid,
    pub order_id: Uuid,
    #[schema(example = "http://localhost:3000/storage/order-images/.../foto.jpg")]
    pub image_url: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

// Pedido + nome da contraparte (cliente para o fornecedor, fornecedor para o cliente)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub counterparty_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithImages {
    #[serde(flatten)]
    pub order: OrderSummary,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub client_name: Option<String>,
    pub supplier_name: Option<String>,
    pub images: Vec<OrderImage>,
    pub disputes: Vec<Dispute>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    /// Código de 6 dígitos do fornecedor.
    #[validate(length(equal = 6, message = "O ID do fornecedor tem 6 dígitos."))]
    #[schema(example = "483920")]
    pub supplier_code: String,

    #[schema(example = "1000.00")]
    pub amount_brl: Decimal,
}

// Documentação do formulário multipart de envio
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ShipOrderForm {
    #[schema(example = "LP00123456789CN")]
    tracking_code: String,
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

// --- Cotação ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteDirection {
    #[default]
    BrlToCny,
    CnyToBrl,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    /// Valor de entrada (BRL em `brl_to_cny`, CNY em `cny_to_brl`).
    pub amount: Decimal,
    #[serde(default)]
    pub direction: QuoteDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[schema(example = "1000.00")]
    pub amount_brl: Decimal,
    #[schema(example = "5.00")]
    pub fee_rate: Decimal,
    #[schema(example = "50.00")]
    pub fee_amount: Decimal,
    #[schema(example = "1.42")]
    pub exchange_rate: Decimal,
    #[schema(example = "1349.00")]
    pub amount_cny: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Completed];

    #[test]
    fn only_forward_single_steps_are_allowed() {
        for from in ALL {
            for to in ALL {
                let expected = matches!(
                    (from, to),
                    (OrderStatus::Pending, OrderStatus::Shipped)
                        | (OrderStatus::Shipped, OrderStatus::Completed)
                );
                assert_eq!(from.can_transition_to(to), expected, "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn skipping_shipment_is_rejected() {
        let err = OrderStatus::Pending
            .ensure_transition(OrderStatus::Completed)
            .unwrap_err();
        match err {
            AppError::InvalidTransition { from, to } => {
                assert_eq!(from, "pending");
                assert_eq!(to, "completed");
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn completed_is_terminal() {
        assert_eq!(OrderStatus::Completed.next(), None);
        assert!(!OrderStatus::Completed.accepts_disputes());
        assert!(OrderStatus::Pending.accepts_disputes());
        assert!(OrderStatus::Shipped.accepts_disputes());
    }
}
