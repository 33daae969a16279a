// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::profile::ApprovalStatus;

/// Tipo do lançamento gravado quando o cliente confirma o recebimento.
pub const ORDER_RELEASE: &str = "order_release";

// Lançamento do livro-razão (somente inserção)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub supplier_id: Uuid,
    #[schema(example = "1349.00")]
    pub amount: Decimal,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[schema(example = "order_release")]
    pub kind: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: Uuid,
    pub supplier_id: Uuid,
    #[schema(example = "200.00")]
    pub amount: Decimal,
    pub status: ApprovalStatus,
    pub requested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

/// Somatórios que definem o saldo de um fornecedor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct BalanceTotals {
    /// Σ amount_cny dos pedidos `completed`.
    pub completed_total: Decimal,
    /// Σ dos saques `approved`.
    pub approved_withdrawals: Decimal,
    /// Σ dos saques `pending`.
    pub pending_withdrawals: Decimal,
}

impl BalanceTotals {
    /// Saldo disponível: liberado menos já sacado.
    pub fn available(&self) -> Decimal {
        self.completed_total - self.approved_withdrawals
    }

    /// O que ainda pode ser pedido, descontando saques aguardando o admin.
    pub fn requestable(&self) -> Decimal {
        self.available() - self.pending_withdrawals
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithdrawalPayload {
    #[schema(example = "200.00")]
    pub amount: Decimal,
}

// Linha da tela financeira do admin (saque + dados de pagamento)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub withdrawal: Withdrawal,
    pub supplier_name: Option<String>,
    pub alipay_qr_code_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: Transaction,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFinance {
    #[schema(example = "2698.00")]
    pub week_total: Decimal,
    #[schema(example = "1349.00")]
    pub available: Decimal,
    #[schema(example = "500.00")]
    pub to_release: Decimal,
    #[schema(example = "200.00")]
    pub pending_withdrawals: Decimal,
    pub withdrawals: Vec<Withdrawal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminFinance {
    pub withdrawals: Vec<WithdrawalSummary>,
    pub transactions: Vec<TransactionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn available_is_released_minus_approved() {
        let totals = BalanceTotals {
            completed_total: dec!(2698.00),
            approved_withdrawals: dec!(1000.00),
            pending_withdrawals: dec!(300.00),
        };
        assert_eq!(totals.available(), dec!(1698.00));
        assert_eq!(totals.requestable(), dec!(1398.00));
    }

    #[test]
    fn empty_supplier_has_zero_balance() {
        assert_eq!(BalanceTotals::default().available(), Decimal::ZERO);
    }
}
