// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::order::Quote;

// Cards do topo do painel do admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminHome {
    pub today_total: Decimal,
    pub week_total: Decimal,
    pub month_total: Decimal,
    pub open_orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierHome {
    #[schema(example = "483920")]
    pub supplier_code: String,
    pub pending_orders: i64,
    pub to_release: Decimal,
    pub today_earnings: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientHome {
    pub custom_fee_rate: Decimal,
    pub exchange_rate: Decimal,
    /// Cotação de exemplo (R$ 1000) com a taxa do cliente.
    pub sample_quote: Quote,
}
