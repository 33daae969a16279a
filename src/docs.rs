// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Ponte API", description = "Intermediação de pagamentos Brasil ↔ China"),
    paths(
        // --- Public ---
        handlers::quote::health,
        handlers::quote::public_quote,

        // --- Auth ---
        handlers::auth::register_client,
        handlers::auth::register_supplier,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_approval,

        // --- Client ---
        handlers::client::client_home,
        handlers::client::client_quote,
        handlers::client::create_order,
        handlers::client::list_orders,
        handlers::client::confirm_order,

        // --- Supplier ---
        handlers::supplier::supplier_home,
        handlers::supplier::list_orders,
        handlers::supplier::ship_order,
        handlers::supplier::supplier_finance,
        handlers::supplier::request_withdrawal,

        // --- Orders ---
        handlers::orders::get_order,
        handlers::orders::open_dispute,

        // --- Admin ---
        handlers::admin::admin_home,
        handlers::admin::admin_finance,
        handlers::admin::list_clients,
        handlers::admin::update_fee_rate,
        handlers::admin::list_suppliers,
        handlers::admin::supplier_orders,
        handlers::admin::approve_supplier,
        handlers::admin::reject_supplier,
        handlers::admin::approve_withdrawal,
        handlers::admin::reject_withdrawal,
        handlers::admin::list_disputes,
        handlers::admin::resolve_dispute,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Landing,
            models::auth::RegisterClientPayload,
            models::auth::RegisterSupplierForm,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Profiles ---
            models::profile::UserType,
            models::profile::ApprovalStatus,
            models::profile::Profile,
            models::profile::ClientDetail,
            models::profile::SupplierDetail,
            models::profile::ClientSummary,
            models::profile::SupplierSummary,
            models::profile::MeResponse,
            models::profile::ApprovalStatusResponse,
            models::profile::UpdateFeeRatePayload,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderImage,
            models::order::OrderSummary,
            models::order::OrderWithImages,
            models::order::OrderDetail,
            models::order::CreateOrderPayload,
            models::order::ShipOrderForm,
            models::order::QuoteDirection,
            models::order::Quote,

            // --- Disputes ---
            models::dispute::DisputeStatus,
            models::dispute::Dispute,
            models::dispute::DisputeSummary,
            models::dispute::OpenDisputePayload,
            models::dispute::ResolveDisputePayload,

            // --- Finance ---
            models::finance::Transaction,
            models::finance::Withdrawal,
            models::finance::RequestWithdrawalPayload,
            models::finance::WithdrawalSummary,
            models::finance::TransactionSummary,
            models::finance::SupplierFinance,
            models::finance::AdminFinance,

            // --- Dashboard ---
            models::dashboard::AdminHome,
            models::dashboard::SupplierHome,
            models::dashboard::ClientHome,
        )
    ),
    tags(
        (name = "Public", description = "Saúde e calculadora de câmbio"),
        (name = "Auth", description = "Cadastro de clientes e fornecedores, login"),
        (name = "Users", description = "Dados do usuário logado"),
        (name = "Client", description = "Área do cliente (Brasil)"),
        (name = "Supplier", description = "Área do fornecedor (China)"),
        (name = "Orders", description = "Detalhe do pedido e disputas"),
        (name = "Admin", description = "Aprovações, saques, taxas e disputas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
