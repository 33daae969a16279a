// tests/workflow_tests.rs
// Fluxo completo contra um Postgres real (TEST_DATABASE_URL).
// cargo test -- --ignored

use ponte_backend::{
    common::error::AppError,
    config::{AppState, Config},
    models::{
        auth::{Landing, Principal, RegisterClientPayload, RegisterSupplierPayload},
        dispute::DisputeStatus,
        order::{OrderStatus, QuoteDirection},
        profile::ApprovalStatus,
    },
};
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

// Cabeçalho PNG basta para a detecção de formato
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct Harness {
    state: AppState,
    _storage: tempfile::TempDir,
}

async fn harness() -> Harness {
    let database_url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL não definida");
    let storage = tempfile::tempdir().unwrap();

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "segredo-de-teste".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 5,
        exchange_rate: dec!(1.42),
        default_fee_rate: dec!(5),
        storage_dir: storage.path().to_string_lossy().to_string(),
        public_base_url: "http://localhost:3000".to_string(),
        max_upload_bytes: 1024 * 1024,
        jwt_ttl_days: 7,
        admin_email: None,
        admin_password: None,
        cors_allowed_origins: Vec::new(),
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&database_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    Harness {
        state: AppState::new(config, pool),
        _storage: storage,
    }
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@teste.com", prefix, Uuid::new_v4().simple())
}

fn unique_cpf() -> String {
    format!("{:011}", Uuid::new_v4().as_u128() % 100_000_000_000)
}

async fn principal(state: &AppState, token: &str) -> Principal {
    state.auth_service.principal_from_token(token).await.unwrap()
}

async fn admin(state: &AppState) -> Principal {
    let email = unique_email("admin");
    state.auth_service.ensure_admin(&email, "admin123").await.unwrap();
    let auth = state.auth_service.login_user(&email, "admin123").await.unwrap();
    assert_eq!(auth.landing, Landing::AdminDashboard);
    principal(state, &auth.token).await
}

async fn client(state: &AppState) -> Principal {
    let auth = state
        .auth_service
        .register_client(RegisterClientPayload {
            full_name: "Maria Souza".to_string(),
            email: unique_email("cliente"),
            phone: "+55 11 99999-8888".to_string(),
            cpf: unique_cpf(),
            password: "segredo123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(auth.landing, Landing::ClientDashboard);
    principal(state, &auth.token).await
}

/// Fornecedor cadastrado e aprovado; devolve também o código público.
async fn approved_supplier(state: &AppState, admin: &Principal) -> (Principal, String) {
    let auth = state
        .auth_service
        .register_supplier(
            RegisterSupplierPayload {
                full_name: "Li Wei".to_string(),
                email: unique_email("fornecedor"),
                phone: "+86 138 0000 0000".to_string(),
                password: "segredo123".to_string(),
            },
            Some(PNG.to_vec()),
        )
        .await
        .unwrap();
    assert_eq!(auth.landing, Landing::WaitingApproval);
    let pending = principal(state, &auth.token).await;

    let detail = state
        .onboarding_service
        .list_suppliers(&state.db_pool, Some(ApprovalStatus::Pending))
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.user_id == pending.user_id)
        .unwrap();

    let decided = state
        .onboarding_service
        .decide_supplier(&state.db_pool, admin, detail.id, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(decided.approval_status, ApprovalStatus::Approved);

    (principal(state, &auth.token).await, detail.supplier_id)
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn order_goes_from_creation_to_release_and_withdrawal() {
    let h = harness().await;
    let state = &h.state;
    let pool = &state.db_pool;

    let admin = admin(state).await;
    let client = client(state).await;
    let (supplier, code) = approved_supplier(state, &admin).await;

    let order = state
        .order_service
        .create_order(pool, &client, &code, dec!(1000))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.fee_amount, dec!(50.00));
    assert_eq!(order.amount_cny, dec!(1349.00));

    // Confirmar antes do envio é transição inválida
    let early = state.order_service.confirm_receipt(pool, &client, order.id).await;
    assert!(matches!(early, Err(AppError::InvalidTransition { .. })));

    let shipped = state
        .order_service
        .ship_order(pool, &supplier, order.id, "  LP00123456789CN ", vec![PNG.to_vec(), PNG.to_vec()])
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.tracking_code.as_deref(), Some("LP00123456789CN"));

    let detail = state.order_service.get_order_detail(pool, &client, order.id).await.unwrap();
    assert_eq!(detail.images.len(), 2);

    let finance = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    assert_eq!(finance.to_release, dec!(1349.00));
    assert_eq!(finance.available, dec!(0));

    let completed = state.order_service.confirm_receipt(pool, &client, order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    // Segunda confirmação não libera de novo
    let again = state.order_service.confirm_receipt(pool, &client, order.id).await;
    assert!(again.is_err());

    let finance = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    assert_eq!(finance.available, dec!(1349.00));
    assert_eq!(finance.to_release, dec!(0));

    let too_much = state.finance_service.request_withdrawal(pool, &supplier, dec!(1349.01)).await;
    assert!(matches!(too_much, Err(AppError::InsufficientBalance)));

    let withdrawal = state
        .finance_service
        .request_withdrawal(pool, &supplier, dec!(1000))
        .await
        .unwrap();
    assert_eq!(withdrawal.status, ApprovalStatus::Pending);

    // Pendente já reserva o saldo
    let over_reserved = state.finance_service.request_withdrawal(pool, &supplier, dec!(400)).await;
    assert!(matches!(over_reserved, Err(AppError::InsufficientBalance)));

    let approved = state
        .finance_service
        .decide_withdrawal(pool, &admin, withdrawal.id, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, ApprovalStatus::Approved);

    let twice = state
        .finance_service
        .decide_withdrawal(pool, &admin, withdrawal.id, ApprovalStatus::Rejected)
        .await;
    assert!(twice.is_err());

    let finance = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    assert_eq!(finance.available, dec!(349.00));

    // Saque rejeitado devolve o saldo reservado
    let before = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    let refused = state
        .finance_service
        .request_withdrawal(pool, &supplier, dec!(200))
        .await
        .unwrap();
    let reserved = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    assert_eq!(reserved.pending_withdrawals, before.pending_withdrawals + dec!(200));

    let rejected = state
        .finance_service
        .decide_withdrawal(pool, &admin, refused.id, ApprovalStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, ApprovalStatus::Rejected);
    assert_eq!(rejected.processed_by, Some(admin.user_id));
    assert!(rejected.processed_at.is_some());

    let after = state.finance_service.supplier_finance(pool, &supplier).await.unwrap();
    assert_eq!(after.available, before.available);
    assert_eq!(
        after.available - after.pending_withdrawals,
        before.available - before.pending_withdrawals
    );

    let dust = state.finance_service.request_withdrawal(pool, &supplier, dec!(0.001)).await;
    assert!(matches!(dust, Err(AppError::InvalidAmount(_))));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn fee_rate_of_one_hundred_is_stored_and_quoted() {
    let h = harness().await;
    let state = &h.state;
    let pool = &state.db_pool;

    let admin = admin(state).await;
    let client = client(state).await;

    let detail = state
        .onboarding_service
        .list_clients(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.user_id == client.user_id)
        .unwrap();

    // 99.995 arredonda para o teto
    let updated = state
        .onboarding_service
        .update_client_fee_rate(pool, &admin, detail.id, dec!(99.995))
        .await
        .unwrap();
    assert_eq!(updated.custom_fee_rate, dec!(100.00));

    let quote = state
        .dashboard_service
        .client_quote(pool, &client, dec!(500), QuoteDirection::BrlToCny)
        .await
        .unwrap();
    assert_eq!(quote.fee_amount, dec!(500.00));
    assert_eq!(quote.amount_cny, dec!(0));

    let over = state
        .onboarding_service
        .update_client_fee_rate(pool, &admin, detail.id, dec!(100.01))
        .await;
    assert!(matches!(over, Err(AppError::InvalidFeeRate)));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn open_dispute_blocks_confirmation_until_resolved() {
    let h = harness().await;
    let state = &h.state;
    let pool = &state.db_pool;

    let admin = admin(state).await;
    let client = client(state).await;
    let (supplier, code) = approved_supplier(state, &admin).await;

    let order = state
        .order_service
        .create_order(pool, &client, &code, dec!(200))
        .await
        .unwrap();
    state
        .order_service
        .ship_order(pool, &supplier, order.id, "LP1", vec![PNG.to_vec()])
        .await
        .unwrap();

    let dispute = state
        .dispute_service
        .open_dispute(pool, &client, order.id, "Mercadoria danificada")
        .await
        .unwrap();
    assert_eq!(dispute.status, DisputeStatus::Open);

    let duplicate = state
        .dispute_service
        .open_dispute(pool, &supplier, order.id, "Cliente não retirou")
        .await;
    assert!(matches!(duplicate, Err(AppError::DisputeAlreadyOpen)));

    let blocked = state.order_service.confirm_receipt(pool, &client, order.id).await;
    assert!(matches!(blocked, Err(AppError::OrderHasOpenDispute)));

    let resolved = state
        .dispute_service
        .resolve_dispute(pool, &admin, dispute.id, DisputeStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(resolved.status, DisputeStatus::Resolved);

    let completed = state.order_service.confirm_receipt(pool, &client, order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    let late = state
        .dispute_service
        .open_dispute(pool, &client, order.id, "Arrependimento")
        .await;
    assert!(matches!(late, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn pending_supplier_cannot_receive_orders_and_duplicates_are_rejected() {
    let h = harness().await;
    let state = &h.state;
    let pool = &state.db_pool;

    let email = unique_email("fornecedor");
    let auth = state
        .auth_service
        .register_supplier(
            RegisterSupplierPayload {
                full_name: "Zhang San".to_string(),
                email: email.clone(),
                phone: "+86 139 0000 0000".to_string(),
                password: "segredo123".to_string(),
            },
            Some(PNG.to_vec()),
        )
        .await
        .unwrap();
    let pending = principal(state, &auth.token).await;
    let detail = state
        .onboarding_service
        .list_suppliers(pool, Some(ApprovalStatus::Pending))
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.user_id == pending.user_id)
        .unwrap();

    let client = client(state).await;
    let refused = state
        .order_service
        .create_order(pool, &client, &detail.supplier_id, dec!(100))
        .await;
    assert!(refused.is_err());

    let duplicate = state
        .auth_service
        .register_supplier(
            RegisterSupplierPayload {
                full_name: "Outro".to_string(),
                email,
                phone: "+86 139 0000 0001".to_string(),
                password: "segredo123".to_string(),
            },
            Some(PNG.to_vec()),
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::EmailAlreadyExists)));

    let missing_qr = state
        .auth_service
        .register_supplier(
            RegisterSupplierPayload {
                full_name: "Sem QR".to_string(),
                email: unique_email("fornecedor"),
                phone: "+86 139 0000 0002".to_string(),
                password: "segredo123".to_string(),
            },
            None,
        )
        .await;
    assert!(matches!(missing_qr, Err(AppError::MissingQrCode)));
}
