// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{DashboardRepository, DisputeRepository, FinanceRepository, OrderRepository, ProfileRepository, UserRepository},
    services::{
        auth::AuthService,
        dashboard_service::DashboardService,
        dispute_service::DisputeService,
        finance_service::FinanceService,
        onboarding_service::OnboardingService,
        order_service::OrderService,
        storage::{LocalStorage, ObjectStorage},
    },
};

/// Configuração lida do ambiente (.env opcional).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    /// CNY por 1 BRL.
    pub exchange_rate: Decimal,
    /// Taxa (%) dos clientes novos e da cotação pública.
    pub default_fee_rate: Decimal,
    pub storage_dir: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub jwt_ttl_days: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválido ({}): {}", name, raw, e)),
        _ => Ok(default),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let exchange_rate = var_or("EXCHANGE_RATE", Decimal::new(142, 2))?;
        if exchange_rate <= Decimal::ZERO {
            anyhow::bail!("EXCHANGE_RATE deve ser positivo");
        }
        let default_fee_rate = var_or("DEFAULT_FEE_RATE", Decimal::new(5, 0))?;
        if default_fee_rate < Decimal::ZERO || default_fee_rate >= Decimal::ONE_HUNDRED {
            anyhow::bail!("DEFAULT_FEE_RATE deve estar entre 0 e 100");
        }

        let cors_allowed_origins = optional_var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            exchange_rate,
            default_fee_rate,
            storage_dir: var_or("STORAGE_DIR", "./storage".to_string())?,
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:3000".to_string())?,
            max_upload_bytes: var_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            jwt_ttl_days: var_or("JWT_TTL_DAYS", 7)?,
            admin_email: optional_var("ADMIN_EMAIL"),
            admin_password: optional_var("ADMIN_PASSWORD"),
            cors_allowed_origins,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub order_service: OrderService,
    pub dispute_service: DisputeService,
    pub finance_service: FinanceService,
    pub onboarding_service: OnboardingService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Conecta ao banco e monta o estado.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::new(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn new(config: Config, db_pool: PgPool) -> Self {
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(LocalStorage::new(&config.storage_dir, &config.public_base_url));

        let user_repo = UserRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let dispute_repo = DisputeRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            profile_repo.clone(),
            storage.clone(),
            db_pool.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_days,
            config.default_fee_rate,
            config.max_upload_bytes,
        );
        let order_service = OrderService::new(
            order_repo.clone(),
            profile_repo.clone(),
            finance_repo.clone(),
            dispute_repo.clone(),
            storage,
            config.exchange_rate,
            config.max_upload_bytes,
        );
        let dispute_service = DisputeService::new(dispute_repo, order_repo);
        let finance_service = FinanceService::new(finance_repo, profile_repo.clone());
        let onboarding_service = OnboardingService::new(profile_repo.clone());
        let dashboard_service =
            DashboardService::new(dashboard_repo, profile_repo, config.exchange_rate, config.default_fee_rate);

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: I18nStore::new(),
            auth_service,
            order_service,
            dispute_service,
            finance_service,
            onboarding_service,
            dashboard_service,
        }
    }
}
