// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, UserRepository},
    models::{
        auth::{
            AuthResponse, Claims, Landing, Principal, RegisterClientPayload, RegisterSupplierPayload,
            User, UserRole,
        },
        profile::{ApprovalStatus, ApprovalStatusResponse, MeResponse, SupplierDetail, UserType},
    },
    services::storage::{discard_objects, qr_code_key, sniff_image, ObjectStorage},
};

/// Para onde levar o usuário depois do login. Fornecedor rejeitado não entra.
pub fn landing_for(role: UserRole, approval: Option<ApprovalStatus>) -> Result<Landing, AppError> {
    match role {
        UserRole::Admin => Ok(Landing::AdminDashboard),
        UserRole::Client => Ok(Landing::ClientDashboard),
        UserRole::Supplier => match approval {
            Some(ApprovalStatus::Approved) => Ok(Landing::SupplierDashboard),
            Some(ApprovalStatus::Rejected) => Err(AppError::AccountRejected),
            Some(ApprovalStatus::Pending) | None => Ok(Landing::WaitingApproval),
        },
    }
}

pub fn encode_token(secret: &str, user_id: Uuid, role: UserRole, ttl_days: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(ttl_days);

    let claims = Claims {
        sub: user_id,
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    storage: Arc<dyn ObjectStorage>,
    pool: PgPool,
    jwt_secret: String,
    jwt_ttl_days: i64,
    default_fee_rate: Decimal,
    max_upload_bytes: usize,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        storage: Arc<dyn ObjectStorage>,
        pool: PgPool,
        jwt_secret: String,
        jwt_ttl_days: i64,
        default_fee_rate: Decimal,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            storage,
            pool,
            jwt_secret,
            jwt_ttl_days,
            default_fee_rate,
            max_upload_bytes,
        }
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    pub async fn register_client(&self, payload: RegisterClientPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;
        let email = payload.email.trim().to_lowercase();
        let hashed_password = hash_password(&payload.password).await?;

        // Usuário, perfil e detalhe do cliente entram juntos ou não entram
        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, &email, &hashed_password, UserRole::Client)
            .await?;
        self.profile_repo
            .create_profile(&mut *tx, user.id, payload.full_name.trim(), &email, payload.phone.trim(), UserType::Client)
            .await?;
        self.profile_repo
            .create_client_detail(&mut *tx, user.id, payload.cpf.trim(), self.default_fee_rate)
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Cliente cadastrado: {}", user.id);
        self.auth_response(&user, Landing::ClientDashboard)
    }

    /// Fornecedor entra como `pending` e fica na tela de espera até o admin decidir.
    pub async fn register_supplier(
        &self,
        payload: RegisterSupplierPayload,
        alipay_qr_code: Option<Vec<u8>>,
    ) -> Result<AuthResponse, AppError> {
        payload.validate()?;
        let qr_bytes = alipay_qr_code.ok_or(AppError::MissingQrCode)?;
        let qr_image = sniff_image(qr_bytes, self.max_upload_bytes)?;
        let email = payload.email.trim().to_lowercase();
        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(&mut *tx, &email, &hashed_password, UserRole::Supplier)
            .await?;

        let key = qr_code_key(user.id, qr_image.extension);
        let qr_url = self.storage.put(&key, &qr_image.bytes).await?;

        let detail = match self.persist_supplier(tx, user.id, &payload, &email, &qr_url).await {
            Ok(detail) => detail,
            Err(e) => {
                discard_objects(self.storage.as_ref(), std::slice::from_ref(&key)).await;
                return Err(e);
            }
        };

        tracing::info!(
            "🏭 Fornecedor cadastrado: {} (código {}), aguardando aprovação",
            user.id,
            detail.supplier_id
        );
        self.auth_response(&user, Landing::WaitingApproval)
    }

    async fn persist_supplier(
        &self,
        mut tx: Transaction<'static, Postgres>,
        user_id: Uuid,
        payload: &RegisterSupplierPayload,
        email: &str,
        qr_url: &str,
    ) -> Result<SupplierDetail, AppError> {
        let phone = payload.phone.trim();
        self.profile_repo
            .create_profile(&mut *tx, user_id, payload.full_name.trim(), email, phone, UserType::Supplier)
            .await?;
        let detail = self
            .profile_repo
            .create_supplier_detail(&mut *tx, user_id, qr_url, phone)
            .await?;

        tx.commit().await?;
        Ok(detail)
    }

    // =========================================================================
    //  LOGIN / TOKEN
    // =========================================================================

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let email = email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let principal = self
            .user_repo
            .find_principal(user.id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let landing = landing_for(principal.role, principal.approval_status)?;

        self.auth_response(&user, landing)
    }

    /// Valida o token e relê papel e aprovação do banco.
    pub async fn principal_from_token(&self, token: &str) -> Result<Principal, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;
        self.user_repo
            .find_principal(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn auth_response(&self, user: &User, landing: Landing) -> Result<AuthResponse, AppError> {
        let token = encode_token(&self.jwt_secret, user.id, user.role, self.jwt_ttl_days)?;
        Ok(AuthResponse {
            token,
            role: user.role,
            landing,
        })
    }

    // =========================================================================
    //  USUÁRIO ATUAL
    // =========================================================================

    pub async fn me<'e, A>(&self, executor: A, principal: &Principal) -> Result<MeResponse, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let user = self
            .user_repo
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let profile = self.profile_repo.find_profile(&mut *tx, principal.user_id).await?;

        let mut response = MeResponse {
            id: user.id,
            role: user.role,
            email: user.email,
            profile,
            approval_status: None,
            supplier_code: None,
            custom_fee_rate: None,
        };

        match principal.role {
            UserRole::Client => {
                let detail = self.profile_repo.find_client_detail(&mut *tx, principal.user_id).await?;
                response.custom_fee_rate = detail.map(|d| d.custom_fee_rate);
            }
            UserRole::Supplier => {
                if let Some(detail) = self.profile_repo.find_supplier_detail(&mut *tx, principal.user_id).await? {
                    response.approval_status = Some(detail.approval_status);
                    response.supplier_code = Some(detail.supplier_id);
                }
            }
            UserRole::Admin => {}
        }

        tx.commit().await?;
        Ok(response)
    }

    // Consultado a cada 5 s pela tela de espera do fornecedor
    pub async fn approval_status<'e, E>(
        &self,
        executor: E,
        principal: &Principal,
    ) -> Result<ApprovalStatusResponse, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        if principal.role != UserRole::Supplier {
            return Err(AppError::Forbidden);
        }
        let detail = self
            .profile_repo
            .find_supplier_detail(executor, principal.user_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("supplier".to_string()))?;

        Ok(ApprovalStatusResponse {
            approval_status: detail.approval_status,
        })
    }

    // =========================================================================
    //  ADMIN INICIAL
    // =========================================================================

    /// Cria o admin configurado se ainda não existir. Rodar de novo não muda nada.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            if existing.role != UserRole::Admin {
                tracing::warn!("⚠️ ADMIN_EMAIL {} já pertence a um usuário {}", email, existing.role.as_str());
            }
            return Ok(());
        }

        let hashed_password = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(&self.pool, &email, &hashed_password, UserRole::Admin)
            .await?;

        tracing::info!("🔑 Admin inicial criado: {}", admin.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn landing_follows_role_and_approval() {
        assert_eq!(landing_for(UserRole::Client, None).unwrap(), Landing::ClientDashboard);
        assert_eq!(landing_for(UserRole::Admin, None).unwrap(), Landing::AdminDashboard);
        assert_eq!(
            landing_for(UserRole::Supplier, Some(ApprovalStatus::Approved)).unwrap(),
            Landing::SupplierDashboard
        );
        assert_eq!(
            landing_for(UserRole::Supplier, Some(ApprovalStatus::Pending)).unwrap(),
            Landing::WaitingApproval
        );
    }

    #[test]
    fn rejected_supplier_cannot_log_in() {
        assert!(matches!(
            landing_for(UserRole::Supplier, Some(ApprovalStatus::Rejected)),
            Err(AppError::AccountRejected)
        ));
    }

    #[test]
    fn token_carries_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = encode_token(SECRET, user_id, UserRole::Supplier, 7).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Supplier);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token("outro-segredo", Uuid::new_v4(), UserRole::Client, 7).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(SECRET, Uuid::new_v4(), UserRole::Client, -1).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_roundtrip() {
        let hashed = hash_password("segredo1").await.unwrap();
        assert!(verify_password("segredo1", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
