use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::models::auth::Principal;

// ---
// Helper RLS: a "chave" para o banco de dados
// ---
/// Abre a transação da requisição e publica quem está chamando.
/// `set_config(..., true)` só vale dentro da transação, por isso o helper
/// devolve a transação e o handler faz o commit no final.
pub(crate) async fn begin_rls_transaction(
    app_state: &AppState,
    principal: &Principal,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = app_state.db_pool.begin().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true), set_config('app.role', $2, true)")
        .bind(principal.user_id.to_string())
        .bind(principal.role.as_str())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
