// src/services/dashboard_service.rs

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};

use crate::{
    common::error::AppError,
    db::{dashboard_repo::Windows, DashboardRepository, ProfileRepository},
    models::{
        auth::Principal,
        dashboard::{AdminHome, ClientHome, SupplierHome},
        order::{Quote, QuoteDirection},
    },
    services::fee_calculator::{quote_brl_to_cny, quote_cny_to_brl},
};

const SAMPLE_AMOUNT_BRL: i64 = 1000;

/// Janelas dos cards: desde a meia-noite (UTC), últimos 7 dias, último mês.
pub fn windows_at(now: DateTime<Utc>) -> Windows {
    let today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);
    Windows {
        today,
        week: now - Duration::days(7),
        month: now.checked_sub_months(Months::new(1)).unwrap_or(now - Duration::days(30)),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    profile_repo: ProfileRepository,
    exchange_rate: Decimal,
    default_fee_rate: Decimal,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        profile_repo: ProfileRepository,
        exchange_rate: Decimal,
        default_fee_rate: Decimal,
    ) -> Self {
        Self {
            repo,
            profile_repo,
            exchange_rate,
            default_fee_rate,
        }
    }

    pub async fn admin_home<'e, A>(&self, executor: A) -> Result<AdminHome, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        self.repo.admin_summary(executor, windows_at(Utc::now())).await
    }

    pub async fn supplier_home<'e, A>(&self, executor: A, supplier: &Principal) -> Result<SupplierHome, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let detail = self
            .profile_repo
            .find_supplier_detail(&mut *conn, supplier.user_id)
            .await?
            .ok_or(AppError::Forbidden)?;
        let counters = self
            .repo
            .supplier_counters(&mut *conn, supplier.user_id, windows_at(Utc::now()).today)
            .await?;

        Ok(SupplierHome {
            supplier_code: detail.supplier_id,
            pending_orders: counters.pending_orders,
            to_release: counters.to_release,
            today_earnings: counters.today_earnings,
        })
    }

    pub async fn client_home<'e, A>(&self, executor: A, client: &Principal) -> Result<ClientHome, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let fee_rate = self.client_fee_rate(executor, client).await?;
        let sample_quote = quote_brl_to_cny(Decimal::from(SAMPLE_AMOUNT_BRL), fee_rate, self.exchange_rate)?;

        Ok(ClientHome {
            custom_fee_rate: fee_rate,
            exchange_rate: self.exchange_rate,
            sample_quote,
        })
    }

    // =========================================================================
    //  COTAÇÕES
    // =========================================================================

    /// Cotação anônima com a taxa padrão da plataforma.
    pub fn public_quote(&self, amount: Decimal, direction: QuoteDirection) -> Result<Quote, AppError> {
        match direction {
            QuoteDirection::BrlToCny => quote_brl_to_cny(amount, self.default_fee_rate, self.exchange_rate),
            QuoteDirection::CnyToBrl => quote_cny_to_brl(amount, self.default_fee_rate, self.exchange_rate),
        }
    }

    /// Mesma conta, com a taxa do cliente logado.
    pub async fn client_quote<'e, A>(
        &self,
        executor: A,
        client: &Principal,
        amount: Decimal,
        direction: QuoteDirection,
    ) -> Result<Quote, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let fee_rate = self.client_fee_rate(executor, client).await?;
        match direction {
            QuoteDirection::BrlToCny => quote_brl_to_cny(amount, fee_rate, self.exchange_rate),
            QuoteDirection::CnyToBrl => quote_cny_to_brl(amount, fee_rate, self.exchange_rate),
        }
    }

    async fn client_fee_rate<'e, A>(&self, executor: A, client: &Principal) -> Result<Decimal, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let detail = self
            .profile_repo
            .find_client_detail(&mut *conn, client.user_id)
            .await?
            .ok_or(AppError::Forbidden)?;
        Ok(detail.custom_fee_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn windows_start_at_midnight_week_and_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let w = windows_at(now);
        assert_eq!(w.today, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(w.week, Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap());
        assert_eq!(w.month, Utc.with_ymd_and_hms(2024, 2, 15, 14, 30, 0).unwrap());
    }

    #[test]
    fn month_window_clamps_short_months() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 8, 0, 0).unwrap();
        assert_eq!(windows_at(now).month, Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap());
    }
}
