// src/services/fee_calculator.rs

//! Conversão BRL <-> CNY com a taxa de serviço. Funções puras: a mesma conta
//! serve para a cotação pública, a cotação do cliente e a criação do pedido.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{common::error::AppError, models::order::Quote};

/// Maior valor que cabe em NUMERIC(14,2).
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Arredonda valores monetários para centavos (meio para longe do zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A taxa é um percentual entre 0 e 100.
pub fn validate_fee_rate(fee_rate: Decimal) -> Result<(), AppError> {
    if fee_rate < Decimal::ZERO || fee_rate > Decimal::ONE_HUNDRED {
        return Err(AppError::InvalidFeeRate);
    }
    Ok(())
}

/// Valor em dinheiro gravável: no máximo centavos e dentro do limite da coluna.
pub fn validate_money(amount: Decimal) -> Result<(), AppError> {
    if amount.normalize().scale() > 2 || amount > MAX_MONEY {
        return Err(AppError::InvalidAmount(amount.to_string()));
    }
    Ok(())
}

fn invalid(amount: Decimal) -> AppError {
    AppError::InvalidAmount(amount.to_string())
}

fn validate_inputs(amount: Decimal, fee_rate: Decimal, exchange_rate: Decimal) -> Result<(), AppError> {
    if amount < Decimal::ZERO || amount > MAX_MONEY {
        return Err(invalid(amount));
    }
    if exchange_rate <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(exchange_rate.to_string()));
    }
    validate_fee_rate(fee_rate)
}

/// fee = brl × taxa / 100 ; cny = (brl − fee) × câmbio
pub fn quote_brl_to_cny(amount_brl: Decimal, fee_rate: Decimal, exchange_rate: Decimal) -> Result<Quote, AppError> {
    validate_inputs(amount_brl, fee_rate, exchange_rate)?;

    let amount_brl = round_money(amount_brl);
    let fee_amount = amount_brl
        .checked_mul(fee_rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or_else(|| invalid(amount_brl))?;
    let amount_cny = (amount_brl - fee_amount)
        .checked_mul(exchange_rate)
        .map(round_money)
        .filter(|v| *v <= MAX_MONEY)
        .ok_or_else(|| invalid(amount_brl))?;

    Ok(Quote {
        amount_brl,
        fee_rate,
        fee_amount,
        exchange_rate,
        amount_cny,
    })
}

/// Inverso exato da conta acima: brl = cny / câmbio / (1 − taxa/100).
pub fn quote_cny_to_brl(amount_cny: Decimal, fee_rate: Decimal, exchange_rate: Decimal) -> Result<Quote, AppError> {
    validate_inputs(amount_cny, fee_rate, exchange_rate)?;
    // Com taxa de 100% nenhum valor em BRL chega ao fornecedor
    if fee_rate == Decimal::ONE_HUNDRED {
        return Err(AppError::InvalidFeeRate);
    }

    let amount_cny = round_money(amount_cny);
    let net_share = Decimal::ONE - fee_rate / Decimal::ONE_HUNDRED;
    let amount_brl = amount_cny
        .checked_div(exchange_rate)
        .and_then(|v| v.checked_div(net_share))
        .map(round_money)
        .filter(|v| *v <= MAX_MONEY)
        .ok_or_else(|| invalid(amount_cny))?;
    let fee_amount = amount_brl
        .checked_mul(fee_rate)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or_else(|| invalid(amount_cny))?;

    Ok(Quote {
        amount_brl,
        fee_rate,
        fee_amount,
        exchange_rate,
        amount_cny,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn thousand_reais_at_five_percent() {
        let quote = quote_brl_to_cny(dec!(1000), dec!(5), dec!(1.42)).unwrap();
        assert_eq!(quote.fee_amount, dec!(50.00));
        assert_eq!(quote.amount_cny, dec!(1349.00));
        assert_eq!(quote.amount_brl, dec!(1000));
    }

    #[test]
    fn reverse_is_the_inverse_of_forward() {
        let quote = quote_cny_to_brl(dec!(1349.00), dec!(5), dec!(1.42)).unwrap();
        assert_eq!(quote.amount_brl, dec!(1000.00));
        assert_eq!(quote.fee_amount, dec!(50.00));

        let back = quote_brl_to_cny(quote.amount_brl, dec!(5), dec!(1.42)).unwrap();
        assert_eq!(back.amount_cny, dec!(1349.00));
    }

    #[test]
    fn half_cent_rounds_away_from_zero() {
        // 0.10 × 5% = 0.005
        let quote = quote_brl_to_cny(dec!(0.10), dec!(5), dec!(1.42)).unwrap();
        assert_eq!(quote.fee_amount, dec!(0.01));
        assert_eq!(quote.amount_cny, dec!(0.13));
    }

    #[test]
    fn zero_amount_is_a_valid_quote() {
        let quote = quote_brl_to_cny(Decimal::ZERO, dec!(5), dec!(1.42)).unwrap();
        assert_eq!(quote.fee_amount, Decimal::ZERO);
        assert_eq!(quote.amount_cny, Decimal::ZERO);
    }

    #[test]
    fn rejects_negative_amounts_and_bad_rates() {
        assert!(matches!(
            quote_brl_to_cny(dec!(-1), dec!(5), dec!(1.42)),
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            quote_brl_to_cny(dec!(10), dec!(100.01), dec!(1.42)),
            Err(AppError::InvalidFeeRate)
        ));
        assert!(matches!(
            quote_brl_to_cny(dec!(10), dec!(-0.5), dec!(1.42)),
            Err(AppError::InvalidFeeRate)
        ));
        assert!(matches!(
            quote_brl_to_cny(dec!(10), dec!(5), Decimal::ZERO),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn full_fee_leaves_nothing_to_convert() {
        let quote = quote_brl_to_cny(dec!(200), dec!(100), dec!(1.42)).unwrap();
        assert_eq!(quote.fee_amount, dec!(200.00));
        assert_eq!(quote.amount_cny, Decimal::ZERO);
        assert!(matches!(
            quote_cny_to_brl(dec!(10), dec!(100), dec!(1.42)),
            Err(AppError::InvalidFeeRate)
        ));
    }

    #[test]
    fn huge_amounts_are_refused_instead_of_overflowing() {
        let huge = Decimal::MAX;
        assert!(matches!(quote_brl_to_cny(huge, dec!(5), dec!(1.42)), Err(AppError::InvalidAmount(_))));
        assert!(matches!(quote_cny_to_brl(huge, dec!(5), dec!(1.42)), Err(AppError::InvalidAmount(_))));
        assert!(matches!(
            quote_brl_to_cny(dec!(10), dec!(5), Decimal::MAX),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn largest_storable_amount_still_quotes() {
        assert_eq!(MAX_MONEY, dec!(999999999999.99));
        let quote = quote_brl_to_cny(MAX_MONEY, dec!(50), dec!(1)).unwrap();
        assert_eq!(quote.amount_cny, dec!(499999999999.99));
        // Convertido passaria do limite da coluna
        assert!(matches!(
            quote_brl_to_cny(MAX_MONEY, dec!(5), dec!(1.42)),
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            quote_brl_to_cny(MAX_MONEY + dec!(0.01), dec!(0), dec!(1)),
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[test]
    fn fee_rate_accepts_both_ends_of_the_range() {
        assert!(validate_fee_rate(Decimal::ZERO).is_ok());
        assert!(validate_fee_rate(Decimal::ONE_HUNDRED).is_ok());
        // 99.995 vira 100.00 ao ser gravada
        assert!(validate_fee_rate(round_money(dec!(99.995))).is_ok());
        assert!(validate_fee_rate(dec!(100.01)).is_err());
    }

    #[test]
    fn money_is_limited_to_cents_and_column_range() {
        assert!(validate_money(dec!(0.01)).is_ok());
        assert!(validate_money(dec!(1.500)).is_ok());
        assert!(validate_money(MAX_MONEY).is_ok());
        assert!(matches!(validate_money(dec!(0.001)), Err(AppError::InvalidAmount(_))));
        assert!(matches!(validate_money(dec!(10000000000000)), Err(AppError::InvalidAmount(_))));
    }

    #[test]
    fn zero_fee_is_pure_conversion() {
        let quote = quote_brl_to_cny(dec!(100), Decimal::ZERO, dec!(1.42)).unwrap();
        assert_eq!(quote.fee_amount, Decimal::ZERO);
        assert_eq!(quote.amount_cny, dec!(142.00));
    }
}
