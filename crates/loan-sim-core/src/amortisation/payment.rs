use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanSimError;
use crate::types::{LoanTerms, Money, Rate};
use crate::LoanSimResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Nominal annual rate converted to the per-period (monthly) rate.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Required level monthly payment for a fully amortizing loan.
///
/// `payment = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r = annual_rate / 12`.
///
/// The formula is undefined at a zero rate; that case is reported as
/// `DivisionByZero` and left to the caller (see [`base_payment`]).
pub fn monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_periods: u32,
) -> LoanSimResult<Money> {
    if term_periods == 0 {
        return Err(LoanSimError::invalid(
            "term_periods",
            "Number of periods must be > 0",
        ));
    }
    if principal <= Decimal::ZERO {
        return Err(LoanSimError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(LoanSimError::invalid(
            "annual_rate",
            "Annual rate cannot be negative",
        ));
    }

    let r = monthly_rate(annual_rate);
    let factor = (Decimal::ONE + r)
        .checked_powu(u64::from(term_periods))
        .ok_or_else(|| LoanSimError::overflow("payment growth factor (1 + r)^n"))?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LoanSimError::DivisionByZero {
            context: "annuity factor ((1 + r)^n - 1)".into(),
        });
    }

    principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| LoanSimError::overflow("monthly payment"))
}

/// Contractual payment for a set of terms, excluding overpayment and other
/// expenses. A zero rate falls back to straight-line repayment.
pub fn base_payment(terms: &LoanTerms) -> LoanSimResult<Money> {
    terms.validate()?;
    if terms.annual_rate.is_zero() {
        return Ok(terms.principal / Decimal::from(terms.term_periods));
    }
    monthly_payment(terms.principal, terms.annual_rate, terms.term_periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_thirty_year_mortgage_payment() {
        let pmt = monthly_payment(dec!(300000), dec!(0.06), 360).unwrap();
        // 300k at 6% over 30 years: ~1798.65
        assert!((pmt - dec!(1798.65)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_single_period_payment_is_principal_plus_interest() {
        let pmt = monthly_payment(dec!(1200), dec!(0.12), 1).unwrap();
        assert!((pmt - dec!(1212)).abs() < dec!(0.0000001), "got {pmt}");
    }

    #[test]
    fn test_zero_rate_is_degenerate() {
        let err = monthly_payment(dec!(1000), Decimal::ZERO, 10).unwrap_err();
        assert!(matches!(err, LoanSimError::DivisionByZero { .. }));
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = monthly_payment(dec!(1000), dec!(0.05), 0).unwrap_err();
        assert!(matches!(err, LoanSimError::InvalidInput { .. }));
    }

    #[test]
    fn test_base_payment_zero_rate_fallback() {
        let terms = LoanTerms::new(dec!(1200), Decimal::ZERO, 12);
        assert_eq!(base_payment(&terms).unwrap(), dec!(100));
    }

    #[test]
    fn test_base_payment_ignores_other_expense() {
        let plain = LoanTerms::new(dec!(300000), dec!(0.06), 360);
        let with_tax = plain.clone().with_other_monthly_expense(dec!(250));
        assert_eq!(
            base_payment(&plain).unwrap(),
            base_payment(&with_tax).unwrap()
        );
    }
}
