use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use loan_sim_core::amortisation::{base_payment, monthly_rate};
use loan_sim_core::{with_metadata, LoanTerms};

use crate::input;

/// Loan terms shared by every command
#[derive(Args, Clone)]
pub struct LoanArgs {
    /// Outstanding principal at period 0
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate as a decimal (0.06 = 6%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Contractual number of monthly periods
    #[arg(long)]
    pub term_periods: Option<u32>,

    /// Fixed non-principal monthly charge (insurance, tax)
    #[arg(long)]
    pub other_monthly_expense: Option<Decimal>,
}

impl LoanArgs {
    /// No loan flag given: input has to come from stdin.
    pub fn is_empty(&self) -> bool {
        self.principal.is_none()
            && self.annual_rate.is_none()
            && self.term_periods.is_none()
            && self.other_monthly_expense.is_none()
    }

    /// Replace document fields with any loan flag that was given.
    pub fn overlay(&self, terms: &mut LoanTerms) {
        if let Some(principal) = self.principal {
            terms.principal = principal;
        }
        if let Some(annual_rate) = self.annual_rate {
            terms.annual_rate = annual_rate;
        }
        if let Some(term_periods) = self.term_periods {
            terms.term_periods = term_periods;
        }
        if let Some(expense) = self.other_monthly_expense {
            terms.other_monthly_expense = expense;
        }
    }

    pub fn into_terms(self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate = self
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let term_periods = self
            .term_periods
            .ok_or("--term-periods is required (or provide --input)")?;

        Ok(LoanTerms::new(principal, annual_rate, term_periods)
            .with_other_monthly_expense(self.other_monthly_expense.unwrap_or(Decimal::ZERO)))
    }
}

/// Arguments for the required monthly payment
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
    /// Path to JSON or YAML input file (loan flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let terms: LoanTerms = if let Some(ref path) = args.input {
        let mut terms: LoanTerms = input::file::read_input(path)?;
        args.loan.overlay(&mut terms);
        terms
    } else if args.loan.is_empty() {
        match input::stdin::read_stdin()? {
            Some(data) => serde_json::from_value(data)?,
            None => return Err("--input <file>, piped JSON or loan flags required".into()),
        }
    } else {
        args.loan.into_terms()?
    };

    let payment = base_payment(&terms)?;
    let mut warnings = Vec::new();
    if terms.annual_rate.is_zero() {
        warnings.push("Zero interest rate: straight-line repayment of principal".to_string());
    }

    let result = serde_json::json!({
        "monthly_payment": payment.round_dp(2),
        "monthly_rate": monthly_rate(terms.annual_rate),
        "monthly_outflow": (payment + terms.other_monthly_expense).round_dp(2),
    });

    let output = with_metadata(
        "Level-payment annuity formula",
        &terms,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flags() -> LoanArgs {
        LoanArgs {
            principal: None,
            annual_rate: None,
            term_periods: None,
            other_monthly_expense: None,
        }
    }

    #[test]
    fn test_overlay_replaces_only_given_fields() {
        let mut terms = LoanTerms::new(dec!(300000), dec!(0.06), 360);
        let args = LoanArgs {
            annual_rate: Some(dec!(0.045)),
            other_monthly_expense: Some(dec!(150)),
            ..flags()
        };
        args.overlay(&mut terms);

        assert_eq!(terms.principal, dec!(300000));
        assert_eq!(terms.annual_rate, dec!(0.045));
        assert_eq!(terms.term_periods, 360);
        assert_eq!(terms.other_monthly_expense, dec!(150));
    }

    #[test]
    fn test_missing_principal_flag_is_reported() {
        let args = LoanArgs {
            annual_rate: Some(dec!(0.05)),
            term_periods: Some(12),
            ..flags()
        };
        let err = args.into_terms().unwrap_err();
        assert!(err.to_string().contains("--principal"));
    }
}
