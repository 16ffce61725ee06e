use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanSimError;
use crate::LoanSimResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Values expressed as percentages (12.5 = 12.5%).
pub type Percent = Decimal;

/// Fixed parameters of a monthly-amortizing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Outstanding balance at period 0.
    pub principal: Money,
    /// Nominal annual interest rate.
    pub annual_rate: Rate,
    /// Contractual number of monthly periods.
    pub term_periods: u32,
    /// Fixed non-principal monthly charge (insurance, tax, ...).
    #[serde(default)]
    pub other_monthly_expense: Money,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate, term_periods: u32) -> Self {
        LoanTerms {
            principal,
            annual_rate,
            term_periods,
            other_monthly_expense: Decimal::ZERO,
        }
    }

    pub fn with_other_monthly_expense(mut self, expense: Money) -> Self {
        self.other_monthly_expense = expense;
        self
    }

    pub fn validate(&self) -> LoanSimResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanSimError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(LoanSimError::invalid(
                "annual_rate",
                "Annual rate cannot be negative",
            ));
        }
        if self.term_periods == 0 {
            return Err(LoanSimError::invalid(
                "term_periods",
                "Term must be at least 1 period",
            ));
        }
        if self.other_monthly_expense < Decimal::ZERO {
            return Err(LoanSimError::invalid(
                "other_monthly_expense",
                "Other monthly expense cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    pub rounding: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
            rounding: "2dp_half_even_per_field".to_string(),
        },
    }
}
