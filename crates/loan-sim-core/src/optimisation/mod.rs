pub mod knee;
pub mod sweep;

pub use knee::{
    find_knee, find_knee_with_tolerance, knee_point, KneePoint, KneeResult, DEFAULT_KNEE_TOLERANCE,
};
pub use sweep::{default_candidates, sweep_overpayments, SweepPoint, SweepSummary};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortisation::base_payment;
use crate::error::LoanSimError;
use crate::types::*;
use crate::LoanSimResult;

/// Input for an overpayment optimisation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimiseInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Extra monthly payments to try; the default grid is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Money>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knee_tolerance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimiseOutput {
    pub base_payment: Money,
    pub summary: SweepSummary,
    pub knee: KneeResult,
}

/// Sweep overpayment candidates and locate the point of diminishing returns.
pub fn optimise(input: &OptimiseInput) -> LoanSimResult<ComputationOutput<OptimiseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.terms.validate()?;

    let tolerance = input.knee_tolerance.unwrap_or(DEFAULT_KNEE_TOLERANCE);
    if tolerance < Decimal::ZERO {
        return Err(LoanSimError::invalid(
            "knee_tolerance",
            "Knee tolerance cannot be negative",
        ));
    }

    let (candidates, source) = match &input.candidates {
        Some(c) if c.is_empty() => {
            return Err(LoanSimError::InsufficientData(
                "At least one overpayment candidate is required".into(),
            ));
        }
        Some(c) => (c.clone(), "supplied"),
        None => (default_candidates(&input.terms)?, "default_grid"),
    };

    let summary = sweep_overpayments(&input.terms, &candidates);
    for failed in summary.failures() {
        warnings.push(format!(
            "Candidate {} failed: {}",
            failed.candidate,
            failed.error.as_deref().unwrap_or("unknown error")
        ));
    }

    let knee = find_knee_with_tolerance(&summary, tolerance);
    if !knee.is_found() {
        warnings.push("No distinguishable knee in the term-reduction curve".into());
    }

    let output = OptimiseOutput {
        base_payment: base_payment(&input.terms)?.round_dp(2),
        summary,
        knee,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Overpayment sweep with chord-distance knee detection",
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate": input.terms.annual_rate.to_string(),
            "term_periods": input.terms.term_periods,
            "other_monthly_expense": input.terms.other_monthly_expense.to_string(),
            "candidates": source,
            "candidate_count": candidates.len(),
            "knee_tolerance": tolerance.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
