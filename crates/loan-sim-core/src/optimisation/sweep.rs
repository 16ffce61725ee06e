use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amortisation::{payoff_summary, ScheduleOptions};
use crate::error::LoanSimError;
use crate::types::*;
use crate::LoanSimResult;

/// Fraction of `principal / term_periods` used as the default sweep step.
const DEFAULT_STEP_FRACTION: Decimal = dec!(0.1);

/// Outcome of one overpayment candidate. Numeric fields are absent when the
/// candidate failed; `error` then carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub candidate: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods_to_payoff: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_interest_paid: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_term_reduction: Option<Percent>,
    /// Interest saved against the zero-overpayment run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_saved: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_off: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepPoint {
    fn failed(candidate: Money, err: &LoanSimError) -> Self {
        SweepPoint {
            candidate,
            periods_to_payoff: None,
            total_interest_paid: None,
            percent_term_reduction: None,
            interest_saved: None,
            paid_off: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Sweep results in the order the candidates were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub term_periods: u32,
    /// Total interest with no overpayment, when that run succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_interest: Option<Money>,
    pub points: Vec<SweepPoint>,
}

impl SweepSummary {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SweepPoint> {
        self.points.iter().filter(|p| !p.is_ok())
    }

    /// `(index, candidate, percent_term_reduction)` for every successful point.
    pub fn reduction_curve(&self) -> Vec<(usize, Money, Percent)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.percent_term_reduction.map(|r| (i, p.candidate, r)))
            .collect()
    }
}

/// Default sweep: `0, step, 2*step, ...` strictly below `principal / term`,
/// with `step` the truncated 10% of that bound. Falls back to the exact 10%
/// step when truncation would give zero, and fails with `InsufficientData`
/// when even that step underflows to zero.
pub fn default_candidates(terms: &LoanTerms) -> LoanSimResult<Vec<Money>> {
    terms.validate()?;

    let upper = terms.principal / Decimal::from(terms.term_periods);
    let exact_step = upper * DEFAULT_STEP_FRACTION;
    let step = match exact_step.trunc() {
        s if s.is_zero() => exact_step,
        s => s,
    };
    if step.is_zero() {
        return Err(LoanSimError::InsufficientData(format!(
            "Sweep step underflows to zero for principal / term of {upper}"
        )));
    }

    let mut candidates = Vec::new();
    let mut current = Decimal::ZERO;
    while current < upper {
        candidates.push(current);
        current += step;
    }
    Ok(candidates)
}

fn percent_term_reduction(term_periods: u32, periods_to_payoff: u32) -> Percent {
    let term = Decimal::from(term_periods);
    let reduction = (term - Decimal::from(periods_to_payoff)) / term * dec!(100);
    reduction.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

fn evaluate_candidate(terms: &LoanTerms, candidate: Money, baseline: Option<Money>) -> SweepPoint {
    let outcome = if candidate < Decimal::ZERO {
        Err(LoanSimError::invalid(
            "candidate",
            format!("Overpayment candidate {candidate} is negative"),
        ))
    } else {
        payoff_summary(terms, &ScheduleOptions::with_additive(candidate))
    };

    match outcome {
        Ok(summary) => SweepPoint {
            candidate,
            periods_to_payoff: Some(summary.periods_to_payoff),
            total_interest_paid: Some(summary.total_interest_paid),
            percent_term_reduction: Some(percent_term_reduction(
                terms.term_periods,
                summary.periods_to_payoff,
            )),
            interest_saved: baseline.map(|b| b - summary.total_interest_paid),
            paid_off: Some(summary.paid_off),
            error: None,
        },
        Err(e) => {
            warn!(candidate = %candidate, error = %e, "overpayment candidate failed");
            SweepPoint::failed(candidate, &e)
        }
    }
}

/// Run the condensed schedule for every candidate extra payment.
///
/// Output order always matches `candidates`. A candidate that fails is kept
/// as an entry with `error` set; it never stops the sweep.
pub fn sweep_overpayments(terms: &LoanTerms, candidates: &[Money]) -> SweepSummary {
    let baseline = payoff_summary(terms, &ScheduleOptions::default())
        .ok()
        .map(|s| s.total_interest_paid);

    #[cfg(feature = "parallel")]
    let points: Vec<SweepPoint> = {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .map(|c| evaluate_candidate(terms, *c, baseline))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let points: Vec<SweepPoint> = candidates
        .iter()
        .map(|c| evaluate_candidate(terms, *c, baseline))
        .collect();

    debug!(
        candidates = candidates.len(),
        failed = points.iter().filter(|p| !p.is_ok()).count(),
        "overpayment sweep complete"
    );

    SweepSummary {
        term_periods: terms.term_periods,
        baseline_interest: baseline,
        points,
    }
}
