use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::amortisation::payment::{base_payment, monthly_rate};
use crate::error::LoanSimError;
use crate::types::*;
use crate::LoanSimResult;

/// Residual left by decimal division in the payment formula. A tentative
/// balance this close to zero is treated as exactly paid off.
const RESIDUAL_TOLERANCE: Decimal = dec!(0.000000001);

const LEDGER_DP: u32 = 2;

/// Per-run knobs layered on top of the loan terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// Extra principal paid every month on top of the contractual payment.
    #[serde(default)]
    pub additive: Money,
    /// Externally fixed contractual payment; replaces the annuity formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_total_payment: Option<Money>,
}

impl ScheduleOptions {
    pub fn with_additive(additive: Money) -> Self {
        ScheduleOptions {
            additive,
            fixed_total_payment: None,
        }
    }
}

/// One month of the ledger. Every field is rounded independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub period: u32,
    pub beginning_balance: Money,
    pub total_payment: Money,
    pub interest_component: Money,
    pub principal_component: Money,
    pub other_expense: Money,
    pub ending_balance: Money,
    pub cumulative_principal_paid: Money,
    pub cumulative_interest_paid: Money,
    pub percent_principal_paid: Percent,
}

/// Full amortization ledger plus its headline totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Contractual payment before overpayment and other expenses.
    pub base_payment: Money,
    /// Total monthly outflow: base payment + additive + other expense.
    pub monthly_outflow: Money,
    pub periods_to_payoff: u32,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    pub final_balance: Money,
    /// False when the term ran out before the balance reached zero.
    pub paid_off: bool,
    pub periods: Vec<PeriodRecord>,
}

impl Schedule {
    pub fn last_period(&self) -> Option<&PeriodRecord> {
        self.periods.last()
    }

    pub fn is_negative_amortization(&self) -> bool {
        !self.paid_off
    }
}

/// Condensed result of a schedule run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffSummary {
    pub periods_to_payoff: u32,
    pub total_interest_paid: Money,
    pub final_balance: Money,
    pub paid_off: bool,
}

/// Envelope input: loan terms and run options as one flat document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(flatten)]
    pub options: ScheduleOptions,
}

fn round_ledger(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(LEDGER_DP, RoundingStrategy::MidpointNearestEven)
}

/// Period-by-period state machine shared by the full and condensed runs.
struct Ledger<'a> {
    terms: &'a LoanTerms,
    rate: Rate,
    outflow: Money,
    balance: Money,
    cumulative_interest: Money,
    cumulative_principal: Money,
    period: u32,
}

impl<'a> Ledger<'a> {
    fn open(terms: &'a LoanTerms, options: &ScheduleOptions) -> LoanSimResult<(Self, Money)> {
        terms.validate()?;

        let base = match options.fixed_total_payment {
            Some(fixed) if fixed <= Decimal::ZERO => {
                return Err(LoanSimError::invalid(
                    "fixed_total_payment",
                    "Fixed payment must be positive",
                ));
            }
            Some(fixed) => fixed,
            None => base_payment(terms)?,
        };

        let outflow = base
            .checked_add(options.additive)
            .and_then(|v| v.checked_add(terms.other_monthly_expense))
            .ok_or_else(|| LoanSimError::overflow("monthly outflow"))?;

        Ok((
            Ledger {
                terms,
                rate: monthly_rate(terms.annual_rate),
                outflow,
                balance: terms.principal,
                cumulative_interest: Decimal::ZERO,
                cumulative_principal: Decimal::ZERO,
                period: 0,
            },
            base,
        ))
    }

    fn is_closed(&self) -> bool {
        self.balance.is_zero() || self.period >= self.terms.term_periods
    }

    fn next_period(&mut self) -> LoanSimResult<Option<PeriodRecord>> {
        if self.is_closed() {
            return Ok(None);
        }
        self.period += 1;

        let period = self.period;
        let other = self.terms.other_monthly_expense;
        let beginning = self.balance;

        let interest = beginning
            .checked_mul(self.rate)
            .ok_or_else(|| LoanSimError::overflow(format!("interest at period {period}")))?;
        let mut principal = self
            .outflow
            .checked_sub(interest)
            .and_then(|v| v.checked_sub(other))
            .ok_or_else(|| LoanSimError::overflow(format!("principal at period {period}")))?;
        let mut ending = beginning
            .checked_sub(principal)
            .ok_or_else(|| LoanSimError::overflow(format!("balance at period {period}")))?;
        let mut total_payment = self.outflow;

        if ending.abs() < RESIDUAL_TOLERANCE {
            ending = Decimal::ZERO;
        }

        // Payoff period: settle exactly the remaining balance. The period's
        // interest is not charged on top of it but still accrues to the totals.
        if ending < Decimal::ZERO {
            principal = beginning;
            total_payment = beginning + other;
            ending = Decimal::ZERO;
        }

        self.cumulative_interest = self
            .cumulative_interest
            .checked_add(interest)
            .ok_or_else(|| LoanSimError::overflow("cumulative interest"))?;
        self.cumulative_principal = self
            .cumulative_principal
            .checked_add(principal)
            .ok_or_else(|| LoanSimError::overflow("cumulative principal"))?;
        self.balance = ending;

        let percent_paid = self.cumulative_principal / self.terms.principal * dec!(100);

        Ok(Some(PeriodRecord {
            period,
            beginning_balance: round_ledger(beginning),
            total_payment: round_ledger(total_payment),
            interest_component: round_ledger(interest),
            principal_component: round_ledger(principal),
            other_expense: round_ledger(other),
            ending_balance: round_ledger(ending),
            cumulative_principal_paid: round_ledger(self.cumulative_principal),
            cumulative_interest_paid: round_ledger(self.cumulative_interest),
            percent_principal_paid: round_ledger(percent_paid),
        }))
    }
}

/// Generate the full month-by-month amortization ledger.
///
/// The ledger stops on the first period whose ending balance is exactly zero.
/// If the term runs out first the last record keeps a non-zero ending balance
/// and `paid_off` is false; that is a result, not an error.
pub fn generate_schedule(terms: &LoanTerms, options: &ScheduleOptions) -> LoanSimResult<Schedule> {
    let (mut ledger, base) = Ledger::open(terms, options)?;
    let mut periods = Vec::new();

    while let Some(record) = ledger.next_period()? {
        periods.push(record);
    }

    let (total_interest_paid, total_principal_paid, final_balance) = periods
        .last()
        .map(|p| {
            (
                p.cumulative_interest_paid,
                p.cumulative_principal_paid,
                p.ending_balance,
            )
        })
        .unwrap_or((Decimal::ZERO, Decimal::ZERO, round_ledger(terms.principal)));

    let paid_off = ledger.balance.is_zero();
    debug!(
        principal = %terms.principal,
        additive = %options.additive,
        periods = periods.len(),
        paid_off,
        "generated amortization schedule"
    );

    Ok(Schedule {
        base_payment: round_ledger(base),
        monthly_outflow: round_ledger(ledger.outflow),
        periods_to_payoff: ledger.period,
        total_interest_paid,
        total_principal_paid,
        final_balance,
        paid_off,
        periods,
    })
}

/// Condensed run: number of periods to payoff and total interest, without
/// keeping the per-period records.
pub fn payoff_summary(
    terms: &LoanTerms,
    options: &ScheduleOptions,
) -> LoanSimResult<PayoffSummary> {
    let (mut ledger, _) = Ledger::open(terms, options)?;
    let mut last = None;

    while let Some(record) = ledger.next_period()? {
        last = Some(record);
    }

    let (total_interest_paid, final_balance) = last
        .map(|p| (p.cumulative_interest_paid, p.ending_balance))
        .unwrap_or((Decimal::ZERO, round_ledger(terms.principal)));

    Ok(PayoffSummary {
        periods_to_payoff: ledger.period,
        total_interest_paid,
        final_balance,
        paid_off: ledger.balance.is_zero(),
    })
}

/// Build a schedule wrapped in the standard computation envelope.
pub fn amortise(input: &ScheduleInput) -> LoanSimResult<ComputationOutput<Schedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = generate_schedule(&input.terms, &input.options)?;

    if let Some(first) = schedule.periods.first() {
        if first.principal_component <= Decimal::ZERO {
            warnings.push(format!(
                "Monthly outflow {} does not cover first-period interest {}",
                schedule.monthly_outflow, first.interest_component
            ));
        }
    }

    if schedule.paid_off {
        if schedule.periods_to_payoff < input.terms.term_periods {
            warnings.push(format!(
                "Loan paid off after {} of {} periods",
                schedule.periods_to_payoff, input.terms.term_periods
            ));
        }
    } else {
        warn!(
            remaining = %schedule.final_balance,
            "schedule ended with balance outstanding"
        );
        warnings.push(format!(
            "Negative amortization: balance {} outstanding after {} periods",
            schedule.final_balance, schedule.periods_to_payoff
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment monthly amortization",
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate": input.terms.annual_rate.to_string(),
            "term_periods": input.terms.term_periods,
            "other_monthly_expense": input.terms.other_monthly_expense.to_string(),
            "additive": input.options.additive.to_string(),
            "fixed_total_payment": input.options.fixed_total_payment.map(|v| v.to_string()),
        }),
        warnings,
        elapsed,
        schedule,
    ))
}
