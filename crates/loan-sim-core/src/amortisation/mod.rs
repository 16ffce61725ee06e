//! Monthly amortization: the level-payment formula and the period-by-period
//! ledger built on it.
//!
//! All ledger fields are rounded to 2 dp independently, half-to-even. Totals
//! are carried unrounded between periods and never re-derived from the
//! rounded components, so a column may not sum exactly to its cumulative
//! field.

pub mod payment;
pub mod schedule;

pub use payment::{base_payment, monthly_payment, monthly_rate};
pub use schedule::{
    amortise, generate_schedule, payoff_summary, PayoffSummary, PeriodRecord, Schedule,
    ScheduleInput, ScheduleOptions,
};
