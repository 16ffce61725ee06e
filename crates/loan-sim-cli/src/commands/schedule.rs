use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_sim_core::amortisation::{self, ScheduleInput, ScheduleOptions};

use crate::commands::loan::LoanArgs;
use crate::input;

/// Arguments for a full amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Extra principal paid every month
    #[arg(long)]
    pub additive: Option<Decimal>,

    /// Externally fixed contractual payment (replaces the annuity formula)
    #[arg(long)]
    pub fixed_total_payment: Option<Decimal>,
}

/// Payment flags win over the same fields of a file or stdin document.
fn overlay_payment_flags(
    options: &mut ScheduleOptions,
    additive: Option<Decimal>,
    fixed_total_payment: Option<Decimal>,
) {
    if let Some(additive) = additive {
        options.additive = additive;
    }
    if fixed_total_payment.is_some() {
        options.fixed_total_payment = fixed_total_payment;
    }
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        let mut doc: ScheduleInput = input::file::read_input(path)?;
        args.loan.overlay(&mut doc.terms);
        doc
    } else if args.loan.is_empty() {
        match input::stdin::read_stdin()? {
            Some(data) => serde_json::from_value(data)?,
            None => return Err("--input <file>, piped JSON or loan flags required".into()),
        }
    } else {
        ScheduleInput {
            terms: args.loan.into_terms()?,
            options: ScheduleOptions::default(),
        }
    };
    overlay_payment_flags(
        &mut schedule_input.options,
        args.additive,
        args.fixed_total_payment,
    );

    let result = amortisation::amortise(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
