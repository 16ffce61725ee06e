use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_sim_core::optimisation::{self, OptimiseInput};

use crate::commands::loan::LoanArgs;
use crate::input;

/// Arguments for the overpayment sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct OptimiseArgs {
    /// Path to JSON or YAML input file (flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Extra monthly payments to try (comma-separated, e.g. "0,100,200").
    /// Defaults to a ten-step grid up to principal / term.
    #[arg(long, value_delimiter = ',')]
    pub candidates: Option<Vec<Decimal>>,

    /// Minimum normalised height above the chord for a knee
    #[arg(long)]
    pub knee_tolerance: Option<Decimal>,
}

/// Sweep flags win over the same fields of a file or stdin document.
fn overlay_sweep_flags(
    input: &mut OptimiseInput,
    candidates: Option<Vec<Decimal>>,
    knee_tolerance: Option<Decimal>,
) {
    if candidates.is_some() {
        input.candidates = candidates;
    }
    if knee_tolerance.is_some() {
        input.knee_tolerance = knee_tolerance;
    }
}

pub fn run_optimise(args: OptimiseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut optimise_input: OptimiseInput = if let Some(ref path) = args.input {
        let mut doc: OptimiseInput = input::file::read_input(path)?;
        args.loan.overlay(&mut doc.terms);
        doc
    } else if args.loan.is_empty() {
        match input::stdin::read_stdin()? {
            Some(data) => serde_json::from_value(data)?,
            None => return Err("--input <file>, piped JSON or loan flags required".into()),
        }
    } else {
        OptimiseInput {
            terms: args.loan.into_terms()?,
            candidates: None,
            knee_tolerance: None,
        }
    };
    overlay_sweep_flags(&mut optimise_input, args.candidates, args.knee_tolerance);

    let result = optimisation::optimise(&optimise_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_sim_core::LoanTerms;
    use rust_decimal_macros::dec;

    fn document() -> OptimiseInput {
        OptimiseInput {
            terms: LoanTerms::new(dec!(300000), dec!(0.06), 360),
            candidates: Some(vec![dec!(0), dec!(500)]),
            knee_tolerance: Some(dec!(0.01)),
        }
    }

    #[test]
    fn test_sweep_flags_override_document() {
        let mut input = document();
        overlay_sweep_flags(
            &mut input,
            Some(vec![dec!(0), dec!(100), dec!(200)]),
            Some(dec!(0.05)),
        );
        assert_eq!(input.candidates, Some(vec![dec!(0), dec!(100), dec!(200)]));
        assert_eq!(input.knee_tolerance, Some(dec!(0.05)));
    }

    #[test]
    fn test_absent_sweep_flags_keep_document_values() {
        let mut input = document();
        overlay_sweep_flags(&mut input, None, None);
        assert_eq!(input.candidates, Some(vec![dec!(0), dec!(500)]));
        assert_eq!(input.knee_tolerance, Some(dec!(0.01)));
    }
}
