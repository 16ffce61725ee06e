mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::loan::PaymentArgs;
use commands::optimise::OptimiseArgs;
use commands::schedule::ScheduleArgs;

/// Amortized loan simulation
#[derive(Parser)]
#[command(
    name = "loansim",
    version,
    about = "Amortized loan schedules and overpayment optimisation",
    long_about = "Simulates monthly amortized loan repayment with decimal precision. \
                  Produces period-by-period ledgers, sweeps extra monthly payments, \
                  and finds the point of diminishing returns on overpayment."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug diagnostics to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Required level monthly payment
    Payment(PaymentArgs),
    /// Full month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Sweep extra monthly payments and find the diminishing-returns knee
    Optimise(OptimiseArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Optimise(args) => commands::optimise::run_optimise(args),
        Commands::Version => {
            println!("loansim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "writing output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
