mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::mortgage::{AmortizeArgs, ComparePointsArgs, RefinanceArgs};
use commands::premium_tax_credit::PtcArgs;
use commands::social_security::{SsLifetimeArgs, SsStrategiesArgs, SsSurvivorArgs};

/// Deterministic financial-planning projections
#[derive(Parser)]
#[command(
    name = "finplan",
    version,
    about = "Deterministic financial-planning projections",
    long_about = "A CLI for the finplan projection engines with decimal precision. \
                  Supports amortization schedules with paydown strategies, discount-point \
                  and refinance comparison, Social Security claiming simulation, and \
                  Premium Tax Credit estimation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a month-by-month amortization schedule
    Amortize(AmortizeArgs),
    /// Compare rate/points scenarios against a baseline
    ComparePoints(ComparePointsArgs),
    /// Analyze a refinance offer against the current loan
    Refinance(RefinanceArgs),
    /// Project lifetime Social Security benefits
    SsLifetime(SsLifetimeArgs),
    /// Rank the fixed claiming strategies by lifetime total
    SsStrategies(SsStrategiesArgs),
    /// Compute survivor benefit scenarios for a couple
    SsSurvivor(SsSurvivorArgs),
    /// Estimate the Premium Tax Credit
    Ptc(PtcArgs),
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

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::mortgage::run_amortize(args),
        Commands::ComparePoints(args) => commands::mortgage::run_compare_points(args),
        Commands::Refinance(args) => commands::mortgage::run_refinance(args),
        Commands::SsLifetime(args) => commands::social_security::run_lifetime(args),
        Commands::SsStrategies(args) => commands::social_security::run_strategies(args),
        Commands::SsSurvivor(args) => commands::social_security::run_survivor(args),
        Commands::Ptc(args) => commands::premium_tax_credit::run_ptc(args),
        Commands::Version => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
