pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "sitetrack",
    about = "SiteTrack operator CLI",
    long_about = "Prepare and inspect a SiteTrack deployment: schema migrations, demo data, effective configuration and readiness checks.",
    after_help = "Examples:\n  sitetrack migrate\n  sitetrack seed\n  sitetrack doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the demo projects and site engineer login (safe to re-run)")]
    Seed,
    #[command(about = "Show effective configuration values and where each one came from")]
    Config,
    #[command(about = "Check configuration, database connectivity and schema state")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
