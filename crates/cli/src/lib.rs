pub mod commands;

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "immo",
    about = "Immo listing assistant operator CLI",
    long_about = "Prepare the listing store, inspect configuration, and run assistant actions locally.",
    after_help = "Examples:\n  immo doctor --json\n  immo seed\n  immo action action_filter_houses_by_city --slot city=Lyon"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply the local listing schema and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalogue (idempotent)")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, store connectivity, and listing table readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run one assistant action against the configured store")]
    Action {
        #[arg(help = "Registered action name, e.g. action_list_houses_for_sale")]
        name: String,
        #[arg(
            long = "slot",
            value_name = "KEY=VALUE",
            value_parser = commands::action::parse_slot,
            help = "Slot value for the turn; JSON values are decoded, anything else is text"
        )]
        slots: Vec<(String, Value)>,
        #[arg(long, default_value = "immo-cli", help = "Sender id used as correlation id")]
        sender: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Action { name, slots, sender } => commands::action::run(&name, slots, &sender),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
