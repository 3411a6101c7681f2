// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisor - AI course advisor chat backend with human handoff.
//!
//! Binary entry point: loads and validates configuration, then dispatches
//! to the requested subcommand.

mod serve;

use clap::{Parser, Subcommand};

/// Advisor - AI course advisor chat backend with human handoff.
#[derive(Parser, Debug)]
#[command(name = "advisor", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the chat backend (gateway, webhook, admin API).
    Serve,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match advisor_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("advisor: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("advisor: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("advisor: cannot render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("advisor: use --help for available commands");
        }
    }
}
