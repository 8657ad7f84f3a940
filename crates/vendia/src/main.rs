// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vendia - decision engine for a conversational sales agent.
//!
//! This is the binary entry point for the Vendia agent.

mod calendar;
mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Vendia - decision engine for a conversational sales agent.
#[derive(Parser, Debug)]
#[command(name = "vendia", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Vendia agent server.
    Serve,
    /// Launch an interactive customer-chat session.
    Shell,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match vendia_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            vendia_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.agent.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve) => {
            println!("vendia serve: not yet implemented");
        }
        Some(Commands::Shell) => {
            if let Err(e) = shell::run_shell(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            print_config(config);
        }
        None => {
            println!("vendia: use --help for available commands");
        }
    }
}

/// Prints the effective configuration as TOML with API keys redacted.
fn print_config(config: vendia_config::VendiaConfig) {
    match toml::to_string_pretty(&redacted(config)) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => eprintln!("error: failed to render config: {e}"),
    }
}

/// Replaces every configured API key with a placeholder.
fn redacted(mut config: vendia_config::VendiaConfig) -> vendia_config::VendiaConfig {
    for slot in [
        &mut config.providers.l1,
        &mut config.providers.l2,
        &mut config.providers.l3,
    ]
    .into_iter()
    .flatten()
    {
        slot.api_key = "<redacted>".to_string();
    }
    config
}
