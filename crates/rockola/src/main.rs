// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rockola - plaza jukebox bot.
//!
//! This is the binary entry point for the Rockola daemon.

use clap::{Parser, Subcommand};

mod adapters;
mod serve;
mod shutdown;

/// Rockola - plaza jukebox bot.
#[derive(Parser, Debug)]
#[command(name = "rockola", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Rockola daemon.
    Serve,
    /// Load and validate configuration, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match rockola_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rockola_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("rockola serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            println!(
                "rockola: config ok (agent.name={}, gateway={}:{})",
                config.agent.name, config.gateway.host, config.gateway.port
            );
        }
        None => {
            println!("rockola: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn default_config_str_is_valid_when_gateway_disabled() {
        let config = rockola_config::load_and_validate_str(
            "[gateway]\nenabled = false\n",
        )
        .expect("default config with disabled gateway should validate");
        assert_eq!(config.agent.name, "rockola");
    }
}
