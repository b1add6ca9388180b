//! Command-line interface for existproof.
//!
//! Offline commands (`digest`, `verify`) never touch the network; the others
//! talk to the proof service through [`crate::webapi::Client`].

pub mod args;
pub mod commands;
pub mod utils;

use crate::webapi::{Client, ClientConfig};
use crate::Result;
use std::process;

pub use args::{Command, Options};

/// Main entry point for the CLI application
pub fn run() -> Result<()> {
    let options = match args::parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            eprintln!("Run 'existproof help' for usage");
            process::exit(1);
        }
    };

    let result = execute(options);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}

/// Execute parsed options
pub fn execute(options: Options) -> Result<()> {
    match options.command {
        Command::Help => {
            args::print_usage();
            Ok(())
        }
        Command::Digest { file } => commands::digest(&file),
        Command::Verify {
            proof_file,
            file,
            timestamp,
            raw,
        } => commands::verify(&proof_file, &file, timestamp, raw),
        online => {
            let client = build_client(options.endpoint)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                match online {
                    Command::Add { file } => commands::add(&client, &file).await,
                    Command::Prove { file, token } => commands::prove(&client, &file, &token).await,
                    Command::Latest => commands::latest(&client).await,
                    Command::Fixpoints => commands::fixpoints(&client).await,
                    Command::Help | Command::Digest { .. } | Command::Verify { .. } => Ok(()),
                }
            })
        }
    }
}

fn build_client(endpoint: Option<String>) -> Result<Client> {
    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    Client::new(config)
}
