//! OSC Sender CLI Binary

use clap::Parser;
use osc_sender::error::ApiError;
use osc_sender::logging::init_logging;
use osc_sender::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.clone(), cli.settings.clone(), cli.verbose) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&cli.logging_config(&context.settings().logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(ApiError::InvalidConfiguration { report }) => {
            println!("{}", report);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
