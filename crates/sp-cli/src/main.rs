//! # saml-sp
//!
//! Validates SAML 2.0 Responses from the command line.

#![forbid(unsafe_code)]

use clap::Parser;
use sp_cli::{
    cli::{Cli, Command},
    commands::{run_fingerprint, run_validate},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "saml_sp=debug,sp_cli=debug,sp_saml=debug"
    } else {
        "saml_sp=info,sp_cli=info,sp_saml=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Validate(args) => run_validate(args, &config, cli.output),
        Command::Fingerprint(args) => run_fingerprint(args, cli.output).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error(&e.to_string());
            std::process::exit(1);
        }
    }
}
