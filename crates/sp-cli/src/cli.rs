//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sp_crypto::HashAlgorithm;

use crate::config::OutputFormat;

/// saml-sp - SAML 2.0 Response validation for Service Providers.
#[derive(Debug, Parser)]
#[command(name = "saml-sp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (overrides ~/.saml-sp/config.toml).
    #[arg(short, long, env = "SAML_SP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a SAML Response and show what it asserts.
    Validate(ValidateArgs),

    /// Print the fingerprint of a certificate.
    Fingerprint(FingerprintArgs),
}

/// Arguments for `validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// File holding the Response, Base64 or raw XML (`-` for stdin).
    pub payload: PathBuf,

    /// Settings TOML file (overrides the config file's [settings]).
    #[arg(long, env = "SAML_SP_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Expected IdP certificate fingerprint.
    #[arg(long, env = "SAML_SP_IDP_CERT_FINGERPRINT")]
    pub fingerprint: Option<String>,

    /// Hash algorithm of the fingerprint.
    #[arg(long, env = "SAML_SP_IDP_CERT_FINGERPRINT_ALGORITHM")]
    pub fingerprint_algorithm: Option<HashAlgorithm>,

    /// IdP certificate file, PEM or base64 DER.
    #[arg(long, env = "SAML_SP_IDP_CERT")]
    pub cert: Option<PathBuf>,

    /// Expected audience (SP entity ID).
    #[arg(long, env = "SAML_SP_ENTITY_ID")]
    pub audience: Option<String>,

    /// Allowed clock drift in seconds.
    #[arg(long, env = "SAML_SP_CLOCK_DRIFT")]
    pub clock_drift: Option<f64>,

    /// Show every attribute value instead of the first.
    #[arg(long)]
    pub multi_value: bool,

    /// Skip the NotBefore/NotOnOrAfter check.
    #[arg(long)]
    pub skip_conditions: bool,

    /// Skip the audience check.
    #[arg(long)]
    pub skip_audience: bool,

    /// Validate as of this instant (RFC 3339) instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for `fingerprint`.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// Certificate file, PEM or base64 DER.
    pub cert: PathBuf,

    /// Hash algorithm.
    #[arg(short, long, default_value = "sha1")]
    pub algorithm: HashAlgorithm,
}
