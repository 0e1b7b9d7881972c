//! Certificate fingerprint command.

use serde::Serialize;
use sp_crypto::{Certificate, HashAlgorithm};

use crate::cli::FingerprintArgs;
use crate::config::OutputFormat;
use crate::output;

/// A certificate fingerprint ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerprintReport {
    /// Certificate subject.
    pub subject: String,
    /// Hash algorithm.
    pub algorithm: HashAlgorithm,
    /// Colon-separated uppercase hex.
    pub fingerprint: String,
}

/// Fingerprints a PEM or base64 DER certificate.
pub fn fingerprint_report(
    certificate: &str,
    algorithm: HashAlgorithm,
) -> crate::CliResult<FingerprintReport> {
    let cert = Certificate::parse(certificate)?;
    Ok(FingerprintReport {
        subject: cert.subject().to_string(),
        algorithm,
        fingerprint: cert.fingerprint(algorithm),
    })
}

/// Runs the fingerprint command.
pub fn run_fingerprint(args: &FingerprintArgs, format: OutputFormat) -> crate::CliResult<()> {
    let bytes = super::read_input(&args.cert)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        crate::CliError::InvalidArgument(format!(
            "{} is not a PEM or base64 certificate",
            args.cert.display()
        ))
    })?;
    let report = fingerprint_report(&text, args.algorithm)?;

    match format {
        OutputFormat::Json => output::json(&report)?,
        OutputFormat::Table => {
            output::info(&format!("Subject: {}", report.subject));
            println!("{}: {}", report.algorithm, report.fingerprint);
        }
    }
    Ok(())
}
